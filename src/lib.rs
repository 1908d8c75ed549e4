use std::ops::{Deref, DerefMut};

use anyhow::Result;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::info;

use crate::convert::RecordColumns;
use crate::fetcher::retrieve_data;
use crate::load::CsvLoader;

pub mod chart;
pub mod config;
mod convert;
pub mod error;
pub mod fetcher;
mod load;
pub mod pipeline;
pub mod table;

pub use chart::ChartLayout;
pub use error::ReshapeError;
pub use pipeline::{filter, forward_fill, pivot, records_frame, reshape};
pub use table::{AllowList, Record, WideTable};

#[derive(Debug)]
pub struct DataSet(DataFrame);

impl Deref for DataSet {
    type Target = DataFrame;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DataSet {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl DataSet {
    /// Parses CSV text, every column kept as a string.
    pub fn from_csv(text: impl Into<String>) -> error::Result<Self> {
        CsvLoader::new(text).load()
    }

    /// Types the `date`, `location` and `metric_column` columns into records.
    pub fn records(&self, metric_column: &str) -> error::Result<Vec<Record>> {
        RecordColumns {
            frame: &self.0,
            metric: metric_column,
        }
        .try_into()
    }

    /// Nulls are written as empty fields.
    pub fn to_csv(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf).finish(&mut self.0)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Fetches `source` and turns it into records of `metric_column`.
pub async fn load_records<T: AsRef<str>>(source: T, metric_column: &str) -> Result<Vec<Record>> {
    let source = source.as_ref();
    info!("retrieving data from source: {}", source);

    let ds = DataSet::from_csv(retrieve_data(source).await?)?;
    let records = ds.records(metric_column)?;

    info!(records = records.len(), metric = metric_column, "loaded records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_table_to_csv() {
        let records = vec![
            Record::new(chrono::NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), "A", Some(1.5)),
            Record::new(chrono::NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(), "B", Some(2.0)),
        ];
        let table = reshape(&records, ["A", "B"], |r| r.metric).unwrap();

        let mut ds = DataSet::try_from(&table).unwrap();
        let csv = ds.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "date,A,B");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2021-01-01,1.5,"));
        assert!(lines[1].ends_with(','));
    }
}
