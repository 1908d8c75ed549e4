use chrono::NaiveDate;
use polars::prelude::*;

use crate::config::{DATE_COLUMN, LOCATION_COLUMN};
use crate::error::{ReshapeError, Result};
use crate::table::{Record, WideTable};
use crate::DataSet;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A loaded frame plus the name of the metric column to read from it.
///
/// Wrapped so the conversion can go through `TryFrom` into `Vec<Record>`.
pub struct RecordColumns<'a> {
    pub(crate) frame: &'a DataFrame,
    pub(crate) metric: &'a str,
}

impl<'a> TryFrom<RecordColumns<'a>> for Vec<Record> {
    type Error = ReshapeError;

    fn try_from(value: RecordColumns<'a>) -> Result<Self> {
        let dates = string_column(value.frame, DATE_COLUMN)?;
        let locations = string_column(value.frame, LOCATION_COLUMN)?;
        let metrics = string_column(value.frame, value.metric)?;

        (&dates)
            .into_iter()
            .zip(&locations)
            .zip(&metrics)
            .enumerate()
            .map(|(row, ((date, location), metric))| -> Result<Record> {
                let date = parse_date(row, date)?;
                let location = location.ok_or(ReshapeError::MissingLocation { row })?;
                Ok(Record::new(date, location, parse_metric(metric)))
            })
            .collect()
    }
}

fn string_column(frame: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = frame.column(name)?.cast(&DataType::String)?;
    Ok(column.as_materialized_series().str()?.clone())
}

/// A date that cannot be placed on the row axis rejects the whole input.
fn parse_date(row: usize, raw: Option<&str>) -> Result<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
        .ok_or_else(|| ReshapeError::InvalidDate {
            row,
            value: raw.unwrap_or_default().to_string(),
        })
}

/// Anything that is not a finite number counts as "not reported".
fn parse_metric(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl TryFrom<&WideTable> for DataSet {
    type Error = ReshapeError;

    fn try_from(table: &WideTable) -> Result<Self> {
        let mut columns: Vec<Column> = Vec::with_capacity(table.column_count() + 1);

        let dates: Vec<String> = table
            .dates()
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        columns.push(Series::new(DATE_COLUMN.into(), dates).into());

        for (name, values) in table.iter_columns() {
            columns.push(Series::new(name.into(), values.to_vec()).into());
        }

        Ok(DataSet(DataFrame::new(columns)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::CsvLoader;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn records(csv: &str) -> Result<Vec<Record>> {
        let ds = CsvLoader::new(csv).load()?;
        RecordColumns {
            frame: &ds,
            metric: "total_vaccinations_per_hundred",
        }
        .try_into()
    }

    #[test]
    fn parses_dates_and_metrics() {
        let csv = "iso_code,date,location,total_vaccinations_per_hundred\n\
                   ISR,2021-01-01,Israel,12.5\n\
                   ISR,2021-01-02,Israel,\n\
                   ISR,2021-01-03,Israel,n/a\n";
        let parsed = records(csv).unwrap();

        assert_eq!(
            parsed,
            vec![
                Record::new(day(1), "Israel", Some(12.5)),
                Record::new(day(2), "Israel", None),
                Record::new(day(3), "Israel", None),
            ]
        );
    }

    #[test]
    fn non_finite_metrics_are_null() {
        let csv = "date,location,total_vaccinations_per_hundred\n\
                   2021-01-01,Israel,NaN\n\
                   2021-01-02,Israel,inf\n\
                   2021-01-03,Israel,-inf\n\
                   2021-01-04,Israel,3\n";
        let metrics: Vec<Option<f64>> = records(csv)
            .unwrap()
            .into_iter()
            .map(|r| r.metric)
            .collect();

        assert_eq!(metrics, vec![None, None, None, Some(3.0)]);
    }

    #[test]
    fn missing_location_is_rejected_with_its_row() {
        let csv = "date,location,total_vaccinations_per_hundred\n\
                   2021-01-01,Israel,1\n\
                   2021-01-02,,2\n";
        assert!(matches!(
            records(csv),
            Err(ReshapeError::MissingLocation { row: 1 })
        ));
    }

    #[test]
    fn bad_date_is_rejected_with_its_row() {
        let csv = "date,location,total_vaccinations_per_hundred\n\
                   2021-01-01,Israel,1\n\
                   01/02/2021,Israel,2\n";
        match records(csv) {
            Err(ReshapeError::InvalidDate { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "01/02/2021");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn missing_metric_column_is_an_error() {
        let csv = "date,location\n2021-01-01,Israel\n";
        assert!(matches!(records(csv), Err(ReshapeError::Polars(_))));
    }

    #[test]
    fn wide_table_exports_date_then_columns() {
        let table = WideTable::from_columns(
            vec![day(1), day(2)],
            [("Israel", vec![Some(1.0), None]), ("Brazil", vec![None, None])],
        )
        .unwrap();

        let ds = DataSet::try_from(&table).unwrap();
        let names: Vec<&str> = ds.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["date", "Israel", "Brazil"]);
        assert_eq!(ds.height(), 2);
        assert_eq!(ds.column("Israel").unwrap().null_count(), 1);
        assert_eq!(ds.column("Brazil").unwrap().null_count(), 2);
    }
}
