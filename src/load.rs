use std::io::Cursor;

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::DataSet;

/// CSV text with a header row.
pub struct CsvLoader(pub(crate) String);

impl CsvLoader {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Parses the text into a frame of string columns.
    ///
    /// Schema inference is disabled: typing happens when records are built,
    /// so a column whose values drift between integers and floats cannot
    /// fail the read.
    pub fn load(self) -> Result<DataSet> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(self.0.as_bytes()))
            .finish()?;

        debug!(rows = df.height(), columns = df.width(), "parsed csv");
        Ok(DataSet(df))
    }
}
