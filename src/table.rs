use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{ReshapeError, Result};

/// One observation of the long-format dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub location: String,
    /// Cumulative doses per hundred people, `None` when not reported.
    pub metric: Option<f64>,
}

impl Record {
    pub fn new(date: NaiveDate, location: impl Into<String>, metric: Option<f64>) -> Self {
        Self {
            date,
            location: location.into(),
            metric,
        }
    }
}

/// Locations kept by the filter. Also fixes the column order of the wide table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList(Vec<String>);

impl AllowList {
    /// Duplicates are dropped, first occurrence wins.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !kept.contains(&name) {
                kept.push(name);
            }
        }

        if kept.is_empty() {
            return Err(ReshapeError::EmptyAllowList);
        }
        Ok(Self(kept))
    }

    pub fn contains(&self, location: &str) -> bool {
        self.0.iter().any(|name| name == location)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Date-indexed, location-keyed table of a single metric.
///
/// Every column holds exactly one value slot per row key; a missing value is
/// `None`, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    dates: Vec<NaiveDate>,
    names: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl WideTable {
    /// Builds a table from row keys and named columns.
    ///
    /// Rows need not be sorted, but row keys and column names must be unique
    /// and every column must be as long as `dates`.
    pub fn from_columns<I, S>(dates: Vec<NaiveDate>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
        S: Into<String>,
    {
        let mut unique_dates = HashSet::with_capacity(dates.len());
        if let Some(dup) = dates.iter().find(|d| !unique_dates.insert(**d)) {
            return Err(ReshapeError::InvalidArgument(format!(
                "duplicate row key {dup}"
            )));
        }

        let mut names = Vec::new();
        let mut values = Vec::new();
        for (name, column) in columns {
            let name = name.into();
            if names.contains(&name) {
                return Err(ReshapeError::InvalidArgument(format!(
                    "duplicate column {name:?}"
                )));
            }
            if column.len() != dates.len() {
                return Err(ReshapeError::InvalidArgument(format!(
                    "column {name:?} has {} values for {} rows",
                    column.len(),
                    dates.len()
                )));
            }
            names.push(name);
            values.push(column);
        }

        if names.is_empty() {
            return Err(ReshapeError::InvalidArgument(
                "a wide table needs at least one column".to_string(),
            ));
        }

        Ok(Self {
            dates,
            names,
            values,
        })
    }

    /// Caller guarantees the shape invariants.
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        names: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(names.len(), values.len());
        debug_assert!(values.iter().all(|c| c.len() == dates.len()));
        Self {
            dates,
            names,
            values,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.values[idx])
    }

    /// Columns in order, each aligned to [`WideTable::dates`].
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Cell value; `None` for a null cell, an unknown date or an unknown column.
    pub fn get(&self, date: NaiveDate, name: &str) -> Option<f64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        self.column(name)?[row]
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.iter().max().copied()
    }

    /// Largest non-null value of a column.
    pub fn column_max(&self, name: &str) -> Option<f64> {
        self.column(name)?
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    #[test]
    fn allow_list_rejects_empty() {
        let err = AllowList::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ReshapeError::EmptyAllowList));
    }

    #[test]
    fn allow_list_keeps_first_seen_order() {
        let list = AllowList::new(["B", "A", "B"]).unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["B", "A"]);
        assert!(list.contains("A"));
        assert!(!list.contains("C"));
    }

    #[test]
    fn from_columns_validates_shape() {
        let err = WideTable::from_columns(vec![day(1), day(2)], [("A", vec![Some(1.0)])])
            .unwrap_err();
        assert!(matches!(err, ReshapeError::InvalidArgument(_)));

        let err = WideTable::from_columns(vec![day(1), day(1)], [("A", vec![None, None])])
            .unwrap_err();
        assert!(matches!(err, ReshapeError::InvalidArgument(_)));

        let err = WideTable::from_columns(
            vec![day(1)],
            [("A", vec![None]), ("A", vec![Some(2.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, ReshapeError::InvalidArgument(_)));
    }

    #[test]
    fn accessors() {
        let table = WideTable::from_columns(
            vec![day(3), day(1)],
            [("A", vec![Some(4.0), Some(2.5)]), ("B", vec![None, None])],
        )
        .unwrap();

        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(table.get(day(1), "A"), Some(2.5));
        assert_eq!(table.get(day(1), "B"), None);
        assert_eq!(table.get(day(2), "A"), None);
        assert_eq!(table.last_date(), Some(day(3)));
        assert_eq!(table.column_max("A"), Some(4.0));
        assert_eq!(table.column_max("B"), None);
    }
}
