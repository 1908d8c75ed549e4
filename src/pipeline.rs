//! Long-format records to a forward-filled wide table.
//!
//! `reshape` is the composition `forward_fill(pivot(filter(..)))`; each stage
//! is also exposed on its own. The tabular work runs on polars frames, with
//! dates carried as day numbers (`NaiveDate::num_days_from_ce`) so that row
//! keys sort and group as plain integers. None of the stages perform I/O.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use crate::config::{DATE_COLUMN, LOCATION_COLUMN};
use crate::error::{ReshapeError, Result};
use crate::table::{AllowList, Record, WideTable};

const VALUE_COLUMN: &str = "value";

/// Long frame of `date` (day number), `location` and `value`.
///
/// `metric` selects the field to aggregate. Non-finite values are stored as null.
pub fn records_frame<'a, I, F>(records: I, metric: F) -> Result<LazyFrame>
where
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> Option<f64>,
{
    let mut days = Vec::new();
    let mut locations = Vec::new();
    let mut values = Vec::new();
    for record in records {
        days.push(record.date.num_days_from_ce());
        locations.push(record.location.as_str());
        values.push(metric(record).filter(|v| v.is_finite()));
    }

    let df = DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), days).into(),
        Series::new(LOCATION_COLUMN.into(), locations).into(),
        Series::new(VALUE_COLUMN.into(), values).into(),
    ])?;
    Ok(df.lazy())
}

/// Rows whose location is on the allow-list, unchanged.
pub fn filter(frame: LazyFrame, allow_list: &AllowList) -> LazyFrame {
    let predicate = allow_list
        .iter()
        .map(|name| col(LOCATION_COLUMN).eq(lit(name)))
        .reduce(|acc, e| acc.or(e))
        .unwrap_or_else(|| lit(false));
    frame.filter(predicate)
}

/// Groups by `(date, location)` and averages the value.
///
/// One row per distinct date, ascending; one column per allow-listed location
/// in allow-list order, even if it was never observed. Nulls are ignored by
/// the mean, and a group with no values yields a null cell. Rows outside the
/// allow-list never reach a column.
pub fn pivot(filtered: LazyFrame, allow_list: &AllowList) -> Result<WideTable> {
    let per_location: Vec<Expr> = allow_list
        .iter()
        .map(|name| {
            col(VALUE_COLUMN)
                .filter(col(LOCATION_COLUMN).eq(lit(name)))
                .mean()
                .alias(name)
        })
        .collect();

    // Sorting first fixes the summation order inside every group, so the
    // means do not depend on the order records arrived in.
    let df = filtered
        .sort_by_exprs(
            [col(DATE_COLUMN), col(LOCATION_COLUMN), col(VALUE_COLUMN)],
            SortMultipleOptions::default(),
        )
        .group_by([col(DATE_COLUMN)])
        .agg(per_location)
        .sort_by_exprs([col(DATE_COLUMN)], SortMultipleOptions::default())
        .collect()?;

    debug!(rows = df.height(), columns = allow_list.len(), "pivoted records");
    table_from_frame(&df, allow_list.iter().map(str::to_owned).collect())
}

/// Replaces each null cell with the closest earlier non-null value of its column.
///
/// Leading nulls stay null. Rows are sorted by date first.
pub fn forward_fill(table: &WideTable) -> Result<WideTable> {
    let names: Vec<String> = table.columns().map(str::to_owned).collect();
    let sorted = table_frame(table)?
        .lazy()
        .sort_by_exprs([col(DATE_COLUMN)], SortMultipleOptions::default())
        .collect()?;

    let mut filled: Vec<Column> = Vec::with_capacity(names.len() + 1);
    filled.push(sorted.column(DATE_COLUMN)?.clone());
    for name in &names {
        let series = sorted
            .column(name)?
            .as_materialized_series()
            .fill_null(FillNullStrategy::Forward(None))?;
        filled.push(series.into());
    }

    table_from_frame(&DataFrame::new(filled)?, names)
}

/// `forward_fill(pivot(filter(records, allow_list), metric))`.
///
/// Fails when `allow_list` is empty; an empty `records` yields a table with
/// the allow-listed columns and no rows.
pub fn reshape<I, S, F>(records: &[Record], allow_list: I, metric: F) -> Result<WideTable>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(&Record) -> Option<f64>,
{
    let allow_list = AllowList::new(allow_list)?;
    debug!(records = records.len(), locations = allow_list.len(), "reshaping");

    let frame = records_frame(records, metric)?;
    let pivoted = pivot(filter(frame, &allow_list), &allow_list)?;
    forward_fill(&pivoted)
}

fn table_frame(table: &WideTable) -> Result<DataFrame> {
    let days: Vec<i32> = table.dates().iter().map(|d| d.num_days_from_ce()).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(table.column_count() + 1);
    columns.push(Series::new(DATE_COLUMN.into(), days).into());
    for (name, values) in table.iter_columns() {
        columns.push(Series::new(name.into(), values.to_vec()).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Expects a day-number `date` column plus one `f64` column per name.
fn table_from_frame(df: &DataFrame, names: Vec<String>) -> Result<WideTable> {
    let dates = df
        .column(DATE_COLUMN)?
        .as_materialized_series()
        .i32()?
        .into_iter()
        .map(|day| {
            day.and_then(NaiveDate::from_num_days_from_ce_opt)
                .ok_or_else(|| ReshapeError::InvalidArgument(format!("bad row key {day:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut values = Vec::with_capacity(names.len());
    for name in &names {
        let column: Vec<Option<f64>> = df
            .column(name)?
            .cast(&DataType::Float64)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .collect();
        values.push(column);
    }

    Ok(WideTable::from_parts(dates, names, values))
}
