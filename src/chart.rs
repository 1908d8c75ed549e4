//! Everything a renderer needs to draw the vaccination chart.
//!
//! The layout is derived from a [`WideTable`] alone; colors, label anchors and
//! tick positions are decided here so the drawing side stays dumb.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::table::WideTable;

const HIGHLIGHT_COLOR: &str = "#129583";
const MUTED_COLOR: &str = "grey";
const HIGHLIGHT_ALPHA: f64 = 1.0;
const MUTED_ALPHA: f64 = 0.75;
/// Labels sit this many days right of the last row.
const LABEL_OFFSET_DAYS: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_range: [f64; 2],
    /// Major ticks, one per Monday.
    pub x_ticks: Vec<NaiveDate>,
    pub tick_format: String,
    pub tick_rotation: f64,
    pub frame: FrameStyle,
    pub series: Vec<SeriesLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameStyle {
    pub background: String,
    pub axis_color: String,
    pub grid_alpha: f64,
    pub hidden_spines: Vec<String>,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: "#F5F5F5".to_string(),
            axis_color: "#3f3f3f".to_string(),
            grid_alpha: 0.1,
            hidden_spines: vec!["top".to_string(), "right".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLayout {
    pub location: String,
    pub color: String,
    pub alpha: f64,
    pub points: Vec<Point>,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub date: NaiveDate,
    pub value: f64,
}

impl ChartLayout {
    /// Lays out one series per table column; `highlight` gets the accent color.
    pub fn new(table: &WideTable, highlight: &str) -> Self {
        let last = table.last_date();
        let label_date = last.and_then(|d| d.checked_add_days(Days::new(LABEL_OFFSET_DAYS)));

        let series = table
            .iter_columns()
            .map(|(location, values)| {
                let (color, alpha) = if location == highlight {
                    (HIGHLIGHT_COLOR, HIGHLIGHT_ALPHA)
                } else {
                    (MUTED_COLOR, MUTED_ALPHA)
                };

                let points = table
                    .dates()
                    .iter()
                    .zip(values)
                    .map(|(&date, &value)| Point { date, value })
                    .collect();

                let label = label_date
                    .zip(table.column_max(location))
                    .map(|(date, value)| Label {
                        text: location.to_string(),
                        date,
                        value,
                    });

                SeriesLayout {
                    location: location.to_string(),
                    color: color.to_string(),
                    alpha,
                    points,
                    label,
                }
            })
            .collect();

        let x_ticks = match (table.dates().iter().min(), last) {
            (Some(&first), Some(last)) => weekly_ticks(first, last),
            _ => Vec::new(),
        };

        Self {
            title: "COVID-19 vaccinations over time".to_string(),
            x_label: "Date".to_string(),
            y_label: "Total vaccinations per 100 people".to_string(),
            y_range: [0.0, 100.0],
            x_ticks,
            tick_format: "%Y-%m-%d".to_string(),
            tick_rotation: 45.0,
            frame: FrameStyle::default(),
            series,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Every Monday in `first..=last`.
pub fn weekly_ticks(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let to_monday = (7 - first.weekday().num_days_from_monday()) % 7;
    let mut ticks = Vec::new();
    let mut day = first.checked_add_days(Days::new(u64::from(to_monday)));
    while let Some(d) = day.filter(|d| *d <= last) {
        ticks.push(d);
        day = d.checked_add_days(Days::new(7));
    }
    ticks
}
