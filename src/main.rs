use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vaxchart::config::{
    CHART_OUTPUT, COUNTRIES, MAIN_COUNTRY, METRIC_COLUMN, OWID_COVID_URL, TABLE_OUTPUT,
};
use vaxchart::{load_records, reshape, ChartLayout, DataSet};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let records = load_records(OWID_COVID_URL, METRIC_COLUMN)
        .await
        .context("failed to load the vaccination dataset")?;

    let table = reshape(&records, COUNTRIES, |r| r.metric)?;
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "built vaccination table"
    );

    let mut ds = DataSet::try_from(&table)?;
    println!("{:?}", ds.tail(Some(10)));

    tokio::fs::write(TABLE_OUTPUT, ds.to_csv()?)
        .await
        .with_context(|| format!("cannot write {TABLE_OUTPUT}"))?;

    let layout = ChartLayout::new(&table, MAIN_COUNTRY);
    tokio::fs::write(CHART_OUTPUT, layout.to_json()?)
        .await
        .with_context(|| format!("cannot write {CHART_OUTPUT}"))?;

    info!(table = TABLE_OUTPUT, chart = CHART_OUTPUT, "wrote outputs");
    Ok(())
}
