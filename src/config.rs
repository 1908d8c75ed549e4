//! Fixed inputs of the vaccination chart.

/// Our World in Data full COVID-19 dataset.
pub const OWID_COVID_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

pub const DATE_COLUMN: &str = "date";
pub const LOCATION_COLUMN: &str = "location";
/// Cumulative doses administered per hundred people.
pub const METRIC_COLUMN: &str = "total_vaccinations_per_hundred";

/// Countries kept by the filter, in output column order.
pub const COUNTRIES: [&str; 6] = [
    "United States",
    "Germany",
    "United Kingdom",
    "Israel",
    "Argentina",
    "Brazil",
];

/// Highlighted series; every other country is drawn muted.
pub const MAIN_COUNTRY: &str = "United States";

pub const TABLE_OUTPUT: &str = "vaccinations.csv";
pub const CHART_OUTPUT: &str = "vaccinations_chart.json";
