//! Read-only market price series.
//!
//! Each instrument is loaded once at startup from `<assets_dir>/chart_<name>.csv`
//! and never mutated afterwards, so lookups need no locking.
//!
//! The CSV format is the one exported by common charting sites:
//!
//! ```text
//! "Date";"Price"
//! "01/02/2024";"2063,40"
//! ```
//!
//! One header line, `;` separators, optional double quotes, `MM/DD/YYYY` dates
//! and a comma as decimal separator.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Daily closing prices keyed by ISO date (`YYYY-MM-DD`).
pub type PriceSeries = BTreeMap<String, f32>;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid line {line}: {content:?}")]
    InvalidLine { line: usize, content: String },

    #[error("Invalid date {value:?} on line {line}")]
    InvalidDate { line: usize, value: String },

    #[error("Invalid price {value:?} on line {line}")]
    InvalidPrice { line: usize, value: String },
}

/// In-memory lookup of price series by instrument name.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    series: HashMap<String, PriceSeries>,
}

impl MarketData {
    /// Load every instrument from `dir`. Any unreadable or malformed file fails the whole load.
    pub fn load<S: AsRef<str>>(dir: &Path, instruments: &[S]) -> Result<Self, MarketDataError> {
        let mut series = HashMap::with_capacity(instruments.len());

        for name in instruments {
            let name = name.as_ref();
            let path = dir.join(format!("chart_{}.csv", name));
            let content = std::fs::read_to_string(&path).map_err(|source| MarketDataError::Io {
                path: path.clone(),
                source,
            })?;

            let prices = parse_chart(&content)?;
            info!(instrument = name, points = prices.len(), "loaded market data");
            series.insert(name.to_string(), to_series(&prices));
        }

        Ok(Self { series })
    }

    pub fn from_series(series: HashMap<String, PriceSeries>) -> Self {
        Self { series }
    }

    /// The series for `instrument`, if one was loaded.
    pub fn lookup(&self, instrument: &str) -> Option<&PriceSeries> {
        self.series.get(instrument)
    }
}

/// Parse the contents of one chart file into prices by date.
///
/// Blank lines are skipped. Later rows for the same date overwrite earlier ones.
pub fn parse_chart(content: &str) -> Result<BTreeMap<NaiveDate, f32>, MarketDataError> {
    let mut prices = BTreeMap::new();

    for (index, raw) in content.lines().enumerate().skip(1) {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(';').collect();
        let [date_field, price_field] = fields.as_slice() else {
            return Err(MarketDataError::InvalidLine {
                line: line_no,
                content: line.to_string(),
            });
        };

        let date_str = date_field.trim().trim_matches('"');
        let date = NaiveDate::parse_from_str(date_str, "%m/%d/%Y").map_err(|_| {
            MarketDataError::InvalidDate {
                line: line_no,
                value: date_str.to_string(),
            }
        })?;

        let price_str = price_field.trim().trim_matches('"').replace(',', ".");
        let price = price_str
            .parse::<f32>()
            .map_err(|_| MarketDataError::InvalidPrice {
                line: line_no,
                value: price_field.trim().trim_matches('"').to_string(),
            })?;

        prices.insert(date, price);
    }

    Ok(prices)
}

fn to_series(prices: &BTreeMap<NaiveDate, f32>) -> PriceSeries {
    prices
        .iter()
        .map(|(date, price)| (date.format("%Y-%m-%d").to_string(), *price))
        .collect()
}
