//! Shared types for the SEVENCAST service.
//!
//! These types form the data model used across the estimator, the
//! model dispatcher, and the HTTP layer, so that none of those
//! modules need to depend on each other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Number of daily closing prices a series must carry.
pub const DEFAULT_SERIES_LEN: usize = 7;

// ---------------------------------------------------------------------------
// Price series
// ---------------------------------------------------------------------------

/// An ordered series of daily closing prices, most-recent-last.
///
/// The constructor enforces the expected length exactly; a series of the
/// wrong length is rejected, never truncated or padded. Deliberately not
/// deserializable: raw vectors come in through `StockRequest` and pass
/// through validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries(Vec<f64>);

/// A series arrived with the wrong number of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} price values, got {got}")]
pub struct SeriesLengthMismatch {
    pub expected: usize,
    pub got: usize,
}

impl PriceSeries {
    /// Validate and wrap a raw price vector.
    pub fn new(values: Vec<f64>, expected: usize) -> Result<Self, SeriesLengthMismatch> {
        if values.len() != expected {
            return Err(SeriesLengthMismatch {
                expected,
                got: values.len(),
            });
        }
        Ok(Self(values))
    }

    /// The most recent closing price (last element).
    pub fn last(&self) -> f64 {
        // Constructor rejects empty input, so the series is never empty.
        *self.0.last().expect("validated price series is non-empty")
    }

    /// The trailing `n` entries (the whole series if `n` exceeds its length).
    pub fn trailing(&self, n: usize) -> &[f64] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Request / response model
// ---------------------------------------------------------------------------

/// Incoming analysis request: ticker → raw 7-day price vector, plus the
/// total amount to split evenly across the requested tickers.
///
/// Tickers are arbitrary case-sensitive strings; no enumeration is
/// enforced here. A `BTreeMap` keeps iteration (and therefore which
/// invalid ticker gets reported first) deterministic.
#[derive(Debug, Clone, Deserialize)]
pub struct StockRequest {
    pub stock_prices: BTreeMap<String, Vec<f64>>,
    #[serde(default = "default_investment")]
    pub total_investment: f64,
}

fn default_investment() -> f64 {
    10_000.0
}

/// Buy/sell call for a single ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Buy => write!(f, "BUY"),
            Decision::Sell => write!(f, "SELL"),
        }
    }
}

/// Per-ticker analysis outcome.
///
/// Field names serialize to the exact keys the API has always returned,
/// spaces included. `predicted_price` is rounded to 2 decimal places for
/// display; `current_price` is the raw last element of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "Decision")]
    pub decision: Decision,
    #[serde(rename = "Predicted Price")]
    pub predicted_price: f64,
    #[serde(rename = "Current Price")]
    pub current_price: f64,
    #[serde(rename = "Allocation")]
    pub allocation: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
