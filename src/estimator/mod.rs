//! Heuristic next-day price estimator.
//!
//! A trailing-average placeholder model: predicted price is the mean of
//! the last `window` closes scaled by `1 + markup`, with a strict-greater
//! comparison against the current close for the buy/sell call. The
//! constants are deliberately configurable rather than baked in; they are
//! a stand-in until the per-ticker models are wired into the API.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::types::{AnalysisResult, Decision, PriceSeries, StockRequest, DEFAULT_SERIES_LEN};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Estimator tuning parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Required length of every price series.
    pub series_len: usize,
    /// Trailing window the prediction averages over.
    pub window: usize,
    /// Fractional markup applied to the trailing average (0.01 = 1%).
    pub markup: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            series_len: DEFAULT_SERIES_LEN,
            window: 3,
            markup: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Batch analysis failure. The whole request fails; no partial results
/// are ever returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    /// A ticker's series had the wrong number of entries.
    #[error("Invalid data for {ticker}. Expected {expected} price values.")]
    InvalidSeries {
        ticker: String,
        expected: usize,
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Access the estimator configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Analyze a single validated series.
    ///
    /// `ticker_count` is the number of tickers in the owning request; the
    /// allocation is an equal-weight split, so it is identical for every
    /// ticker in one request.
    pub fn analyze(
        &self,
        prices: &PriceSeries,
        total_investment: f64,
        ticker_count: usize,
    ) -> AnalysisResult {
        let tail = prices.trailing(self.config.window);
        let predicted = tail.iter().sum::<f64>() / tail.len() as f64 * (1.0 + self.config.markup);
        let current = prices.last();

        // Decision compares the unrounded prediction; rounding is display-only.
        let decision = decide(predicted, current);

        AnalysisResult {
            decision,
            predicted_price: round2(predicted),
            current_price: current,
            allocation: format_currency(total_investment / ticker_count as f64),
        }
    }

    /// Analyze every ticker in a request, all-or-nothing.
    ///
    /// The first series with the wrong length aborts the batch; results
    /// computed for tickers earlier in iteration order are discarded.
    pub fn analyze_batch(
        &self,
        request: &StockRequest,
    ) -> Result<BTreeMap<String, AnalysisResult>, EstimateError> {
        let ticker_count = request.stock_prices.len();
        let mut results = BTreeMap::new();

        for (ticker, prices) in &request.stock_prices {
            let series = PriceSeries::new(prices.clone(), self.config.series_len).map_err(|e| {
                EstimateError::InvalidSeries {
                    ticker: ticker.clone(),
                    expected: e.expected,
                    got: e.got,
                }
            })?;

            let result = self.analyze(&series, request.total_investment, ticker_count);
            debug!(
                ticker = %ticker,
                decision = %result.decision,
                predicted = result.predicted_price,
                current = result.current_price,
                "Ticker analyzed"
            );
            results.insert(ticker.clone(), result);
        }

        Ok(results)
    }
}

/// BUY only on a strictly higher prediction; ties favor SELL.
pub fn decide(predicted: f64, current: f64) -> Decision {
    if predicted > current {
        Decision::Buy
    } else {
        Decision::Sell
    }
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a dollar amount the way the API has always rendered allocations:
/// rounded to 2 decimal places, trailing zeros trimmed, at least one
/// fractional digit kept ("$10000.0", "$3333.33").
fn format_currency(amount: f64) -> String {
    let mut s = format!("{:.2}", round2(amount));
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    format!("${s}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
