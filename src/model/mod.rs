//! Per-ticker model registry and single-shot prediction dispatcher.
//!
//! A `ModelRegistry` is built once by an explicit `load` step from the
//! `[models]` configuration and is immutable afterwards, so it is safe to
//! share read-only across the process lifetime. Ticker resolution is a
//! data-driven alias table (exact, case-sensitive match); adding a ticker
//! is a config change, not a code change.
//!
//! The actual inference primitive lives behind the `InferenceBackend`
//! trait. Validation failures come back as typed `DispatchError`s so the
//! hosting binary decides whether to exit, log, or propagate.

pub mod loader;

use anyhow::{bail, Result};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::config::ModelsConfig;
use crate::types::PriceSeries;
pub use loader::{ModelArtifact, ScalerArtifact};

// ---------------------------------------------------------------------------
// Bundles and registry
// ---------------------------------------------------------------------------

/// A trained model paired with its fitted feature scaler, for one
/// ticker family.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub name: String,
    pub model: ModelArtifact,
    pub scaler: ScalerArtifact,
}

/// Immutable ticker → bundle lookup table.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    bundles: Vec<ModelBundle>,
    /// Canonical names and aliases, all pointing into `bundles`.
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Load every configured bundle from disk and build the alias index.
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let mut registry = Self::default();
        for bundle_cfg in &config.bundles {
            let bundle = ModelBundle {
                name: bundle_cfg.name.clone(),
                model: ModelArtifact::load(&bundle_cfg.model_path)?,
                scaler: ScalerArtifact::load(&bundle_cfg.scaler_path)?,
            };
            registry.insert(bundle, &bundle_cfg.aliases)?;
        }
        info!(
            bundles = registry.bundles.len(),
            tickers = registry.index.len(),
            "Model registry loaded"
        );
        Ok(registry)
    }

    /// Register a bundle under its canonical name plus any aliases.
    pub fn insert(&mut self, bundle: ModelBundle, aliases: &[String]) -> Result<()> {
        let idx = self.bundles.len();
        for key in std::iter::once(&bundle.name).chain(aliases.iter()) {
            if self.index.insert(key.clone(), idx).is_some() {
                bail!("Ticker '{key}' is mapped to more than one model bundle");
            }
        }
        self.bundles.push(bundle);
        Ok(())
    }

    /// Resolve a ticker spelling (canonical or alias) to its bundle.
    pub fn resolve(&self, ticker: &str) -> Option<&ModelBundle> {
        self.index.get(ticker).map(|&idx| &self.bundles[idx])
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Inference backend
// ---------------------------------------------------------------------------

/// Single-shot next-day price inference over a loaded model and scaler.
///
/// Synchronous by contract: one call, one prediction, no state carried
/// between calls.
#[cfg_attr(test, automock)]
pub trait InferenceBackend: Send + Sync {
    fn predict_single(
        &self,
        model: &ModelArtifact,
        prices: &PriceSeries,
        scaler: &ScalerArtifact,
    ) -> Result<f64>;

    /// Backend identifier for logging.
    fn name(&self) -> &str;
}

/// Trailing-average fallback backend.
///
/// Ignores the artifacts and applies the same placeholder rule as the
/// heuristic estimator. Used by the smoke binary until a real model
/// runtime is linked in.
#[derive(Debug, Clone)]
pub struct MovingAverageBackend {
    window: usize,
    markup: f64,
}

impl MovingAverageBackend {
    pub fn new(window: usize, markup: f64) -> Self {
        Self { window, markup }
    }
}

impl Default for MovingAverageBackend {
    fn default() -> Self {
        Self::new(3, 0.01)
    }
}

impl InferenceBackend for MovingAverageBackend {
    fn predict_single(
        &self,
        _model: &ModelArtifact,
        prices: &PriceSeries,
        _scaler: &ScalerArtifact,
    ) -> Result<f64> {
        let tail = prices.trailing(self.window);
        Ok(tail.iter().sum::<f64>() / tail.len() as f64 * (1.0 + self.markup))
    }

    fn name(&self) -> &str {
        "moving-average"
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Dispatch failure.
///
/// `WrongSeriesLength` and `UnknownTicker` are fatal in the original
/// sense: the standalone dispatcher cannot proceed and the hosting
/// binary is expected to print the diagnostic and exit. `Inference`
/// failures are ordinary propagated errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Error: You must provide exactly {expected} stock values.")]
    WrongSeriesLength { expected: usize, got: usize },

    #[error("Ticker not recognized. Please try again.")]
    UnknownTicker(String),

    #[error("Inference failed for {ticker}")]
    Inference {
        ticker: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Whether the hosting binary should treat this as unrecoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DispatchError::WrongSeriesLength { .. } | DispatchError::UnknownTicker(_)
        )
    }
}

/// Routes a (ticker, prices) pair to its model bundle and runs a
/// single-shot prediction. Stateless across calls; the registry is
/// read-only for the dispatcher's lifetime.
pub struct Dispatcher {
    registry: ModelRegistry,
    backend: Box<dyn InferenceBackend>,
    series_len: usize,
}

impl Dispatcher {
    pub fn new(registry: ModelRegistry, backend: Box<dyn InferenceBackend>, series_len: usize) -> Self {
        Self {
            registry,
            backend,
            series_len,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Predict the next-day price for `ticker` from its last closes.
    pub fn predict(&self, ticker: &str, prices: &[f64]) -> Result<f64, DispatchError> {
        let series = PriceSeries::new(prices.to_vec(), self.series_len).map_err(|e| {
            DispatchError::WrongSeriesLength {
                expected: e.expected,
                got: e.got,
            }
        })?;

        let bundle = self
            .registry
            .resolve(ticker)
            .ok_or_else(|| DispatchError::UnknownTicker(ticker.to_string()))?;

        debug!(
            ticker,
            bundle = %bundle.name,
            backend = self.backend.name(),
            "Dispatching single-shot prediction"
        );

        self.backend
            .predict_single(&bundle.model, &series, &bundle.scaler)
            .map_err(|source| DispatchError::Inference {
                ticker: ticker.to_string(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::always;

    fn bundle(name: &str) -> ModelBundle {
        ModelBundle {
            name: name.to_string(),
            model: ModelArtifact::from_bytes(
                format!("{name}.pt"),
                format!("{name}-model").into_bytes(),
            ),
            scaler: ScalerArtifact::from_bytes(
                format!("{name}.pkl"),
                format!("{name}-scaler").into_bytes(),
            ),
        }
    }

    fn sample_registry() -> ModelRegistry {
        let mut registry = ModelRegistry::default();
        registry.insert(bundle("ETH"), &[]).unwrap();
        registry
            .insert(bundle("AMZN"), &["AMAZON".to_string()])
            .unwrap();
        registry
            .insert(bundle("GOOG"), &["GOOGL".to_string()])
            .unwrap();
        registry.insert(bundle("TSLA"), &[]).unwrap();
        registry
    }

    const WEEK: [f64; 7] = [700.0, 715.0, 720.0, 710.0, 725.0, 730.0, 740.0];

    #[test]
    fn test_alias_resolves_to_same_bundle() {
        let registry = sample_registry();
        assert_eq!(registry.resolve("AMAZON").unwrap().name, "AMZN");
        assert_eq!(registry.resolve("GOOGL").unwrap().name, "GOOG");
        for ticker in ["ETH", "AMZN", "GOOG", "TSLA"] {
            assert_eq!(registry.resolve(ticker).unwrap().name, ticker);
        }
    }

    #[test]
    fn test_resolution_is_case_sensitive() {
        let registry = sample_registry();
        assert!(registry.resolve("tsla").is_none());
        assert!(registry.resolve("Amazon").is_none());
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut registry = ModelRegistry::default();
        registry.insert(bundle("ETH"), &[]).unwrap();
        let err = registry
            .insert(bundle("ETC"), &["ETH".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("ETH"));
    }

    #[test]
    fn test_dispatch_routes_to_resolved_bundle() {
        let mut backend = MockInferenceBackend::new();
        backend
            .expect_predict_single()
            .withf(|model, prices, scaler| {
                model.bytes() == b"AMZN-model"
                    && scaler.bytes() == b"AMZN-scaler"
                    && prices.len() == 7
            })
            .times(1)
            .returning(|_, _, _| Ok(123.45));
        backend.expect_name().return_const("mock".to_string());

        let dispatcher = Dispatcher::new(sample_registry(), Box::new(backend), 7);
        // Alias spelling must reach the same bundle as the canonical name.
        let predicted = dispatcher.predict("AMAZON", &WEEK).unwrap();
        assert_eq!(predicted, 123.45);
    }

    #[test]
    fn test_wrong_series_length_is_fatal() {
        let dispatcher = Dispatcher::new(
            sample_registry(),
            Box::new(MovingAverageBackend::default()),
            7,
        );
        let err = dispatcher.predict("TSLA", &[700.0, 715.0]).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Error: You must provide exactly 7 stock values."
        );
    }

    #[test]
    fn test_unknown_ticker_is_fatal() {
        let dispatcher = Dispatcher::new(
            sample_registry(),
            Box::new(MovingAverageBackend::default()),
            7,
        );
        let err = dispatcher.predict("DOGE", &WEEK).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Ticker not recognized. Please try again.");
    }

    #[test]
    fn test_inference_error_is_not_fatal() {
        let mut backend = MockInferenceBackend::new();
        backend
            .expect_predict_single()
            .with(always(), always(), always())
            .returning(|_, _, _| Err(anyhow::anyhow!("runtime unavailable")));
        backend.expect_name().return_const("mock".to_string());

        let dispatcher = Dispatcher::new(sample_registry(), Box::new(backend), 7);
        let err = dispatcher.predict("ETH", &WEEK).unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, DispatchError::Inference { ref ticker, .. } if ticker == "ETH"));
    }

    #[test]
    fn test_moving_average_backend_math() {
        let backend = MovingAverageBackend::default();
        let series = PriceSeries::new(WEEK.to_vec(), 7).unwrap();
        let predicted = backend
            .predict_single(
                &ModelArtifact::from_bytes("x.pt", vec![]),
                &series,
                &ScalerArtifact::from_bytes("x.pkl", vec![]),
            )
            .unwrap();
        let expected = (725.0 + 730.0 + 740.0) / 3.0 * 1.01;
        assert!((predicted - expected).abs() < 1e-9);
    }

    #[test]
    fn test_registry_len() {
        let registry = sample_registry();
        assert_eq!(registry.len(), 4);
        assert!(!registry.is_empty());
        assert!(ModelRegistry::default().is_empty());
    }
}
