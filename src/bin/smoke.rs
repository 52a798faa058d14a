//! Dispatcher smoke test: predict one hard-coded TSLA week and print it.
//!
//! Loads the configured model bundles from disk, so the artifact files
//! must exist. Fatal dispatch errors (wrong series length, unknown
//! ticker) print their diagnostic and exit nonzero; everything else
//! propagates as an ordinary error.

use anyhow::Result;

use sevencast::config::AppConfig;
use sevencast::model::{Dispatcher, ModelRegistry, MovingAverageBackend};

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    let cfg = AppConfig::load_or_default("config.toml")?;

    let registry = ModelRegistry::load(&cfg.models)?;
    let dispatcher = Dispatcher::new(
        registry,
        Box::new(MovingAverageBackend::new(
            cfg.estimator.window,
            cfg.estimator.markup,
        )),
        cfg.estimator.series_len,
    );

    let prices = [700.0, 715.0, 720.0, 710.0, 725.0, 730.0, 740.0];

    match dispatcher.predict("TSLA", &prices) {
        Ok(prediction) => {
            println!("{prediction}");
            Ok(())
        }
        Err(e) if e.is_fatal() => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
