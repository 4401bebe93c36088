//! AGGREGATOR — Cross-platform prediction market product matcher
//!
//! Entry point. Loads configuration, initialises structured logging,
//! runs the collect→match→report pipeline once, writes the CSV and review,
//! and optionally serves the dashboard until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use prediction_aggregator::config::{self, AppConfig};
use prediction_aggregator::dashboard::{self, routes::DashboardState};
use prediction_aggregator::engine::pipeline::Pipeline;
use prediction_aggregator::export;

const BANNER: &str = r#"
  ___                                  _
 / _ \ __ _  __ _ _ __ ___  __ _  __ _| |_ ___  _ __
| |_| |/ _` |/ _` | '__/ _ \/ _` |/ _` | __/ _ \| '__|
|  _  | (_| | (_| | | |  __/ (_| | (_| | || (_) | |
|_| |_|\__, |\__, |_|  \___|\__, |\__,_|\__\___/|_|
       |___/ |___/          |___/
  Prediction Market Aggregator v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::var("AGGREGATOR_CONFIG")
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?.resolve()?;

    println!("{BANNER}");
    info!(
        name = %cfg.app.pipeline.name,
        config = %config_path,
        llm_model = %cfg.app.llm.model,
        "AGGREGATOR starting up"
    );
    if cfg.has_api_key() {
        info!(env = %cfg.app.llm.api_key_env, "API key loaded");
    } else {
        warn!(env = %cfg.app.llm.api_key_env, "No API key configured");
    }

    let pipeline = Pipeline::from_config(&cfg);
    let run = pipeline.run().await?;
    info!("{run}");

    let written = export::write_outputs(&run, &cfg.app.output)?;
    info!(
        csv = %written.csv.display(),
        review = %written.review.display(),
        "Unified product data pipeline completed"
    );

    if cfg.app.dashboard.enabled {
        let state = Arc::new(DashboardState::new(
            cfg.app.pipeline.name.clone(),
            pipeline,
            run,
        ));
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        };
        dashboard::serve(state, cfg.app.dashboard.port, shutdown).await?;
    }

    info!("AGGREGATOR shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prediction_aggregator=info"));

    let json_logging = std::env::var("AGGREGATOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
