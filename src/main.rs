//! Math Score Service - Main Entry Point
//!
//! Loads the regression model once, then serves validation and prediction
//! requests over HTTP. A missing or unreadable model does not stop the
//! server; it keeps answering health checks and refuses predictions.

use anyhow::{Context, Result};
use math_score_service::{
    api::{create_router, AppState},
    config::AppConfig,
    logging::init_logging,
    metrics::{MetricsReporter, ServiceMetrics},
    models::{loader::ModelLoader, Regressor},
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    init_logging(&config.logging);
    info!("Starting Math Score Service");
    info!(
        resolution = ?config.models.resolution,
        file_name = %config.models.file_name,
        "Configuration loaded successfully"
    );

    // Load the model once; failure leaves the server in degraded mode
    let loader = ModelLoader::from_config(&config.models);
    let loaded = match loader.load() {
        Ok(loaded) => {
            info!(
                path = %loaded.path.display(),
                strategy = %loaded.strategy,
                model_type = loaded.model.type_name(),
                "Model ready"
            );
            Some(loaded)
        }
        Err(e) => {
            error!(error = %e, "Model could not be loaded, predictions are disabled");
            None
        }
    };

    let metrics = Arc::new(ServiceMetrics::new());

    // Start metrics reporter
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = AppState::new(loaded, metrics.clone());
    if !state.model_loaded() {
        warn!("Serving in degraded mode: /health only reports status");
    }

    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // Print final summary
    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
