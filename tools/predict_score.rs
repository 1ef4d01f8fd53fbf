//! Predict Score
//!
//! Reads seven feature values (JSON list in model order, or a named object)
//! from the first argument or stdin, loads the model and prints the
//! prediction as JSON on stdout. Diagnostics go to stderr.

use math_score_service::{
    cli::{config_error_report, error_report, parse_input, read_input, record_from_input},
    config::AppConfig,
    error::ServiceError,
    logging::init_logging,
    models::{inference::InferenceEngine, loader::ModelLoader},
    types::PredictionResult,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::process::ExitCode;
use tracing::{error, info};

/// Output of a successful run
#[derive(Debug, Serialize)]
struct ScoreReport {
    #[serde(flatten)]
    result: PredictionResult,
    /// Input echoed back as received
    datos_entrada: Value,
    /// Path the model was loaded from
    ruta_modelo: String,
}

fn run(config: &AppConfig) -> Result<ScoreReport, ServiceError> {
    let raw = read_input()?;
    info!(input = %raw, "Input received");

    let input = parse_input(&raw)?;
    let record = record_from_input(&input)?;

    let loaded = ModelLoader::from_config(&config.models).load()?;
    let engine = InferenceEngine::new(loaded.model);
    let result = engine.predict(&record)?;

    Ok(ScoreReport {
        result,
        datos_entrada: input,
        ruta_modelo: loaded.path.display().to_string(),
    })
}

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", config_error_report(&e));
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    match run(&config) {
        Ok(report) => {
            info!(math_score = report.result.math_score, "Prediction complete");
            println!("{}", json!(report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Prediction failed");
            println!("{}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}
