//! Validate Record
//!
//! Validates a feature payload from the first argument or stdin and prints
//! the validated record as JSON. No model is needed.

use math_score_service::{
    cli::{config_error_report, parse_input, read_input},
    config::AppConfig,
    logging::init_logging,
    validator::InputValidator,
};
use serde_json::json;
use std::process::ExitCode;
use tracing::warn;

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", config_error_report(&e));
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    let result = read_input()
        .and_then(|raw| parse_input(&raw))
        .and_then(|payload| InputValidator::new().validate(&payload));

    match result {
        Ok(record) => {
            println!("{}", json!(record));
            ExitCode::SUCCESS
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Validation failed");
            println!("{}", json!({ "error": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}
