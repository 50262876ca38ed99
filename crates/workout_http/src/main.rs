//! Workout server entry point.

use std::process::ExitCode;
use workout_http::{run, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> ExitCode {
    let result = match ServerConfig::from_env() {
        Ok(config) => run(config).await,
        Err(message) => Err(ServerError::Config(message)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("workout-server: {err}");
            ExitCode::FAILURE
        }
    }
}
