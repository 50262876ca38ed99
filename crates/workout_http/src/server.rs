//! Router assembly and process lifecycle.
//!
//! # Responsibility
//! - Map URL + method to handlers.
//! - Open the storage handle once, serve until shutdown, then release it.

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;
use workout_core::db::{open_db, DbError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Startup or serving failure.
#[derive(Debug)]
pub enum ServerError {
    Config(String),
    Logging(String),
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "database open failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(_) | Self::Logging(_) => None,
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Builds the full HTTP surface over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/day", get(handlers::list_days).post(handlers::create_day))
        .route("/exercise", get(handlers::list_exercises))
        .route("/addExerciseToDay", post(handlers::create_exercise))
        .route("/addSetToExercise", post(handlers::create_set))
        .route("/addSetInBulk", post(handlers::create_sets_bulk))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        error!(
            "event=http_request module=http status=error method={method} path={path} http_status={} duration_ms={duration_ms} request_id={request_id}",
            status.as_u16()
        );
    } else if status.is_client_error() {
        warn!(
            "event=http_request module=http status=rejected method={method} path={path} http_status={} duration_ms={duration_ms} request_id={request_id}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=http status=ok method={method} path={path} http_status={} duration_ms={duration_ms} request_id={request_id}",
            status.as_u16()
        );
    }

    response
}

/// Initializes logging, opens the store and serves until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let logging = match config.log_dir.as_deref() {
        Some(dir) => workout_core::init_logging(&config.log_level, dir),
        None => workout_core::init_stderr_logging(&config.log_level),
    };
    logging.map_err(ServerError::Logging)?;

    let conn = open_db(&config.db_path)?;
    let state = AppState::new(conn);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=http status=ok addr={} db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=http status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_stop module=http status=error error_code=signal_failed error={err}");
    }
}
