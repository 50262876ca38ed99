//! HTTP transport for the workout tracker.
//! Handlers do no business logic; they decode, call the core service and
//! encode.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use server::{router, run, ServerError, REQUEST_ID_HEADER};
pub use state::AppState;
