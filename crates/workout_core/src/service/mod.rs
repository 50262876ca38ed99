//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations exposed to transports.
//! - Project stored rows to public shapes.

pub mod workout_service;
