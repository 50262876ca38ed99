//! Persistence gateway contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the storage contract the service layer builds on.
//! - Keep SQL, identifier generation and timestamping inside core.
//!
//! # Invariants
//! - Writes never persist a dangling `day_id` or `exercise_id`.
//! - Nested reads are explicit joins, never lazy graph traversal.

pub mod workout_repo;
