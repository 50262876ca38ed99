//! Day → Exercise → Set domain model.
//!
//! # Responsibility
//! - Define the stored record of each entity.
//! - Define the creation and public shapes exchanged with callers.
//!
//! # Invariants
//! - Ownership is strictly hierarchical: a set belongs to one exercise, an
//!   exercise belongs to one day.
//! - Shapes are plain structs; they share fields by convention only.

pub mod day;
pub mod exercise;
pub mod set;
