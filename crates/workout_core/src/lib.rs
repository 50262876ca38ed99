//! Core domain logic for the workout tracker.
//! This crate owns the day/exercise/set invariants and their storage.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::day::{Day, DayCreate, DayId, DayPublic, DayRange, DayUpdate};
pub use model::exercise::{
    Exercise, ExerciseCreate, ExerciseId, ExercisePublic, ExercisePublicWithSets,
    ExerciseUpdate, ExerciseWithSets,
};
pub use model::set::{Set, SetCreate, SetId, SetPublic, SetUpdate};
pub use repo::workout_repo::{
    ErrorKind, ForeignKey, RepoError, RepoResult, SqliteWorkoutRepository, WorkoutRepository,
    EXERCISE_DAY_FK, SET_EXERCISE_FK,
};
pub use service::workout_service::WorkoutService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
