//! Workout query/mutation service.
//!
//! # Responsibility
//! - Provide the create/list entry points over days, exercises and sets.
//! - Assemble nested public shapes from explicit gateway reads.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Repository errors are returned unchanged.

use crate::model::day::{DayCreate, DayId, DayPublic, DayRange};
use crate::model::exercise::{
    ExerciseCreate, ExercisePublic, ExercisePublicWithSets, ExerciseWithSets,
};
use crate::model::set::{SetCreate, SetPublic};
use crate::repo::workout_repo::{RepoResult, WorkoutRepository};
use std::collections::HashMap;

/// Use-case service over a workout repository.
pub struct WorkoutService<R: WorkoutRepository> {
    repo: R,
}

impl<R: WorkoutRepository> WorkoutService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists days inside `range`, each with its exercises and their sets.
    ///
    /// Days keep gateway order; an empty range returns every day.
    pub fn list_days(&self, range: &DayRange) -> RepoResult<Vec<DayPublic>> {
        let days = self.repo.query_days(range)?;

        let mut exercises_by_day: HashMap<DayId, Vec<ExerciseWithSets>> = HashMap::new();
        for exercise in self.repo.query_exercises_for_range(range)? {
            exercises_by_day
                .entry(exercise.exercise.day_id)
                .or_default()
                .push(exercise);
        }

        Ok(days
            .into_iter()
            .map(|day| {
                let exercises = exercises_by_day.remove(&day.id).unwrap_or_default();
                day.into_public(exercises)
            })
            .collect())
    }

    /// Creates a day. Same-name days are distinct rows.
    pub fn create_day(&self, request: DayCreate) -> RepoResult<DayPublic> {
        let day = self.repo.insert_day(&request)?;
        Ok(day.into_public(Vec::new()))
    }

    /// Creates an exercise under an existing day.
    pub fn create_exercise(&self, request: ExerciseCreate) -> RepoResult<ExercisePublic> {
        self.repo.insert_exercise(&request).map(ExercisePublic::from)
    }

    /// Creates one set under an existing exercise.
    pub fn create_set(&self, request: SetCreate) -> RepoResult<SetPublic> {
        self.repo.insert_set(&request).map(SetPublic::from)
    }

    /// Creates all sets or none, returning them in input order.
    pub fn create_sets_bulk(&self, requests: Vec<SetCreate>) -> RepoResult<Vec<SetPublic>> {
        let sets = self.repo.insert_sets(&requests)?;
        Ok(sets.into_iter().map(SetPublic::from).collect())
    }

    /// Lists every exercise with its sets.
    pub fn list_exercises(&self) -> RepoResult<Vec<ExercisePublicWithSets>> {
        let exercises = self.repo.query_exercises()?;
        Ok(exercises
            .into_iter()
            .map(ExerciseWithSets::into_public)
            .collect())
    }
}
