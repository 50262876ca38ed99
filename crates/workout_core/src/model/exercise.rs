//! Exercise entity: one movement performed within a day.

use crate::model::day::DayId;
use crate::model::set::{Set, SetPublic};
use serde::{Deserialize, Serialize};

/// Storage-assigned exercise identifier.
pub type ExerciseId = i64;

/// Caller-supplied fields for a new exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCreate {
    pub name: String,
    /// Must reference an existing day.
    pub day_id: DayId,
}

impl ExerciseCreate {
    pub fn new(name: impl Into<String>, day_id: DayId) -> Self {
        Self {
            name: name.into(),
            day_id,
        }
    }
}

/// Persisted exercise row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub day_id: DayId,
}

impl From<Exercise> for ExercisePublic {
    fn from(value: Exercise) -> Self {
        Self {
            id: value.id,
            name: value.name,
            day_id: value.day_id,
        }
    }
}

/// Exercise row joined with its sets, as loaded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseWithSets {
    pub exercise: Exercise,
    /// Ordered by set id.
    pub sets: Vec<Set>,
}

impl ExerciseWithSets {
    pub fn into_public(self) -> ExercisePublicWithSets {
        ExercisePublicWithSets {
            id: self.exercise.id,
            name: self.exercise.name,
            day_id: self.exercise.day_id,
            sets: self.sets.into_iter().map(SetPublic::from).collect(),
        }
    }
}

/// Exercise as returned right after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePublic {
    pub id: ExerciseId,
    pub name: String,
    pub day_id: DayId,
}

/// Exercise as returned by list reads, with its nested sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePublicWithSets {
    pub id: ExerciseId,
    pub name: String,
    pub day_id: DayId,
    pub sets: Vec<SetPublic>,
}

/// Partial replacement for an exercise. Not wired to any endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub day_id: Option<DayId>,
}

impl ExerciseUpdate {
    pub fn apply_to(self, exercise: &mut Exercise) {
        if let Some(name) = self.name {
            exercise.name = name;
        }
        if let Some(day_id) = self.day_id {
            exercise.day_id = day_id;
        }
    }
}
