//! Set entity: one measured unit of work within an exercise.

use crate::model::exercise::ExerciseId;
use serde::{Deserialize, Serialize};

/// Storage-assigned set identifier.
pub type SetId = i64;

/// Caller-supplied fields for a new set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCreate {
    /// What `count` measures, e.g. `reps`, `seconds`, `kg`.
    pub unit: String,
    pub count: i64,
    /// Must reference an existing exercise.
    pub exercise_id: ExerciseId,
}

impl SetCreate {
    pub fn new(unit: impl Into<String>, count: i64, exercise_id: ExerciseId) -> Self {
        Self {
            unit: unit.into(),
            count,
            exercise_id,
        }
    }
}

/// Persisted set row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Set {
    pub id: SetId,
    pub unit: String,
    pub count: i64,
    pub exercise_id: ExerciseId,
}

/// Set as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPublic {
    pub id: SetId,
    pub unit: String,
    pub count: i64,
    pub exercise_id: ExerciseId,
}

impl From<Set> for SetPublic {
    fn from(value: Set) -> Self {
        Self {
            id: value.id,
            unit: value.unit,
            count: value.count,
            exercise_id: value.exercise_id,
        }
    }
}

/// Partial replacement for a set. Not wired to any endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUpdate {
    pub unit: Option<String>,
    pub count: Option<i64>,
    pub exercise_id: Option<ExerciseId>,
}

impl SetUpdate {
    pub fn apply_to(self, set: &mut Set) {
        if let Some(unit) = self.unit {
            set.unit = unit;
        }
        if let Some(count) = self.count {
            set.count = count;
        }
        if let Some(exercise_id) = self.exercise_id {
            set.exercise_id = exercise_id;
        }
    }
}
