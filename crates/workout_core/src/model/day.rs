//! Day entity: one training session and root of the hierarchy.

use crate::model::exercise::{ExercisePublicWithSets, ExerciseWithSets};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned day identifier.
pub type DayId = i64;

/// Caller-supplied fields for a new day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCreate {
    pub name: String,
    /// Session time. The gateway stamps the current time when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DayCreate {
    /// Creates a request stamped with the time of insertion.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }

    /// Creates a request for a session that happened at `created_at`.
    pub fn at(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at: Some(created_at),
        }
    }
}

/// Persisted day row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub id: DayId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Day {
    /// Projects this row and its already-loaded exercises to the public shape.
    pub fn into_public(self, exercises: Vec<ExerciseWithSets>) -> DayPublic {
        DayPublic {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            exercises: exercises
                .into_iter()
                .map(ExerciseWithSets::into_public)
                .collect(),
        }
    }
}

/// Day as returned to callers, with nested exercises and their sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPublic {
    pub id: DayId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<ExercisePublicWithSets>,
}

/// Optional date window over `created_at`. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    #[serde(default)]
    pub date_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_end: Option<DateTime<Utc>>,
}

impl DayRange {
    /// Returns whether `at` falls inside this window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.date_start.map_or(true, |start| at >= start)
            && self.date_end.map_or(true, |end| at <= end)
    }
}

/// Partial replacement for a day. Not wired to any endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayUpdate {
    pub name: Option<String>,
}

impl DayUpdate {
    pub fn apply_to(self, day: &mut Day) {
        if let Some(name) = self.name {
            day.name = name;
        }
    }
}
