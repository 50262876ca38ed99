//! HTTP request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use workout_core::{
    DayCreate, DayPublic, DayRange, ExerciseCreate, ExercisePublic, ExercisePublicWithSets,
    SetCreate, SetPublic,
};

/// Raw `GET /day` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRangeQuery {
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

impl DayRangeQuery {
    /// Parses both bounds. Blank values count as absent.
    pub fn into_range(self) -> Result<DayRange, ApiError> {
        Ok(DayRange {
            date_start: parse_bound("date_start", self.date_start)?,
            date_end: parse_bound("date_end", self.date_end)?,
        })
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// `GET /day`
pub async fn list_days(
    State(state): State<AppState>,
    query: Result<Query<DayRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<DayPublic>>, ApiError> {
    let Query(query) = query?;
    let range = query.into_range()?;
    let days = state
        .with_service(move |service| service.list_days(&range))
        .await?;
    Ok(Json(days))
}

/// `POST /day`
pub async fn create_day(
    State(state): State<AppState>,
    payload: Result<Json<DayCreate>, JsonRejection>,
) -> Result<Json<DayPublic>, ApiError> {
    let Json(request) = payload?;
    let day = state
        .with_service(move |service| service.create_day(request))
        .await?;
    Ok(Json(day))
}

/// `GET /exercise`
pub async fn list_exercises(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExercisePublicWithSets>>, ApiError> {
    let exercises = state
        .with_service(|service| service.list_exercises())
        .await?;
    Ok(Json(exercises))
}

/// `POST /addExerciseToDay`
pub async fn create_exercise(
    State(state): State<AppState>,
    payload: Result<Json<ExerciseCreate>, JsonRejection>,
) -> Result<Json<ExercisePublic>, ApiError> {
    let Json(request) = payload?;
    let exercise = state
        .with_service(move |service| service.create_exercise(request))
        .await?;
    Ok(Json(exercise))
}

/// `POST /addSetToExercise`
pub async fn create_set(
    State(state): State<AppState>,
    payload: Result<Json<SetCreate>, JsonRejection>,
) -> Result<Json<SetPublic>, ApiError> {
    let Json(request) = payload?;
    let set = state
        .with_service(move |service| service.create_set(request))
        .await?;
    Ok(Json(set))
}

/// `POST /addSetInBulk`
pub async fn create_sets_bulk(
    State(state): State<AppState>,
    payload: Result<Json<Vec<SetCreate>>, JsonRejection>,
) -> Result<Json<Vec<SetPublic>>, ApiError> {
    let Json(requests) = payload?;
    let sets = state
        .with_service(move |service| service.create_sets_bulk(requests))
        .await?;
    Ok(Json(sets))
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), or a
/// plain `YYYY-MM-DD` (midnight UTC).
fn parse_bound(name: &str, raw: Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc()));
    }

    Err(ApiError::Validation(format!(
        "`{name}` must be an ISO-8601 datetime, got `{value}`"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::TimeZone;

    fn test_state() -> AppState {
        AppState::in_memory().expect("in-memory store should open")
    }

    fn range_query(
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Query<DayRangeQuery>, QueryRejection> {
        Ok(Query(DayRangeQuery {
            date_start: start.map(str::to_string),
            date_end: end.map(str::to_string),
        }))
    }

    #[test]
    fn parse_bound_accepts_iso_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        for raw in [
            "2024-01-15T00:00:00Z",
            "2024-01-15T01:00:00+01:00",
            "2024-01-15T00:00:00",
            "2024-01-15",
        ] {
            let parsed = parse_bound("date_start", Some(raw.to_string())).unwrap();
            assert_eq!(parsed, Some(expected), "{raw}");
        }
        assert_eq!(parse_bound("date_end", Some("  ".to_string())).unwrap(), None);
    }

    #[test]
    fn parse_bound_rejects_garbage() {
        let err = parse_bound("date_end", Some("last tuesday".to_string())).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("date_end"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check(State(test_state())).await;
        assert_eq!(body.status, "healthy");
        assert!(!body.version.is_empty());
    }

    #[tokio::test]
    async fn test_create_day_and_list() {
        let state = test_state();

        let Json(day) = create_day(State(state.clone()), Ok(Json(DayCreate::new("legs"))))
            .await
            .expect("create day should succeed");
        assert_eq!(day.name, "legs");

        let Json(days) = list_days(State(state), range_query(None, None))
            .await
            .expect("list days should succeed");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].id, day.id);
    }

    #[tokio::test]
    async fn test_list_days_filters_by_query_window() {
        let state = test_state();
        for (name, month) in [("jan", 1), ("feb", 2), ("mar", 3)] {
            let at = Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap();
            create_day(State(state.clone()), Ok(Json(DayCreate::at(name, at))))
                .await
                .expect("create day should succeed");
        }

        let Json(days) = list_days(
            State(state),
            range_query(Some("2024-01-15T00:00:00"), Some("2024-02-15T00:00:00")),
        )
        .await
        .expect("list days should succeed");
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].name, "feb");
    }

    #[tokio::test]
    async fn test_list_days_rejects_bad_date() {
        let err = list_days(State(test_state()), range_query(Some("soon"), None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_exercise_invalid_day() {
        let err = create_exercise(
            State(test_state()),
            Ok(Json(ExerciseCreate::new("squat", 42))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_set_and_list_exercises() {
        let state = test_state();
        let Json(day) = create_day(State(state.clone()), Ok(Json(DayCreate::new("pull"))))
            .await
            .unwrap();
        let Json(exercise) = create_exercise(
            State(state.clone()),
            Ok(Json(ExerciseCreate::new("deadlift", day.id))),
        )
        .await
        .unwrap();
        let Json(set) = create_set(
            State(state.clone()),
            Ok(Json(SetCreate::new("kg", 140, exercise.id))),
        )
        .await
        .unwrap();
        assert_eq!(set.exercise_id, exercise.id);

        let Json(exercises) = list_exercises(State(state)).await.unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].sets, vec![set]);
    }

    #[tokio::test]
    async fn test_create_sets_bulk_invalid_exercise() {
        let err = create_sets_bulk(
            State(test_state()),
            Ok(Json(vec![SetCreate::new("reps", 5, 7)])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("input index 0"));
    }
}
