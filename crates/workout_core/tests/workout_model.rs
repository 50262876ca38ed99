use chrono::{TimeZone, Utc};
use workout_core::{DayCreate, DayPublic, DayRange, Set, SetCreate, SetPublic, SetUpdate};

#[test]
fn day_create_deserializes_without_created_at() {
    let request: DayCreate = serde_json::from_str(r#"{"name":"leg day"}"#).unwrap();
    assert_eq!(request, DayCreate::new("leg day"));
}

#[test]
fn day_create_rejects_missing_name() {
    let result = serde_json::from_str::<DayCreate>(r#"{"created_at":"2024-01-01T00:00:00Z"}"#);
    assert!(result.is_err());
}

#[test]
fn day_public_uses_expected_wire_fields() {
    let created_at = Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap();
    let day = DayPublic {
        id: 7,
        name: "push".to_string(),
        created_at,
        exercises: Vec::new(),
    };

    let json = serde_json::to_value(&day).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["name"], "push");
    assert_eq!(json["created_at"], "2024-02-01T06:00:00Z");
    assert_eq!(json["exercises"], serde_json::json!([]));
}

#[test]
fn set_create_requires_integer_count() {
    let ok: SetCreate =
        serde_json::from_str(r#"{"unit":"reps","count":8,"exercise_id":3}"#).unwrap();
    assert_eq!(ok, SetCreate::new("reps", 8, 3));

    let bad = serde_json::from_str::<SetCreate>(r#"{"unit":"reps","count":"eight","exercise_id":3}"#);
    assert!(bad.is_err());
}

#[test]
fn set_public_projection_keeps_all_fields() {
    let set = Set {
        id: 12,
        unit: "seconds".to_string(),
        count: 45,
        exercise_id: 4,
    };
    let public = SetPublic::from(set);
    assert_eq!(public.id, 12);
    assert_eq!(public.unit, "seconds");
    assert_eq!(public.count, 45);
    assert_eq!(public.exercise_id, 4);
}

#[test]
fn set_update_overwrites_present_fields_only() {
    let mut set = Set {
        id: 1,
        unit: "reps".to_string(),
        count: 10,
        exercise_id: 2,
    };
    SetUpdate {
        count: Some(12),
        ..SetUpdate::default()
    }
    .apply_to(&mut set);

    assert_eq!(set.unit, "reps");
    assert_eq!(set.count, 12);
    assert_eq!(set.exercise_id, 2);
}

#[test]
fn day_range_deserializes_partial_bounds() {
    let range: DayRange =
        serde_json::from_str(r#"{"date_start":"2024-01-15T00:00:00Z"}"#).unwrap();
    assert_eq!(
        range.date_start,
        Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
    );
    assert_eq!(range.date_end, None);
}
