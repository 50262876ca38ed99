//! Workout repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert days, exercises and sets, returning fully populated rows.
//! - Read days by creation window and exercises joined with their sets.
//!
//! # Invariants
//! - Every write runs in one immediate transaction that commits on success
//!   and rolls back on every error path.
//! - Referenced parents are checked explicitly before each insert; a foreign
//!   key failure reported by SQLite maps to the same error.
//! - Timestamps are persisted as epoch milliseconds.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::day::{Day, DayCreate, DayRange};
use crate::model::exercise::{Exercise, ExerciseCreate, ExerciseId, ExerciseWithSets};
use crate::model::set::{Set, SetCreate};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXERCISE_WITH_SETS_SELECT_SQL: &str = "SELECT
    e.id AS exercise_id,
    e.name AS exercise_name,
    e.day_id AS day_id,
    s.id AS set_id,
    s.unit AS unit,
    s.count AS count
FROM exercises e
LEFT JOIN sets s ON s.exercise_id = e.id";

const EXERCISE_WITH_SETS_ORDER_SQL: &str = " ORDER BY e.id ASC, s.id ASC";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("days", &["id", "name", "created_at"]),
    ("exercises", &["id", "name", "day_id"]),
    ("sets", &["id", "unit", "count", "exercise_id"]),
];

/// A parent reference held by a child row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Child entity holding the reference.
    pub entity: &'static str,
    /// Column holding the referenced id.
    pub field: &'static str,
    /// Referenced entity.
    pub target: &'static str,
}

pub const EXERCISE_DAY_FK: ForeignKey = ForeignKey {
    entity: "exercise",
    field: "day_id",
    target: "day",
};

pub const SET_EXERCISE_FK: ForeignKey = ForeignKey {
    entity: "set",
    field: "exercise_id",
    target: "exercise",
};

pub type RepoResult<T> = Result<T, RepoError>;

/// Caller-facing class of a repository failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced parent row does not exist. Client error.
    ReferentialIntegrity,
    /// Storage could not serve the call. Server error, safe to retry.
    StorageUnavailable,
}

/// Errors from workout persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Write rejected because `id` does not match any `key.target` row.
    ReferentialIntegrity {
        key: ForeignKey,
        id: i64,
        /// Position in a bulk input, when the write was part of one.
        index: Option<usize>,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid row.
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReferentialIntegrity { .. } => ErrorKind::ReferentialIntegrity,
            Self::Db(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => ErrorKind::StorageUnavailable,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ReferentialIntegrity { key, id, index } => {
                write!(
                    f,
                    "{}.{} = {id} does not reference an existing {}",
                    key.entity, key.field, key.target
                )?;
                if let Some(index) = index {
                    write!(f, " (input index {index})")?;
                }
                Ok(())
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "workout repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "workout repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "workout repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted workout data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the day/exercise/set hierarchy.
pub trait WorkoutRepository {
    /// Inserts one day; `created_at` defaults to now.
    fn insert_day(&self, day: &DayCreate) -> RepoResult<Day>;
    /// Inserts one exercise under an existing day.
    fn insert_exercise(&self, exercise: &ExerciseCreate) -> RepoResult<Exercise>;
    /// Inserts one set under an existing exercise.
    fn insert_set(&self, set: &SetCreate) -> RepoResult<Set>;
    /// Inserts all sets in one transaction, returning rows in input order.
    ///
    /// One unknown `exercise_id` fails the call and persists nothing.
    fn insert_sets(&self, sets: &[SetCreate]) -> RepoResult<Vec<Set>>;
    /// Lists days inside the inclusive creation window, by id.
    fn query_days(&self, range: &DayRange) -> RepoResult<Vec<Day>>;
    /// Lists every exercise joined with its sets.
    fn query_exercises(&self) -> RepoResult<Vec<ExerciseWithSets>>;
    /// Lists exercises whose day falls inside the creation window, joined
    /// with their sets.
    fn query_exercises_for_range(&self, range: &DayRange) -> RepoResult<Vec<ExerciseWithSets>>;
}

/// SQLite-backed workout repository over a borrowed connection handle.
pub struct SqliteWorkoutRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkoutRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_workout_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn in_unit_of_work<T>(
        &self,
        work: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl WorkoutRepository for SqliteWorkoutRepository<'_> {
    fn insert_day(&self, day: &DayCreate) -> RepoResult<Day> {
        let created_at_ms = to_epoch_ms(day.created_at.unwrap_or_else(Utc::now));
        self.in_unit_of_work(|tx| {
            tx.execute(
                "INSERT INTO days (name, created_at) VALUES (?1, ?2);",
                params![day.name.as_str(), created_at_ms],
            )?;
            Ok(Day {
                id: tx.last_insert_rowid(),
                name: day.name.clone(),
                created_at: from_epoch_ms(created_at_ms)?,
            })
        })
    }

    fn insert_exercise(&self, exercise: &ExerciseCreate) -> RepoResult<Exercise> {
        self.in_unit_of_work(|tx| {
            ensure_parent_exists(tx, "days", EXERCISE_DAY_FK, exercise.day_id, None)?;
            tx.execute(
                "INSERT INTO exercises (name, day_id) VALUES (?1, ?2);",
                params![exercise.name.as_str(), exercise.day_id],
            )
            .map_err(|err| map_write_error(err, EXERCISE_DAY_FK, exercise.day_id, None))?;
            Ok(Exercise {
                id: tx.last_insert_rowid(),
                name: exercise.name.clone(),
                day_id: exercise.day_id,
            })
        })
    }

    fn insert_set(&self, set: &SetCreate) -> RepoResult<Set> {
        self.in_unit_of_work(|tx| insert_set_row(tx, set, None))
    }

    fn insert_sets(&self, sets: &[SetCreate]) -> RepoResult<Vec<Set>> {
        self.in_unit_of_work(|tx| {
            sets.iter()
                .enumerate()
                .map(|(index, set)| insert_set_row(tx, set, Some(index)))
                .collect()
        })
    }

    fn query_days(&self, range: &DayRange) -> RepoResult<Vec<Day>> {
        let mut sql = "SELECT id, name, created_at FROM days WHERE 1 = 1".to_string();
        let mut bind_values: Vec<Value> = Vec::new();
        push_created_at_filter(&mut sql, &mut bind_values, "created_at", range);
        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut days = Vec::new();
        while let Some(row) = rows.next()? {
            days.push(parse_day_row(row)?);
        }
        Ok(days)
    }

    fn query_exercises(&self) -> RepoResult<Vec<ExerciseWithSets>> {
        load_exercises_with_sets(
            self.conn,
            &format!("{EXERCISE_WITH_SETS_SELECT_SQL}{EXERCISE_WITH_SETS_ORDER_SQL};"),
            Vec::new(),
        )
    }

    fn query_exercises_for_range(&self, range: &DayRange) -> RepoResult<Vec<ExerciseWithSets>> {
        let mut sql =
            format!("{EXERCISE_WITH_SETS_SELECT_SQL} JOIN days d ON d.id = e.day_id WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        push_created_at_filter(&mut sql, &mut bind_values, "d.created_at", range);
        sql.push_str(EXERCISE_WITH_SETS_ORDER_SQL);
        sql.push(';');

        load_exercises_with_sets(self.conn, &sql, bind_values)
    }
}

/// Appends inclusive day-window bounds on `column`; binds at most two values.
fn push_created_at_filter(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    column: &str,
    range: &DayRange,
) {
    if let Some(start) = range.date_start {
        sql.push_str(&format!(" AND {column} >= ?"));
        bind_values.push(Value::Integer(lower_bound_ms(start)));
    }
    if let Some(end) = range.date_end {
        sql.push_str(&format!(" AND {column} <= ?"));
        bind_values.push(Value::Integer(to_epoch_ms(end)));
    }
}

fn insert_set_row(conn: &Connection, set: &SetCreate, index: Option<usize>) -> RepoResult<Set> {
    ensure_parent_exists(conn, "exercises", SET_EXERCISE_FK, set.exercise_id, index)?;
    conn.execute(
        "INSERT INTO sets (unit, count, exercise_id) VALUES (?1, ?2, ?3);",
        params![set.unit.as_str(), set.count, set.exercise_id],
    )
    .map_err(|err| map_write_error(err, SET_EXERCISE_FK, set.exercise_id, index))?;
    Ok(Set {
        id: conn.last_insert_rowid(),
        unit: set.unit.clone(),
        count: set.count,
        exercise_id: set.exercise_id,
    })
}

fn ensure_parent_exists(
    conn: &Connection,
    table: &'static str,
    key: ForeignKey,
    id: i64,
    index: Option<usize>,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    if exists == 1 {
        return Ok(());
    }

    warn!(
        "event=write_rejected module=repo status=error error_code=referential_integrity entity={} field={} id={id}",
        key.entity, key.field
    );
    Err(RepoError::ReferentialIntegrity { key, id, index })
}

fn map_write_error(
    err: rusqlite::Error,
    key: ForeignKey,
    id: i64,
    index: Option<usize>,
) -> RepoError {
    if is_foreign_key_violation(&err) {
        return RepoError::ReferentialIntegrity { key, id, index };
    }
    err.into()
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn load_exercises_with_sets(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<ExerciseWithSets>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items: Vec<ExerciseWithSets> = Vec::new();

    while let Some(row) = rows.next()? {
        let exercise_id: ExerciseId = row.get("exercise_id")?;
        let starts_new = items
            .last()
            .map_or(true, |current| current.exercise.id != exercise_id);
        if starts_new {
            items.push(ExerciseWithSets {
                exercise: Exercise {
                    id: exercise_id,
                    name: row.get("exercise_name")?,
                    day_id: row.get("day_id")?,
                },
                sets: Vec::new(),
            });
        }

        // LEFT JOIN yields one NULL set row for exercises without sets.
        if let Some(set_id) = row.get::<_, Option<i64>>("set_id")? {
            let set = Set {
                id: set_id,
                unit: row.get("unit")?,
                count: row.get("count")?,
                exercise_id,
            };
            if let Some(current) = items.last_mut() {
                current.sets.push(set);
            }
        }
    }

    Ok(items)
}

fn parse_day_row(row: &Row<'_>) -> RepoResult<Day> {
    Ok(Day {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: from_epoch_ms(row.get("created_at")?)?,
    })
}

fn to_epoch_ms(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Smallest stored millisecond that is not earlier than `at`.
fn lower_bound_ms(at: DateTime<Utc>) -> i64 {
    let floor = at.timestamp_millis();
    if at.timestamp_subsec_nanos() % 1_000_000 == 0 {
        floor
    } else {
        floor + 1
    }
}

fn from_epoch_ms(value: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in days.created_at"))
    })
}

fn ensure_workout_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{from_epoch_ms, lower_bound_ms, to_epoch_ms};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn epoch_ms_conversion_keeps_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 18, 0, 0).unwrap() + Duration::milliseconds(250);
        assert_eq!(from_epoch_ms(to_epoch_ms(at)).unwrap(), at);
    }

    #[test]
    fn lower_bound_rounds_sub_millisecond_start_up() {
        let base = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(lower_bound_ms(base), to_epoch_ms(base));
        assert_eq!(
            lower_bound_ms(base + Duration::microseconds(10)),
            to_epoch_ms(base) + 1
        );
    }
}
