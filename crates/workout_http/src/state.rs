//! Shared server state: the one storage handle opened at startup.

use crate::error::ApiError;
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use workout_core::db::{open_db_in_memory, DbResult};
use workout_core::{RepoResult, SqliteWorkoutRepository, WorkoutService};

/// Handle shared by every request.
///
/// Each call locks the connection for its whole duration, so a request sees
/// one consistent unit of work. A call that panicked mid-write has already
/// rolled back its transaction, so a poisoned lock is taken over as is.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    started_at: Instant,
}

impl AppState {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            started_at: Instant::now(),
        }
    }

    /// State over a private in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Runs `f` against a service over the shared handle on the blocking pool.
    pub async fn with_service<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&WorkoutService<SqliteWorkoutRepository<'_>>) -> RepoResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let guard = conn.lock().unwrap_or_else(|poisoned| {
                warn!("event=db_lock module=http status=recovered reason=poisoned");
                PoisonError::into_inner(poisoned)
            });
            let repo = SqliteWorkoutRepository::try_new(&guard)?;
            let service = WorkoutService::new(repo);
            f(&service).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::storage_unavailable(format!("storage task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use crate::error::ApiError;
    use workout_core::DayCreate;

    #[tokio::test]
    async fn requests_succeed_after_a_call_panics_while_holding_the_handle() {
        let state = AppState::in_memory().expect("in-memory store should open");

        let failed = state
            .with_service(|service| -> workout_core::RepoResult<()> {
                service.create_day(DayCreate::new("aborted"))?;
                panic!("handler bug");
            })
            .await;
        assert!(matches!(failed, Err(ApiError::StorageUnavailable(_))));

        let created = state
            .with_service(|service| service.create_day(DayCreate::new("after")))
            .await
            .expect("poisoned handle should be recovered");
        assert_eq!(created.name, "after");

        let days = state
            .with_service(|service| service.list_days(&Default::default()))
            .await
            .unwrap();
        assert_eq!(days.len(), 2);
    }
}
