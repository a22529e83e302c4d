//! Durable key/value state storage.
//!
//! The engine persists exactly three scalars: the last check-in, the
//! check-in interval, and the alarm flag. They are stored in a SQLite
//! `kv` table; the engine reads them once at startup and mirrors every
//! committed mutation back, without ever awaiting the write on the
//! gesture path. A failed write is logged and the in-memory state stays
//! authoritative for the session.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use indoc::indoc;
use rusqlite::{params, Connection};

use crate::error::StorageError;

use super::data_dir;

const KEY_LAST_CHECK_IN: &str = "lastCheckIn";
const KEY_CHECK_IN_INTERVAL: &str = "checkInInterval";
const KEY_ALERT_ACTIVE: &str = "alertActive";

/// The three persisted scalars, as read back at startup. Absent keys
/// (first launch, or a partially written store) come back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub last_check_in: Option<DateTime<Utc>>,
    pub interval: Option<Duration>,
    pub alert_active: bool,
}

/// Seam between the engine and the durable store.
///
/// Implementations must tolerate concurrent writers: the engine fires
/// each write from its own blocking task and never serializes them.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<PersistedState, StorageError>;
    fn save_check_in(
        &self,
        last_check_in: DateTime<Utc>,
        interval: Duration,
    ) -> Result<(), StorageError>;
    fn save_interval(&self, interval: Duration) -> Result<(), StorageError>;
    fn save_alert_active(&self, active: bool) -> Result<(), StorageError>;
}

/// SQLite-backed state store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the store at `~/.config/vigil/vigil.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir()?;
        Self::open_at(&dir.join("vigil.db"))
    }

    /// Open the store at an explicit path (tests use a temp directory).
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .lock()
            .expect("state store lock poisoned")
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            "})
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().expect("state store lock poisoned");
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("state store lock poisoned");
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl StateStore for Database {
    fn load(&self) -> Result<PersistedState, StorageError> {
        let last_check_in = match self.kv_get(KEY_LAST_CHECK_IN)? {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| StorageError::CorruptValue {
                        key: KEY_LAST_CHECK_IN.to_string(),
                        message: e.to_string(),
                    })?,
            ),
            None => None,
        };

        let interval = match self.kv_get(KEY_CHECK_IN_INTERVAL)? {
            Some(raw) => Some(Duration::seconds(raw.parse::<i64>().map_err(|e| {
                StorageError::CorruptValue {
                    key: KEY_CHECK_IN_INTERVAL.to_string(),
                    message: e.to_string(),
                }
            })?)),
            None => None,
        };

        let alert_active = match self.kv_get(KEY_ALERT_ACTIVE)? {
            Some(raw) => raw == "1",
            None => false,
        };

        Ok(PersistedState {
            last_check_in,
            interval,
            alert_active,
        })
    }

    fn save_check_in(
        &self,
        last_check_in: DateTime<Utc>,
        interval: Duration,
    ) -> Result<(), StorageError> {
        self.kv_set(KEY_LAST_CHECK_IN, &last_check_in.to_rfc3339())?;
        self.kv_set(KEY_CHECK_IN_INTERVAL, &interval.num_seconds().to_string())
    }

    fn save_interval(&self, interval: Duration) -> Result<(), StorageError> {
        self.kv_set(KEY_CHECK_IN_INTERVAL, &interval.num_seconds().to_string())
    }

    fn save_alert_active(&self, active: bool) -> Result<(), StorageError> {
        self.kv_set(KEY_ALERT_ACTIVE, if active { "1" } else { "0" })
    }
}

/// In-memory state store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<PersistedState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, as if a previous session had written it.
    pub fn seeded(last_check_in: DateTime<Utc>, interval: Duration, alert_active: bool) -> Self {
        Self {
            state: Mutex::new(PersistedState {
                last_check_in: Some(last_check_in),
                interval: Some(interval),
                alert_active,
            }),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<PersistedState, StorageError> {
        Ok(self.state.lock().expect("memory store lock poisoned").clone())
    }

    fn save_check_in(
        &self,
        last_check_in: DateTime<Utc>,
        interval: Duration,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().expect("memory store lock poisoned");
        state.last_check_in = Some(last_check_in);
        state.interval = Some(interval);
        Ok(())
    }

    fn save_interval(&self, interval: Duration) -> Result<(), StorageError> {
        self.state
            .lock()
            .expect("memory store lock poisoned")
            .interval = Some(interval);
        Ok(())
    }

    fn save_alert_active(&self, active: bool) -> Result<(), StorageError> {
        self.state
            .lock()
            .expect("memory store lock poisoned")
            .alert_active = active;
        Ok(())
    }
}
