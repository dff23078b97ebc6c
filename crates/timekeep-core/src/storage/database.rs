//! SQLite-based persistence.
//!
//! Whole collections persist as JSON under fixed keys in a `kv` table --
//! the layout the mobile client used for its key-value store. Completed
//! timers additionally land in their own table for statistics.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::data_dir;
use crate::category::Category;
use crate::error::DatabaseError;
use crate::task::Task;
use crate::timer::Timer;

/// Fixed collection keys, matching the historical storage layout.
pub const TIMERS_KEY: &str = "timers";
pub const TASKS_KEY: &str = "tasks";
pub const CATEGORIES_KEY: &str = "timer_categories";
pub const LEAVE_DAYS_KEY: &str = "timer_leave_days";

/// A finished timer session as recorded for statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTimerRecord {
    pub id: i64,
    pub timer_id: String,
    pub title: String,
    pub total_secs: u64,
    pub borrowed_secs: u64,
    pub saved_secs: u64,
    pub category_id: Option<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_completed: u64,
    pub total_allocated_secs: u64,
    pub total_borrowed_secs: u64,
    pub total_saved_secs: u64,
}

/// SQLite database for timers, tasks, categories, and session history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/timekeep/timekeep.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("timekeep.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completed_timers (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                timer_id      TEXT NOT NULL,
                title         TEXT NOT NULL,
                total_secs    INTEGER NOT NULL,
                borrowed_secs INTEGER NOT NULL,
                saved_secs    INTEGER NOT NULL,
                category_id   TEXT,
                completed_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completed_timers_completed_at
                ON completed_timers(completed_at);",
        )?;
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Collections ──────────────────────────────────────────────────

    fn load_collection<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, Box<dyn std::error::Error>> {
        match self.kv_get(key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_collection<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(items)?;
        self.kv_set(key, &json)?;
        Ok(())
    }

    pub fn load_timers(&self) -> Result<Vec<Timer>, Box<dyn std::error::Error>> {
        self.load_collection(TIMERS_KEY)
    }

    pub fn save_timers(&self, timers: &[Timer]) -> Result<(), Box<dyn std::error::Error>> {
        self.save_collection(TIMERS_KEY, timers)
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
        self.load_collection(TASKS_KEY)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), Box<dyn std::error::Error>> {
        self.save_collection(TASKS_KEY, tasks)
    }

    pub fn load_categories(&self) -> Result<Vec<Category>, Box<dyn std::error::Error>> {
        self.load_collection(CATEGORIES_KEY)
    }

    pub fn save_categories(
        &self,
        categories: &[Category],
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.save_collection(CATEGORIES_KEY, categories)
    }

    pub fn load_leave_days(&self) -> Result<Vec<NaiveDate>, Box<dyn std::error::Error>> {
        self.load_collection(LEAVE_DAYS_KEY)
    }

    pub fn save_leave_days(&self, days: &[NaiveDate]) -> Result<(), Box<dyn std::error::Error>> {
        self.save_collection(LEAVE_DAYS_KEY, days)
    }

    // ── Session history ──────────────────────────────────────────────

    /// Record a completed timer session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_completed_timer(
        &self,
        timer: &Timer,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO completed_timers
                (timer_id, title, total_secs, borrowed_secs, saved_secs, category_id, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                timer.id,
                timer.title,
                timer.total_secs,
                timer.borrowed_secs,
                timer.saved_secs,
                timer.category_id,
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All-time statistics.
    pub fn stats_all(&self) -> Result<Stats, rusqlite::Error> {
        // RFC3339 timestamps compare lexicographically; the empty cutoff
        // matches everything.
        self.stats_since("")
    }

    /// Statistics for sessions completed since local midnight (UTC).
    pub fn stats_today(&self) -> Result<Stats, rusqlite::Error> {
        let today_start = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .to_rfc3339();
        self.stats_since(&today_start)
    }

    /// Most recent completed sessions, newest first.
    pub fn recent_completed(
        &self,
        limit: u32,
    ) -> Result<Vec<CompletedTimerRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timer_id, title, total_secs, borrowed_secs, saved_secs,
                    category_id, completed_at
             FROM completed_timers
             ORDER BY completed_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let completed_at: String = row.get(7)?;
            Ok(CompletedTimerRecord {
                id: row.get(0)?,
                timer_id: row.get(1)?,
                title: row.get(2)?,
                total_secs: row.get(3)?,
                borrowed_secs: row.get(4)?,
                saved_secs: row.get(5)?,
                category_id: row.get(6)?,
                completed_at: completed_at
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;
        rows.collect()
    }

    fn stats_since(&self, cutoff: &str) -> Result<Stats, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(total_secs + borrowed_secs), 0),
                    COALESCE(SUM(borrowed_secs), 0),
                    COALESCE(SUM(saved_secs), 0)
             FROM completed_timers
             WHERE completed_at >= ?1",
            params![cutoff],
            |row| {
                Ok(Stats {
                    total_completed: row.get(0)?,
                    total_allocated_secs: row.get(1)?,
                    total_borrowed_secs: row.get(2)?,
                    total_saved_secs: row.get(3)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Recurrence, Stage};
    use crate::timer::TimerStatus;

    #[test]
    fn kv_round_trip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("missing").unwrap(), None);

        db.kv_set("k", "v1").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v1"));

        db.kv_set("k", "v2").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn timers_round_trip_with_status() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_timers().unwrap().is_empty());

        let mut timer = Timer::new("Deep work", 1800);
        timer.start().unwrap();
        db.save_timers(&[timer.clone()]).unwrap();

        let loaded = db.load_timers().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, timer.id);
        assert_eq!(loaded[0].status, TimerStatus::Running);
        assert_eq!(loaded[0].total_secs, 1800);
    }

    #[test]
    fn tasks_round_trip_with_instances() {
        let db = Database::open_memory().unwrap();
        let mut task = Task::new("Morning routine");
        task.recurrence = Some(Recurrence::Daily);
        task.stages.push(Stage::new("Stretch", 420, 15));
        task.instance_mut("2026-08-07".parse().unwrap());

        db.save_tasks(&[task.clone()]).unwrap();
        let loaded = db.load_tasks().unwrap();
        assert_eq!(loaded, vec![task]);
    }

    #[test]
    fn categories_use_the_legacy_key() {
        let db = Database::open_memory().unwrap();
        db.save_categories(&[Category::new("Work", "#3b82f6")])
            .unwrap();
        // The raw kv entry must live under the historical key.
        assert!(db.kv_get("timer_categories").unwrap().is_some());
        assert_eq!(db.load_categories().unwrap()[0].name, "Work");
    }

    #[test]
    fn leave_days_round_trip() {
        let db = Database::open_memory().unwrap();
        let days: Vec<NaiveDate> = vec!["2026-08-10".parse().unwrap()];
        db.save_leave_days(&days).unwrap();
        assert_eq!(db.load_leave_days().unwrap(), days);
        assert!(db.kv_get("timer_leave_days").unwrap().is_some());
    }

    #[test]
    fn completed_timers_feed_stats() {
        let db = Database::open_memory().unwrap();
        let mut timer = Timer::new("Deep work", 600);
        timer.start().unwrap();
        timer.borrow(120).unwrap();
        timer.complete().unwrap();

        db.record_completed_timer(&timer, Utc::now()).unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_completed, 1);
        assert_eq!(stats.total_allocated_secs, 720);
        assert_eq!(stats.total_borrowed_secs, 120);
        // Forced completion straight after start leaves nearly everything saved.
        assert!(stats.total_saved_secs > 0);

        assert_eq!(db.stats_today().unwrap().total_completed, 1);

        let recent = db.recent_completed(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].timer_id, timer.id);
        assert_eq!(recent[0].borrowed_secs, 120);
    }
}
