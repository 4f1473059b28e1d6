//! Append-only SQLite store for completed feedback cycles.
//!
//! Every call opens its own connection and closes it when done.

use rusqlite::{Connection, params};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors from the response store.
#[derive(Debug)]
pub enum DatabaseError {
    /// Failed to open the database file.
    Open { path: PathBuf, source: rusqlite::Error },
    /// A statement failed.
    Query(rusqlite::Error),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open database '{}': {}", path.display(), source)
            }
            Self::Query(source) => write!(f, "database query failed: {}", source),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Query(source) => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Query(e)
    }
}

/// A row to insert.
#[derive(Debug, Clone)]
pub struct NewResponse<'a> {
    pub user_id: i64,
    pub user_input: &'a str,
    pub sentiment_score: f64,
    pub selected_techniques: &'a str,
    pub feedback: &'a str,
}

/// A stored row.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub id: i64,
    pub user_id: i64,
    pub timestamp: String,
    pub user_input: String,
    pub sentiment_score: f64,
    pub selected_techniques: String,
    pub feedback: String,
}

/// Handle to the response database file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open the database at `path`, creating the table if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let db = Self { path: path.as_ref().to_path_buf() };
        let conn = db.connect()?;
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS user_responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                user_input TEXT,
                sentiment_score REAL,
                selected_techniques TEXT,
                feedback TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_user_responses_user_id ON user_responses(user_id);
        "#)?;
        info!("Database ready at {:?}", db.path);
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, DatabaseError> {
        Connection::open(&self.path)
            .map_err(|e| DatabaseError::Open { path: self.path.clone(), source: e })
    }

    /// Append one row. Returns the new row id.
    pub fn save_response(&self, response: &NewResponse<'_>) -> Result<i64, DatabaseError> {
        let conn = self.connect()?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        conn.execute(
            "INSERT INTO user_responses (user_id, timestamp, user_input, sentiment_score, selected_techniques, feedback)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                response.user_id,
                timestamp,
                response.user_input,
                response.sentiment_score,
                response.selected_techniques,
                response.feedback,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Inserted response {} for user {}", id, response.user_id);
        Ok(id)
    }

    /// All rows for a user, oldest first.
    #[cfg(test)]
    pub fn responses_for_user(&self, user_id: i64) -> Result<Vec<ResponseRecord>, DatabaseError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, timestamp, user_input, sentiment_score, selected_techniques, feedback
             FROM user_responses WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(ResponseRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                timestamp: row.get(2)?,
                user_input: row.get(3)?,
                sentiment_score: row.get(4)?,
                selected_techniques: row.get(5)?,
                feedback: row.get(6)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Total number of stored rows.
    pub fn count(&self) -> Result<usize, DatabaseError> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM user_responses", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
