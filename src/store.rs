// Local credential persistence. The database holds at most one user row:
// one player identity per installation. Upserts rewrite that row in place.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::api::Credential;
use crate::logging::Logger;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {version} failed: {reason}")]
    Migration { version: i32, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Exactly one of username and token was empty.
    #[error("Credential needs both a username and a token")]
    PartialCredential,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence for the single local credential.
pub trait CredentialStore {
    /// The stored credential, or the empty credential when there is none.
    /// Storage faults are logged and also reported as "no credential".
    fn fetch(&self) -> Credential;

    /// Create the record, or overwrite the existing one in place.
    /// A pair with only one side set is rejected and nothing is written.
    fn upsert(&self, username: &str, token: &str) -> Result<()>;
}

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "users table holding the local credential",
    sql: r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL,
            token TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
    "#,
}];

/// `CredentialStore` backed by an SQLite file.
pub struct SqliteCredentialStore {
    conn: Connection,
    logger: Arc<dyn Logger>,
}

impl SqliteCredentialStore {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub fn open(path: &Path, logger: Arc<dyn Logger>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn, logger)
    }

    pub fn open_in_memory(logger: Arc<dyn Logger>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, logger)
    }

    fn from_connection(conn: Connection, logger: Arc<dyn Logger>) -> Result<Self> {
        migrate(&conn)?;
        Ok(SqliteCredentialStore { conn, logger })
    }

    fn first_user(&self) -> Result<Option<(i64, Credential)>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, token FROM users ORDER BY id LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        Credential::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                    ))
                },
            )
            .optional()?;
        Ok(row)
    }

    #[cfg(test)]
    fn row_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap()
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn fetch(&self) -> Credential {
        match self.first_user() {
            Ok(Some((_, credential))) => credential,
            Ok(None) => Credential::default(),
            Err(e) => {
                // Treated as "no identity"; the caller can still create or log in.
                self.logger
                    .warn(&format!("Reading stored credential failed: {}", e));
                Credential::default()
            }
        }
    }

    fn upsert(&self, username: &str, token: &str) -> Result<()> {
        if username.is_empty() != token.is_empty() {
            return Err(StorageError::PartialCredential);
        }

        let now = current_timestamp();
        // Single-row table: rewrite the first row if there is one.
        match self.first_user()? {
            Some((id, _)) => {
                self.conn.execute(
                    "UPDATE users SET username = ?1, token = ?2, updated_at = ?3 WHERE id = ?4",
                    params![username, token, now, id],
                )?;
            }
            None => {
                self.conn.execute(
                    "INSERT INTO users (username, token, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                    params![username, token, now],
                )?;
            }
        }
        Ok(())
    }
}

/// Apply every migration newer than the recorded schema version.
fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL,
            description TEXT NOT NULL
        );",
    )?;

    let current: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|e| StorageError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![migration.version, current_timestamp(), migration.description],
        )?;
        tx.commit()?;
    }
    Ok(())
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
