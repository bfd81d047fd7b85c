//! SQLite-backed key/value store for user preferences.
//!
//! The database lives at `XDG_CONFIG_HOME/glint/preferences.sqlite` and uses
//! WAL mode so a settings screen and the gallery can share it.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    /// Opens or creates the store at the default XDG location.
    pub fn open_default() -> Result<Self> {
        let db_path = Self::default_db_path()?;
        Self::open(&db_path)
    }

    /// Returns the default database path based on XDG directories.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "glint").context("Failed to determine project directories")?;

        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

        Ok(config_dir.join("preferences.sqlite"))
    }

    /// Opens or creates the store at the specified path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open preferences at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )
        .context("Failed to configure SQLite pragmas")?;

        let store = Self { conn };
        store.create_tables()?;

        info!("Opened preference store at {:?}", path);
        Ok(store)
    }

    /// In-memory store, used when no config directory is available.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory preferences")?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
            )
            .context("Failed to create preferences table")?;

        debug!("Preference table created/verified");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read preference {key}"))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "
            INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
                params![key, value, current_timestamp()],
            )
            .with_context(|| format!("Failed to write preference {key}"))?;
        Ok(())
    }

    /// Writes several keys in one transaction.
    pub fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let now = current_timestamp();
        let tx = self
            .conn
            .transaction()
            .context("Failed to begin preferences transaction")?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "
                INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
                )
                .context("Failed to prepare preference upsert")?;
            for (key, value) in entries {
                stmt.execute(params![key, value, now])
                    .with_context(|| format!("Failed to write preference {key}"))?;
            }
        }
        tx.commit().context("Failed to commit preferences")?;
        debug!(count = entries.len(), "Saved preferences");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to remove preference {key}"))?;
        Ok(removed > 0)
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
