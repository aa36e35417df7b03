//! Key/value backends for the session store.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::error::SessionError;

/// Session-scoped key/value storage.
///
/// Multi-key writes must be all-or-nothing.
pub trait SessionBackend {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), SessionError>;
    fn remove_many(&mut self, keys: &[&str]) -> Result<(), SessionError>;
}

/// Plain in-memory map.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), SessionError> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> Result<(), SessionError> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

/// In-memory SQLite key/value table. Lives exactly as long as this value,
/// which is the session.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// # Errors
    /// Returns an error if the in-memory database cannot be created.
    pub fn open() -> Result<Self, SessionError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl SessionBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), SessionError> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> Result<(), SessionError> {
        let tx = self.conn.transaction()?;
        for key in keys {
            tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(())
    }
}
