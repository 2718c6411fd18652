//! SQLite key-value cache for protocol token metadata.

use crate::staking::TokenDescriptor;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Content-addressed metadata cache. Key = SHA-256 of the normalized identifier.
pub struct MetadataCache {
    conn: Mutex<Connection>,
}

impl MetadataCache {
    /// Open or create cache at `path`. Creates parent dirs if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, CacheError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                created_utc INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Compute content-hash key from a normalized identifier.
    pub fn key_for(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Key for a product's token list: `(protocol_id, product_id, chain_id)`.
    pub fn tokens_key(protocol_id: &str, product_id: &str, chain_id: u64) -> String {
        let req = serde_json::json!({
            "kind": "protocol_tokens",
            "protocol": protocol_id,
            "product": product_id,
            "chain": chain_id,
        });
        Self::key_for(&req.to_string())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|e| CacheError::Io(std::io::Error::other(e.to_string())))
    }

    /// Get cached value by key. Returns None if missing.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT value FROM cache WHERE key = ?1")?;
        let row = stmt
            .query_row([key], |r| r.get::<_, Vec<u8>>(0))
            .optional()?;
        Ok(row)
    }

    /// Insert or replace value for key.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let created = time::OffsetDateTime::now_utc().unix_timestamp();
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO cache (key, value, created_utc) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, created],
        )?;
        Ok(())
    }

    pub fn get_tokens(&self, key: &str) -> Result<Option<Vec<TokenDescriptor>>, CacheError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_tokens(&self, key: &str, tokens: &[TokenDescriptor]) -> Result<(), CacheError> {
        let json = serde_json::to_vec(tokens)?;
        self.set(key, &json)
    }
}
