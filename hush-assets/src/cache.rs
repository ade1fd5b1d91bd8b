//! SQLite cache for static assets
//!
//! Assets are stored per named cache. Installing a manifest pre-fetches every
//! path; lookups are cache-first with an origin fallback; activation purges
//! caches that are no longer current.

use crate::manifest::Manifest;
use crate::origin::{AssetOrigin, OriginError};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Origin error for {path}: {source}")]
    Origin {
        path: String,
        #[source]
        source: OriginError,
    },
}

/// Asset cache backed by SQLite
pub struct AssetCache {
    conn: Mutex<Connection>,
}

impl AssetCache {
    /// SQL schema for the assets table
    const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS assets (
            id INTEGER PRIMARY KEY,
            cache_name TEXT NOT NULL,
            path TEXT NOT NULL,
            body BLOB NOT NULL,
            cached_at INTEGER NOT NULL,
            UNIQUE(cache_name, path)
        );
        CREATE INDEX IF NOT EXISTS idx_path ON assets(path);
        CREATE INDEX IF NOT EXISTS idx_cache_name ON assets(cache_name);
    "#;

    /// Open or create a cache database at the given path
    pub fn open(db_path: &Path) -> Result<Self, CacheError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Default database location
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hush")
            .join("assets.db")
    }

    /// Pre-fetch every manifest path and store it under the manifest's cache name
    ///
    /// All-or-nothing: if any fetch fails, nothing is stored.
    pub fn install(&self, manifest: &Manifest, origin: &dyn AssetOrigin) -> Result<usize, CacheError> {
        let mut bodies = Vec::with_capacity(manifest.paths.len());
        for path in &manifest.paths {
            let body = origin.fetch(path).map_err(|source| CacheError::Origin {
                path: path.clone(),
                source,
            })?;
            bodies.push((path.as_str(), body));
        }

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for (path, body) in &bodies {
            tx.execute(
                r#"INSERT OR REPLACE INTO assets (cache_name, path, body, cached_at)
                   VALUES (?1, ?2, ?3, ?4)"#,
                params![manifest.cache_name, path, body, now],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            cache = %manifest.cache_name,
            assets = bodies.len(),
            "Asset cache installed"
        );
        Ok(bodies.len())
    }

    /// Look up a path across all caches, newest first
    pub fn match_path(&self, path: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let conn = self.conn.lock();
        let body = conn
            .query_row(
                "SELECT body FROM assets WHERE path = ?1 ORDER BY cached_at DESC, id DESC LIMIT 1",
                [path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    /// Serve from cache, falling back to the origin on a miss
    ///
    /// Fallback responses are not added to the cache.
    pub fn fetch(&self, path: &str, origin: &dyn AssetOrigin) -> Result<Vec<u8>, CacheError> {
        if let Some(body) = self.match_path(path)? {
            return Ok(body);
        }

        tracing::debug!(path, "Asset cache miss");
        origin.fetch(path).map_err(|source| CacheError::Origin {
            path: path.to_string(),
            source,
        })
    }

    /// Delete every cache not named in `keep`, returning the purged names
    pub fn activate(&self, keep: &[&str]) -> Result<Vec<String>, CacheError> {
        let stale: Vec<String> = self
            .cache_names()?
            .into_iter()
            .filter(|name| !keep.contains(&name.as_str()))
            .collect();

        let conn = self.conn.lock();
        for name in &stale {
            conn.execute("DELETE FROM assets WHERE cache_name = ?1", [name])?;
            tracing::info!(cache = %name, "Stale asset cache purged");
        }

        Ok(stale)
    }

    /// Names of all caches present, sorted
    pub fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT DISTINCT cache_name FROM assets ORDER BY cache_name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(names)
    }

    /// Number of assets in a cache
    pub fn count(&self, cache_name: &str) -> Result<usize, CacheError> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM assets WHERE cache_name = ?1",
            [cache_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
