//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Store**: in-memory working set per entity, the source for every read.
//! - **CrudService**: one per entity, owns its store and the optional pool.
//! - **Database**: optional Postgres pool; when present the stores are
//!   hydrated from it on startup and every mutation is written through.
//! - **AppConfig**: environment-derived settings.

use std::collections::BTreeMap;
use std::sync::Arc;

use carteira_core::{Investimento, Pessoa};
use parking_lot::RwLock;
use sqlx::PgPool;
use thiserror::Error;

use crate::service::CrudService;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory store keyed by integer id.
///
/// The id sequence lives under the same lock as the rows, so assigning an
/// id and inserting the record is one atomic step. Ids start at 1 and are
/// never handed out twice by the same store. The lock is `parking_lot`
/// (non-poisoning) and is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<Rows<T>>>,
}

#[derive(Debug)]
struct Rows<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Rows {
                rows: BTreeMap::new(),
                last_id: 0,
            })),
        }
    }

    /// Assign the next id, build the record from it and insert it.
    ///
    /// Returns `None` once the `i32` id space is exhausted.
    pub fn insert_with(&self, build: impl FnOnce(i32) -> T) -> Option<T> {
        let mut guard = self.data.write();
        let id = guard.last_id.checked_add(1)?;
        let record = build(id);
        guard.last_id = id;
        guard.rows.insert(id, record.clone());
        Some(record)
    }

    /// Put a record under a known id, advancing the sequence past it.
    ///
    /// Used for hydration and for rolling back a failed mutation.
    pub fn put(&self, id: i32, value: T) -> Option<T> {
        let mut guard = self.data.write();
        guard.last_id = guard.last_id.max(id);
        guard.rows.insert(id, value)
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: i32) -> Option<T> {
        self.data.read().rows.get(&id).cloned()
    }

    /// List all records in id order.
    pub fn list(&self) -> Vec<T> {
        self.data.read().rows.values().cloned().collect()
    }

    /// Records satisfying `pred`, in id order.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .rows
            .values()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }

    /// Update a record in place.
    ///
    /// Returns `(before, after)`, or `None` if the id is unknown.
    pub fn update(&self, id: i32, f: impl FnOnce(&mut T)) -> Option<(T, T)> {
        let mut guard = self.data.write();
        let entry = guard.rows.get_mut(&id)?;
        let before = entry.clone();
        f(entry);
        Some((before, entry.clone()))
    }

    /// Remove a record by id.
    pub fn remove(&self, id: i32) -> Option<T> {
        self.data.write().rows.remove(&id)
    }

    /// Remove every record satisfying `pred`, returning them in id order.
    pub fn remove_where(&self, pred: impl Fn(&T) -> bool) -> Vec<(i32, T)> {
        let mut guard = self.data.write();
        let ids: Vec<i32> = guard
            .rows
            .iter()
            .filter(|(_, r)| pred(r))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| guard.rows.remove(&id).map(|r| (id, r)))
            .collect()
    }

    /// Check if a record exists.
    pub fn contains(&self, id: i32) -> bool {
        self.data.read().rows.contains_key(&id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().rows.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Plain,
    /// One JSON object per event.
    Json,
}

/// Invalid value in the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("PORT must be a number between 0 and 65535, got \"{0}\"")]
    InvalidPort(String),

    /// `LOG_FORMAT` is neither `plain` nor `json`.
    #[error("LOG_FORMAT must be \"plain\" or \"json\", got \"{0}\"")]
    InvalidLogFormat(String),

    /// `BODY_LIMIT_BYTES` is not a positive integer.
    #[error("BODY_LIMIT_BYTES must be a positive integer, got \"{0}\"")]
    InvalidBodyLimit(String),
}

/// Application configuration.
///
/// Custom `Debug` redacts the `database_url`, which usually embeds credentials.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` runs in-memory only.
    pub database_url: Option<String>,
    /// Tracing output format.
    pub log_format: LogFormat,
    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,
}

impl AppConfig {
    /// Default request body limit: 2 MiB.
    pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Unset (or empty) variables fall back to defaults; set but invalid
    /// values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "plain" | "text" => LogFormat::Plain,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidLogFormat(raw)),
            },
            None => defaults.log_format,
        };

        let body_limit = match var("BODY_LIMIT_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidBodyLimit(raw)),
            },
            None => defaults.body_limit,
        };

        Ok(Self {
            port,
            database_url: var("DATABASE_URL"),
            log_format,
            body_limit,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            log_format: LogFormat::Plain,
            body_limit: Self::DEFAULT_BODY_LIMIT,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: every field is a handle to shared data.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pessoas: CrudService<Pessoa>,
    pub investimentos: CrudService<Investimento>,

    /// PostgreSQL pool for write-through persistence. `None` means the
    /// in-memory stores are the only copy.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// State with the given configuration and optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            pessoas: CrudService::new(db_pool.clone()),
            investimentos: CrudService::new(db_pool.clone()),
            db_pool,
            config,
        }
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a pool is available. Id sequences resume
    /// after the highest id loaded.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let pessoas = self.pessoas.hydrate(pool).await?;
        let investimentos = self.investimentos.hydrate(pool).await?;

        tracing::info!(pessoas, investimentos, "Hydrated in-memory stores from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
