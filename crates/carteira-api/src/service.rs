//! # CRUD Service
//!
//! One generic service drives both resources. Reads are served from the
//! in-memory [`Store`]; mutations change the store first and then, when a
//! database pool is configured, write the change through. A failed write
//! restores the previous in-memory state before the error is returned, so
//! memory and database never disagree about a mutation the caller saw fail.
//!
//! Mutations of one entity are serialized by a per-service write lock held
//! from the store change until the write-through settles. A rollback can
//! therefore never overwrite a change another request made in between.
//!
//! Shape validation happens at the HTTP edge. The service enforces the
//! rules that depend on the operation: where an id may or must appear, and
//! that a delete template is not empty.

use std::sync::Arc;

use carteira_core::{Entity, Filter, Identified, ValidationError};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::db::Table;
use crate::state::Store;

/// Errors raised by [`CrudService`] operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("no {entity} matches the given template")]
    NoMatch { entity: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database write failed: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("{entity} id sequence exhausted")]
    IdsExhausted { entity: &'static str },
}

/// CRUD operations over one entity type.
#[derive(Debug)]
pub struct CrudService<E: Entity> {
    store: Store<E>,
    db_pool: Option<PgPool>,
    write_lock: Arc<Mutex<()>>,
}

impl<E: Entity> Clone for CrudService<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            db_pool: self.db_pool.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<E: Table> CrudService<E> {
    /// Service with an empty store.
    pub fn new(db_pool: Option<PgPool>) -> Self {
        Self {
            store: Store::new(),
            db_pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The backing in-memory store.
    pub fn store(&self) -> &Store<E> {
        &self.store
    }

    /// Load every persisted record into the store. Returns the count loaded.
    pub async fn hydrate(&self, pool: &PgPool) -> Result<usize, sqlx::Error> {
        let records = E::load_all(pool).await?;
        let count = records.len();
        for record in records {
            self.store.put(record.id(), record);
        }
        Ok(count)
    }

    /// Store a new record under a freshly assigned id.
    pub async fn create(&self, input: E::Input) -> Result<E, ServiceError> {
        if input.claimed_id().is_some() {
            return Err(ValidationError::UnexpectedId.into());
        }

        let _guard = self.write_lock.lock().await;
        let record = self
            .store
            .insert_with(|id| E::from_input(id, input))
            .ok_or(ServiceError::IdsExhausted { entity: E::NAME })?;

        if let Some(pool) = &self.db_pool {
            if let Err(e) = E::insert(pool, &record).await {
                self.store.remove(record.id());
                return Err(persistence_failure::<E>("insert", record.id(), e));
            }
        }

        Ok(record)
    }

    /// Every record matching `filter`, in id order.
    ///
    /// An empty template matches everything. No match at all is
    /// [`ServiceError::NoMatch`].
    pub fn read(&self, filter: &E::Filter) -> Result<Vec<E>, ServiceError> {
        let found = self.store.find(|r| r.matches(filter));
        if found.is_empty() {
            return Err(ServiceError::NoMatch { entity: E::NAME });
        }
        Ok(found)
    }

    pub fn read_by_id(&self, id: i32) -> Result<E, ServiceError> {
        self.store.get(id).ok_or(ServiceError::NotFound {
            entity: E::NAME,
            id,
        })
    }

    /// Overwrite the fields present in `patch` on record `id`.
    pub async fn update_part(&self, id: i32, patch: E::Patch) -> Result<E, ServiceError> {
        check_path_id(id, patch.claimed_id())?;
        let _guard = self.write_lock.lock().await;
        let (before, after) = self
            .store
            .update(id, |r| r.apply_patch(patch))
            .ok_or(ServiceError::NotFound {
                entity: E::NAME,
                id,
            })?;
        self.write_update(before, after).await
    }

    /// Replace every field of record `id`.
    pub async fn update_full(&self, id: i32, input: E::Input) -> Result<E, ServiceError> {
        check_path_id(id, input.claimed_id())?;
        let _guard = self.write_lock.lock().await;
        let (before, after) = self
            .store
            .update(id, |r| *r = E::from_input(id, input))
            .ok_or(ServiceError::NotFound {
                entity: E::NAME,
                id,
            })?;
        self.write_update(before, after).await
    }

    /// Replace the record named by the payload's own id.
    pub async fn update(&self, input: E::Input) -> Result<E, ServiceError> {
        let id = input.claimed_id().ok_or(ValidationError::MissingId)?;
        self.update_full(id, input).await
    }

    pub async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.store.remove(id).ok_or(ServiceError::NotFound {
            entity: E::NAME,
            id,
        })?;

        if let Some(pool) = &self.db_pool {
            if let Err(e) = written(E::delete(pool, id).await) {
                self.store.put(id, removed);
                return Err(persistence_failure::<E>("delete", id, e));
            }
        }

        Ok(())
    }

    /// Remove every record matching a non-empty template.
    ///
    /// Returns the number of records removed. If a database delete fails
    /// partway, records already deleted there stay deleted and the rest are
    /// restored in memory.
    pub async fn delete(&self, filter: &E::Filter) -> Result<usize, ServiceError> {
        if filter.is_empty() {
            return Err(ValidationError::EmptyFilter.into());
        }

        let _guard = self.write_lock.lock().await;
        let removed = self.store.remove_where(|r| r.matches(filter));
        if removed.is_empty() {
            return Err(ServiceError::NoMatch { entity: E::NAME });
        }
        let count = removed.len();

        if let Some(pool) = &self.db_pool {
            let mut pending = removed.into_iter();
            while let Some((id, record)) = pending.next() {
                if let Err(e) = written(E::delete(pool, id).await) {
                    self.store.put(id, record);
                    for (id, record) in pending {
                        self.store.put(id, record);
                    }
                    return Err(persistence_failure::<E>("delete", id, e));
                }
            }
        }

        Ok(count)
    }

    async fn write_update(&self, before: E, after: E) -> Result<E, ServiceError> {
        let Some(pool) = &self.db_pool else {
            return Ok(after);
        };

        match written(E::update(pool, &after).await) {
            Ok(()) => Ok(after),
            Err(e) => {
                let id = before.id();
                self.store.put(id, before);
                Err(persistence_failure::<E>("update", id, e))
            }
        }
    }
}

fn check_path_id(path: i32, body: Option<i32>) -> Result<(), ValidationError> {
    match body {
        Some(body) if body != path => Err(ValidationError::IdMismatch { path, body }),
        _ => Ok(()),
    }
}

/// A write that matched no row means the database lost a record memory
/// still holds. Both update and delete treat that as a failed write.
fn written(result: Result<bool, sqlx::Error>) -> Result<(), sqlx::Error> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(sqlx::Error::RowNotFound),
        Err(e) => Err(e),
    }
}

fn persistence_failure<E: Entity>(op: &str, id: i32, e: sqlx::Error) -> ServiceError {
    tracing::error!(
        entity = E::NAME,
        id,
        op,
        error = %e,
        "failed to persist {} change, in-memory state restored",
        E::NAME
    );
    ServiceError::Persistence(e)
}
