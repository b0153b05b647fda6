//! Relational store contract.
//!
//! A repository answers reads directly and applies writes only through
//! [`Repository::commit`], which takes every staged [`Change`] of one flow and
//! applies them atomically. Store-level unique constraints are enforced at
//! commit time and reported as [`RepositoryError::Conflict`]; that is the
//! authoritative duplicate signal, since pre-insert existence checks can race.

use async_trait::async_trait;
use thiserror::Error;

use backoffice_core::Entity;

pub mod in_memory;
pub mod postgres;
pub mod records;

pub use in_memory::InMemoryRepository;
pub use postgres::{PostgresRepository, connect_and_migrate};
pub use records::{CustomerFilter, EmployeeFilter, ProductFilter};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A unique constraint or primary key rejected the change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An update or delete targeted a record that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    /// The flow was cancelled before the store answered.
    #[error("operation cancelled")]
    Cancelled,
}

/// A storable aggregate.
pub trait Record: Entity + Clone + Send + Sync + 'static {
    /// Query predicates supported for this record type.
    type Filter: core::fmt::Debug + Send + Sync;

    /// Short name used in logs and error messages.
    const KIND: &'static str;

    /// In-process evaluation of `filter`; mirrors the SQL the Postgres
    /// backend generates for it.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Values that must be unique across the table, as `(column, value)`.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// One staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<R: Record> {
    Insert(R),
    Update(R),
    Delete(R::Id),
}

#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    async fn find_by_id(&self, id: &R::Id) -> Result<Option<R>, RepositoryError>;

    async fn find(&self, filter: &R::Filter) -> Result<Vec<R>, RepositoryError>;

    /// Apply every change or none of them.
    async fn commit(&self, changes: Vec<Change<R>>) -> Result<(), RepositoryError>;
}

/// Writes staged by one flow, applied by a single [`Repository::commit`].
#[derive(Debug)]
#[must_use = "staged changes are discarded unless committed"]
pub struct UnitOfWork<R: Record> {
    staged: Vec<Change<R>>,
}

impl<R: Record> Default for UnitOfWork<R> {
    fn default() -> Self {
        Self { staged: Vec::new() }
    }
}

impl<R: Record> UnitOfWork<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, record: R) -> Self {
        self.staged.push(Change::Insert(record));
        self
    }

    pub fn update(mut self, record: R) -> Self {
        self.staged.push(Change::Update(record));
        self
    }

    pub fn delete(mut self, id: R::Id) -> Self {
        self.staged.push(Change::Delete(id));
        self
    }

    pub async fn commit(self, repo: &dyn Repository<R>) -> Result<(), RepositoryError> {
        if self.staged.is_empty() {
            return Ok(());
        }
        repo.commit(self.staged).await
    }
}
