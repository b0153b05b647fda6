//! In-memory repository for tests/dev.

use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::{Change, Record, Repository, RepositoryError};

/// In-memory table.
///
/// - Keeps insertion order, so listings are stable between writes
/// - Enforces the record's unique keys at commit, like the SQL schema does
/// - `fail_commits(true)` makes every commit fail without touching the data
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    rows: RwLock<Vec<R>>,
    fail_commits: AtomicBool,
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fail_commits: AtomicBool::new(false),
        }
    }
}

impl<R: Record> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows directly, bypassing commit checks.
    pub fn with_rows(rows: Vec<R>) -> Self {
        Self {
            rows: RwLock::new(rows),
            fail_commits: AtomicBool::new(false),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn apply<R: Record>(rows: &mut Vec<R>, change: Change<R>) -> Result<(), RepositoryError> {
    match change {
        Change::Insert(record) => {
            if rows.iter().any(|r| r.id() == record.id()) {
                return Err(RepositoryError::Conflict(format!(
                    "{} {} already exists",
                    R::KIND,
                    record.id()
                )));
            }
            rows.push(record);
        }
        Change::Update(record) => {
            let slot = rows
                .iter_mut()
                .find(|r| r.id() == record.id())
                .ok_or_else(|| RepositoryError::NotFound(format!("{} {}", R::KIND, record.id())))?;
            *slot = record;
        }
        Change::Delete(id) => {
            let before = rows.len();
            rows.retain(|r| *r.id() != id);
            if rows.len() == before {
                return Err(RepositoryError::NotFound(format!("{} {}", R::KIND, id)));
            }
        }
    }
    Ok(())
}

fn check_unique<R: Record>(rows: &[R]) -> Result<(), RepositoryError> {
    let mut seen = HashSet::new();
    for row in rows {
        for (column, value) in row.unique_keys() {
            if !seen.insert((column, value.clone())) {
                return Err(RepositoryError::Conflict(format!(
                    "{} {column} '{value}' is already taken",
                    R::KIND
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn find_by_id(&self, id: &R::Id) -> Result<Option<R>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;
        Ok(rows.iter().find(|r| r.id() == id).cloned())
    }

    async fn find(&self, filter: &R::Filter) -> Result<Vec<R>, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;
        Ok(rows.iter().filter(|r| r.matches(filter)).cloned().collect())
    }

    async fn commit(&self, changes: Vec<Change<R>>) -> Result<(), RepositoryError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend("commit rejected by store".to_string()));
        }

        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::Backend("lock poisoned".to_string()))?;

        // Work on a copy so a failing change leaves the table untouched.
        let mut next = rows.clone();
        let count = changes.len();
        for change in changes {
            apply(&mut next, change)?;
        }
        check_unique(&next)?;

        *rows = next;
        debug!(kind = R::KIND, changes = count, "committed");
        Ok(())
    }
}
