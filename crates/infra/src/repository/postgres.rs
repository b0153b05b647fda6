//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx error                           | RepositoryError |
//! |--------------------------------------|-----------------|
//! | Database, code `23505` (unique)      | `Conflict`      |
//! | anything else                        | `Backend`       |
//! | update/delete touching zero rows     | `NotFound`      |
//!
//! Each [`Repository::commit`] runs in one transaction.

use std::marker::PhantomData;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use backoffice_core::{CustomerId, EmployeeId, ProductId};
use backoffice_parties::{Customer, Employee};
use backoffice_products::{Category, Product};

use super::records::{CustomerFilter, EmployeeFilter, ProductFilter};
use super::{Change, Record, Repository, RepositoryError};

/// Open a pool and apply the embedded schema migrations.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    info!("running database migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| RepositoryError::Backend(format!("migration failed: {e}")))?;

    Ok(pool)
}

/// Table mapping for a record type.
pub trait PgMapped: Record {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    /// `None` when the row holds a value the domain cannot represent.
    fn from_row(row: &PgRow) -> Result<Option<Self>, sqlx::Error>;

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>);

    /// Pushes `SET ...` (without the `WHERE`).
    fn push_update(&self, qb: &mut QueryBuilder<'static, Postgres>);

    /// Pushes the boolean condition for `filter`.
    fn push_filter(filter: &Self::Filter, qb: &mut QueryBuilder<'static, Postgres>);
}

/// Generic repository over a [`PgMapped`] table.
#[derive(Debug, Clone)]
pub struct PostgresRepository<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PostgresRepository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

fn select<R: PgMapped>() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {} FROM {} WHERE ", R::COLUMNS, R::TABLE))
}

fn map_rows<R: PgMapped>(rows: Vec<PgRow>) -> Result<Vec<R>, RepositoryError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        match R::from_row(row).map_err(|e| map_sqlx_error("decode", e))? {
            Some(record) => out.push(record),
            None => warn!(kind = R::KIND, "skipping unmappable row"),
        }
    }
    Ok(out)
}

#[async_trait]
impl<R: PgMapped> Repository<R> for PostgresRepository<R> {
    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn find_by_id(&self, id: &R::Id) -> Result<Option<R>, RepositoryError> {
        let mut qb = select::<R>();
        qb.push("id = ").push_bind(Into::<Uuid>::into(*id));
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        Ok(map_rows::<R>(rows)?.into_iter().next())
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn find(&self, filter: &R::Filter) -> Result<Vec<R>, RepositoryError> {
        let mut qb = select::<R>();
        R::push_filter(filter, &mut qb);
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;
        map_rows(rows)
    }

    #[instrument(skip(self, changes), fields(kind = R::KIND, changes = changes.len()), err)]
    async fn commit(&self, changes: Vec<Change<R>>) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        for change in changes {
            let (mut qb, op, id) = match &change {
                Change::Insert(record) => {
                    let mut qb = QueryBuilder::new(format!("INSERT INTO {} ", R::TABLE));
                    record.push_insert(&mut qb);
                    (qb, "insert", Into::<Uuid>::into(*record.id()))
                }
                Change::Update(record) => {
                    let id: Uuid = (*record.id()).into();
                    let mut qb = QueryBuilder::new(format!("UPDATE {} ", R::TABLE));
                    record.push_update(&mut qb);
                    qb.push(" WHERE id = ").push_bind(id);
                    (qb, "update", id)
                }
                Change::Delete(id) => {
                    let id: Uuid = (*id).into();
                    let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", R::TABLE));
                    qb.push_bind(id);
                    (qb, "delete", id)
                }
            };

            let result = qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(op, e))?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound(format!("{} {id}", R::KIND)));
            }
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            classify_database_error(db_err.code().as_deref(), msg)
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Backend(format!("connection pool closed in {operation}"))
        }
        other => RepositoryError::Backend(format!("{operation} failed: {other}")),
    }
}

/// SQLSTATE `23505` is a unique or primary-key violation.
fn classify_database_error(code: Option<&str>, msg: String) -> RepositoryError {
    match code {
        Some("23505") => RepositoryError::Conflict(msg),
        _ => RepositoryError::Backend(msg),
    }
}

impl PgMapped for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static str = "id, name, email, tax_id, active";

    fn from_row(row: &PgRow) -> Result<Option<Self>, sqlx::Error> {
        Ok(Some(Customer::new(
            CustomerId::from_uuid(row.try_get("id")?),
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("email")?,
            row.try_get::<String, _>("tax_id")?,
            row.try_get("active")?,
        )))
    }

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("(id, name, email, tax_id, active) VALUES (")
            .push_bind(*self.id_typed().as_uuid())
            .push(", ")
            .push_bind(self.name().to_string())
            .push(", ")
            .push_bind(self.email().to_string())
            .push(", ")
            .push_bind(self.tax_id().to_string())
            .push(", ")
            .push_bind(self.active())
            .push(")");
    }

    fn push_update(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("SET name = ")
            .push_bind(self.name().to_string())
            .push(", active = ")
            .push_bind(self.active());
    }

    fn push_filter(filter: &CustomerFilter, qb: &mut QueryBuilder<'static, Postgres>) {
        match filter {
            CustomerFilter::AnyOf { id, tax_id, email } => {
                qb.push("(id = ").push_bind(*id.as_uuid());
                if let Some(tax_id) = tax_id {
                    qb.push(" OR tax_id = ").push_bind(tax_id.clone());
                }
                if let Some(email) = email {
                    qb.push(" OR email = ").push_bind(email.clone());
                }
                qb.push(")");
            }
            CustomerFilter::Email(email) => {
                qb.push("email = ").push_bind(email.clone());
            }
            CustomerFilter::Active => {
                qb.push("active");
            }
        }
    }
}

impl PgMapped for Employee {
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static str = "id, name, email, active";

    fn from_row(row: &PgRow) -> Result<Option<Self>, sqlx::Error> {
        Ok(Some(Employee::new(
            EmployeeId::from_uuid(row.try_get("id")?),
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("email")?,
            row.try_get("active")?,
        )))
    }

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("(id, name, email, active) VALUES (")
            .push_bind(*self.id_typed().as_uuid())
            .push(", ")
            .push_bind(self.name().to_string())
            .push(", ")
            .push_bind(self.email().to_string())
            .push(", ")
            .push_bind(self.active())
            .push(")");
    }

    fn push_update(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("SET name = ")
            .push_bind(self.name().to_string())
            .push(", email = ")
            .push_bind(self.email().to_string())
            .push(", active = ")
            .push_bind(self.active());
    }

    fn push_filter(filter: &EmployeeFilter, qb: &mut QueryBuilder<'static, Postgres>) {
        match filter {
            EmployeeFilter::AnyOf { id, email } => {
                qb.push("(id = ").push_bind(*id.as_uuid());
                if let Some(email) = email {
                    qb.push(" OR email = ").push_bind(email.clone());
                }
                qb.push(")");
            }
            EmployeeFilter::Email(email) => {
                qb.push("email = ").push_bind(email.clone());
            }
        }
    }
}

impl PgMapped for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static str = "id, name, description, price, category, active";

    fn from_row(row: &PgRow) -> Result<Option<Self>, sqlx::Error> {
        let id: Uuid = row.try_get("id")?;
        let raw_category: String = row.try_get("category")?;
        let category = match Category::parse(&raw_category) {
            Ok(category) => category,
            Err(e) => {
                warn!(product_id = %id, error = %e, "stored product has an unknown category");
                return Ok(None);
            }
        };

        Ok(Some(Product::new(
            ProductId::from_uuid(id),
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("description")?,
            row.try_get::<Decimal, _>("price")?,
            category,
            row.try_get("active")?,
        )))
    }

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("(id, name, description, price, category, active) VALUES (")
            .push_bind(*self.id_typed().as_uuid())
            .push(", ")
            .push_bind(self.name().to_string())
            .push(", ")
            .push_bind(self.description().to_string())
            .push(", ")
            .push_bind(self.price())
            .push(", ")
            .push_bind(self.category().as_str())
            .push(", ")
            .push_bind(self.active())
            .push(")");
    }

    fn push_update(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("SET name = ")
            .push_bind(self.name().to_string())
            .push(", description = ")
            .push_bind(self.description().to_string())
            .push(", price = ")
            .push_bind(self.price())
            .push(", category = ")
            .push_bind(self.category().as_str())
            .push(", active = ")
            .push_bind(self.active());
    }

    fn push_filter(filter: &ProductFilter, qb: &mut QueryBuilder<'static, Postgres>) {
        match filter {
            ProductFilter::AnyOf {
                id,
                name,
                description,
            } => {
                qb.push("(id = ")
                    .push_bind(*id.as_uuid())
                    .push(" OR name = ")
                    .push_bind(name.clone())
                    .push(" OR description = ")
                    .push_bind(description.clone())
                    .push(")");
            }
            ProductFilter::ActiveInCategory(category) => {
                qb.push("active AND category = ").push_bind(category.as_str());
            }
            ProductFilter::Active => {
                qb.push("active");
            }
        }
    }
}
