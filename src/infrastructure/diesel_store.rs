//! PostgreSQL adapter.
//!
//! The checkout unit of work runs in a SERIALIZABLE transaction and every
//! product write is a compare-and-swap on the `revision` read earlier in the
//! same transaction. Either mechanism detecting a concurrent writer surfaces as
//! [`DomainError::TransactionConflict`], which the [`RetryPolicy`] retries.

use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::DatabaseErrorKind;
use diesel::upsert::excluded;

use crate::db::DbPool;
use crate::domain::catalog::{Product, Variant};
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::{CatalogRepository, CatalogTransaction, CheckoutSettings, CheckoutStore};
use crate::schema::{order_outbox, orders, products};

use super::models::{encode, NewOrderRow, NewOutboxEventRow, NewProductRow, ProductRow};
use super::retry::RetryPolicy;
use super::settings_repo::load_settings;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::SerializationFailure | DatabaseErrorKind::UniqueViolation,
                _,
            ) => DomainError::TransactionConflict,
            other => DomainError::Storage(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
    retry: RetryPolicy,
}

impl DieselStore {
    pub fn new(pool: DbPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub(crate) fn conn(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<PgConnection>>, DomainError> {
        Ok(self.pool.get()?)
    }

    /// Creates or replaces a product. Replacing bumps the revision, so any
    /// checkout that read the old row conflicts at commit.
    pub fn upsert_product(&self, product: &Product) -> Result<(), DomainError> {
        let row = NewProductRow::from_product(product)?;
        let mut conn = self.conn()?;
        diesel::insert_into(products::table)
            .values(&row)
            .on_conflict(products::id)
            .do_update()
            .set((
                products::name.eq(excluded(products::name)),
                products::category.eq(excluded(products::category)),
                products::is_available.eq(excluded(products::is_available)),
                products::variants.eq(excluded(products::variants)),
                products::revision.eq(products::revision + 1),
                products::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}

/// One attempt of the checkout unit on a connection inside an open transaction.
struct PgCatalogTransaction<'c> {
    conn: &'c mut PgConnection,
    revisions: HashMap<String, i64>,
}

impl<'c> PgCatalogTransaction<'c> {
    fn new(conn: &'c mut PgConnection) -> Self {
        Self {
            conn,
            revisions: HashMap::new(),
        }
    }
}

impl CatalogTransaction for PgCatalogTransaction<'_> {
    fn product(&mut self, id: &str) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut *self.conn)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };
        let (product, revision) = row.into_product()?;
        self.revisions.entry(product.id.clone()).or_insert(revision);
        Ok(Some(product))
    }

    fn write_variants(
        &mut self,
        product_id: &str,
        variants: &[Variant],
    ) -> Result<(), DomainError> {
        let revision = *self.revisions.get(product_id).ok_or_else(|| {
            DomainError::Internal(format!("product {product_id} written without being read"))
        })?;
        let updated = diesel::update(
            products::table
                .filter(products::id.eq(product_id))
                .filter(products::revision.eq(revision)),
        )
        .set((
            products::variants.eq(encode(variants, "variants")?),
            products::revision.eq(revision + 1),
            products::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut *self.conn)?;

        if updated == 0 {
            log::debug!("product {} moved past revision {}", product_id, revision);
            return Err(DomainError::TransactionConflict);
        }
        self.revisions.insert(product_id.to_string(), revision + 1);
        Ok(())
    }

    fn order_exists(&mut self, order_id: &str) -> Result<bool, DomainError> {
        Ok(
            diesel::select(diesel::dsl::exists(
                orders::table.filter(orders::order_id.eq(order_id)),
            ))
            .get_result(&mut *self.conn)?,
        )
    }

    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
        diesel::insert_into(orders::table)
            .values(&NewOrderRow::from_order(order)?)
            .execute(&mut *self.conn)?;

        // Same transaction as the order row: the relay publishes exactly what committed.
        diesel::insert_into(order_outbox::table)
            .values(&NewOutboxEventRow::order_placed(order))
            .execute(&mut *self.conn)?;
        Ok(())
    }

    fn checkout_settings(&mut self) -> Result<CheckoutSettings, DomainError> {
        load_settings(&mut *self.conn)
    }
}

impl CheckoutStore for DieselStore {
    fn transact<T, F>(&self, mut body: F) -> Result<T, DomainError>
    where
        F: FnMut(&mut dyn CatalogTransaction) -> Result<T, DomainError>,
    {
        self.retry.run(|attempt| {
            let mut conn = self.conn()?;
            log::debug!("opening checkout transaction, attempt {}", attempt);
            conn.build_transaction()
                .serializable()
                .run::<T, DomainError, _>(|conn| {
                    let mut tx = PgCatalogTransaction::new(conn);
                    body(&mut tx)
                })
        })
    }
}

impl CatalogRepository for DieselStore {
    fn find_product(&self, id: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.conn()?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(|r| r.into_product().map(|(product, _)| product))
            .transpose()
    }
}
