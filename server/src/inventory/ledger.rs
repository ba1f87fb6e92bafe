//! Stock Ledger
//!
//! Authoritative unsold-unit counts per product/variant. A change is
//! planned from a fresh read (pure math on [`Stock`]) and persisted with a
//! compare-and-swap keyed on the observed value:
//!
//! ```sql
//! UPDATE $product SET stock = $next WHERE stock = $prev
//! ```
//!
//! A missed swap throws `stock_conflict` which aborts the surrounding
//! transaction; callers re-plan via the bounded retry driver. The protocol
//! is identical for scalar and variant-keyed stock.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use surrealdb::method::Query;

use crate::db::repository::ProductRepository;
use crate::db::txn;
use crate::db::models::Product;
use crate::inventory::{Stock, StockError};
use crate::utils::{AppError, AppResult};

/// One guarded conditional stock write, ready to join a transaction
#[derive(Debug, Clone)]
pub struct StockWrite {
    pub product: RecordId,
    pub prev: Stock,
    pub next: Stock,
}

impl StockWrite {
    /// Append the CAS statement and its guard to a transaction chain.
    /// `idx` keeps bind names unique when a unit touches several products.
    pub fn apply_to<'r>(&self, query: Query<'r, Db>, idx: usize) -> Query<'r, Db> {
        let update = format!(
            "LET $applied_{idx} = \
             (UPDATE $prod_{idx} SET stock = $next_{idx} WHERE stock = $prev_{idx} RETURN AFTER);"
        );
        let guard = format!(
            "IF array::len($applied_{idx}) == 0 {{ THROW '{}' }};",
            txn::STOCK_CONFLICT
        );
        query
            .query(update)
            .query(guard)
            .bind((format!("prod_{idx}"), self.product.clone()))
            .bind((format!("next_{idx}"), self.next.clone()))
            .bind((format!("prev_{idx}"), self.prev.clone()))
    }
}

/// A reserve planned against current stock state
#[derive(Debug)]
pub struct PlannedReserve {
    pub product: Product,
    pub write: StockWrite,
    pub requested: i64,
    /// May be less than requested (partial fulfilment)
    pub granted: i64,
    /// Available stock for the addressed counter after the write applies
    pub remaining: i64,
}

#[derive(Clone)]
pub struct StockLedger {
    products: ProductRepository,
}

impl StockLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Plan a decrement: grants `min(requested, available)`.
    ///
    /// Fails `OutOfStock` when nothing is available and `NotFound` when
    /// the product does not exist or is inactive.
    pub async fn plan_reserve(
        &self,
        product_id: &str,
        variant: Option<&str>,
        requested: i64,
    ) -> AppResult<PlannedReserve> {
        if requested < 1 {
            return Err(AppError::Validation("quantity must be at least 1".to_string()));
        }
        let product = self.active_product(product_id).await?;
        self.plan_grant(product, variant, requested)
    }

    /// Plan an exact decrement: fails `InsufficientStock` instead of
    /// granting less than asked (used for cart quantity increases).
    pub async fn plan_reserve_exact(
        &self,
        product_id: &str,
        variant: Option<&str>,
        requested: i64,
    ) -> AppResult<PlannedReserve> {
        if requested < 1 {
            return Err(AppError::Validation("quantity must be at least 1".to_string()));
        }
        let product = self.active_product(product_id).await?;
        let available = product
            .stock
            .available(variant)
            .map_err(|e| map_stock_error(&product.name, e))?;
        if available < requested {
            return Err(AppError::InsufficientStock { available });
        }
        self.plan_grant(product, variant, requested)
    }

    /// Plan an increment for stock coming back from a reservation
    pub async fn plan_release(
        &self,
        product: &RecordId,
        variant: Option<&str>,
        qty: i64,
    ) -> AppResult<StockWrite> {
        let current = self
            .products
            .find_by_record_id(product)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::ProductMissing(product.to_string()))?;

        let next = current
            .stock
            .release(variant, qty)
            .map_err(|e| map_stock_error(&current.name, e))?;

        Ok(StockWrite {
            product: product.clone(),
            prev: current.stock,
            next,
        })
    }

    async fn active_product(&self, product_id: &str) -> AppResult<Product> {
        let product = self
            .products
            .find_by_id(product_id)
            .await
            .map_err(AppError::from)?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Product {product_id} not found")))?;
        Ok(product)
    }

    fn plan_grant(
        &self,
        product: Product,
        variant: Option<&str>,
        requested: i64,
    ) -> AppResult<PlannedReserve> {
        let (granted, next) = product
            .stock
            .reserve(variant, requested)
            .map_err(|e| map_stock_error(&product.name, e))?;

        let remaining = next
            .available(variant)
            .map_err(|e| map_stock_error(&product.name, e))?;

        let record = product
            .id
            .clone()
            .ok_or_else(|| AppError::Internal("product record without id".to_string()))?;

        Ok(PlannedReserve {
            write: StockWrite {
                product: record,
                prev: product.stock.clone(),
                next,
            },
            product,
            requested,
            granted,
            remaining,
        })
    }
}

fn map_stock_error(product_name: &str, err: StockError) -> AppError {
    match err {
        StockError::OutOfStock => AppError::OutOfStock(product_name.to_string()),
        StockError::VariantRequired => {
            AppError::Validation(format!("{product_name} requires a variant"))
        }
        StockError::UnknownVariant(label) => {
            AppError::Validation(format!("{product_name} has no variant {label}"))
        }
        StockError::VariantNotApplicable => {
            AppError::Validation(format!("{product_name} has no variants"))
        }
    }
}
