//! Reservation Store
//!
//! One reservation (cart) per customer. Every mutation pairs the
//! reservation write with its matching stock write inside one transaction,
//! so held stock and reservation lines never diverge. The reservation
//! record itself carries `reserved_at` which doubles as an optimistic
//! guard: concurrent writers (the same user double-clicking, or the
//! expiry reaper) abort each other's units instead of interleaving.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::debug;

use crate::db::models::{PRODUCT_TABLE, Product, Reservation, ReservedItem};
use crate::db::repository::{ProductRepository, ReservationRepository, record_id};
use crate::db::txn::{self, TxnError};
use crate::inventory::{CasOutcome, RetryPolicy, StockLedger, StockWrite, retry_cas};
use crate::utils::{AppError, AppResult, now_millis};

/// Result of a reserve call; `held_quantity` may be below the requested
/// amount when stock ran short (partial fulfilment)
#[derive(Debug, serde::Serialize)]
pub struct ReserveReceipt {
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub requested_quantity: i64,
    pub held_quantity: i64,
    pub remaining_stock: i64,
}

/// Result of releasing quantity from a cart line
#[derive(Debug, serde::Serialize)]
pub struct ReleaseReceipt {
    pub new_stock: i64,
}

/// One cart line joined with its product snapshot
#[derive(Debug, serde::Serialize)]
pub struct CartLine {
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub quantity: i64,
}

#[derive(Clone)]
pub struct ReservationStore {
    db: Surreal<Db>,
    ledger: StockLedger,
    reservations: ReservationRepository,
    products: ProductRepository,
    policy: RetryPolicy,
}

impl ReservationStore {
    pub fn new(db: Surreal<Db>, policy: RetryPolicy) -> Self {
        Self {
            ledger: StockLedger::new(db.clone()),
            reservations: ReservationRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            db,
            policy,
        }
    }

    /// Reserve stock into the customer's cart, merging into an existing
    /// (product, variant) line. Grants `min(requested, available)`.
    pub async fn add_or_merge(
        &self,
        customer_key: &str,
        product_id: &str,
        variant: Option<&str>,
        quantity: i64,
    ) -> AppResult<ReserveReceipt> {
        retry_cas(&self.policy, || async move {
            let plan = self.ledger.plan_reserve(product_id, variant, quantity).await?;
            let existing = self
                .reservations
                .find_by_customer(customer_key)
                .await
                .map_err(AppError::from)?;
            let now = now_millis();

            let query = txn::begin(&self.db);
            let query = plan.write.apply_to(query, 0);
            let query = match &existing {
                Some(resv) => {
                    let items = resv.merged_items(&plan.write.product, variant, plan.granted);
                    guarded_update(query, customer_key, items, now, resv.reserved_at)
                }
                None => {
                    let items = vec![ReservedItem {
                        product: plan.write.product.clone(),
                        variant: variant.map(str::to_string),
                        quantity: plan.granted,
                    }];
                    create_reservation(query, customer_key, items, now)
                }
            };

            match txn::run(txn::commit(query)).await {
                Ok(()) => Ok(CasOutcome::Applied(ReserveReceipt {
                    product: plan.product.key(),
                    variant: variant.map(str::to_string),
                    requested_quantity: plan.requested,
                    held_quantity: plan.granted,
                    remaining_stock: plan.remaining,
                })),
                Err(e) if e.is_retryable() => {
                    debug!(customer = customer_key, product = product_id, "reserve retry: {e}");
                    Ok(CasOutcome::Conflict)
                }
                Err(e) => Err(AppError::Database(e.to_string())),
            }
        })
        .await
    }

    /// Release `quantity` units from a cart line back to stock. The line is
    /// removed entirely when its quantity reaches zero, and the reservation
    /// is deleted when its last line goes.
    pub async fn decrement(
        &self,
        customer_key: &str,
        product_id: &str,
        variant: Option<&str>,
        quantity: i64,
    ) -> AppResult<ReleaseReceipt> {
        if quantity < 1 {
            return Err(AppError::Validation("quantity must be at least 1".to_string()));
        }
        self.release_line(customer_key, product_id, variant, Some(quantity))
            .await
    }

    /// Remove a cart line entirely, releasing everything it held
    pub async fn remove(
        &self,
        customer_key: &str,
        product_id: &str,
        variant: Option<&str>,
    ) -> AppResult<ReleaseReceipt> {
        self.release_line(customer_key, product_id, variant, None).await
    }

    /// Set a cart line to an exact quantity. Zero removes the line;
    /// increases fail `InsufficientStock` rather than partially granting.
    pub async fn update_quantity(
        &self,
        customer_key: &str,
        product_id: &str,
        variant: Option<&str>,
        new_quantity: i64,
    ) -> AppResult<()> {
        if new_quantity < 0 {
            return Err(AppError::Validation("quantity must not be negative".to_string()));
        }

        let resv = self
            .reservations
            .find_by_customer(customer_key)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;
        let product = record_id(PRODUCT_TABLE, product_id);
        let line = resv
            .find_line(&product, variant)
            .ok_or_else(|| AppError::ItemNotReserved(product_id.to_string()))?;

        let delta = new_quantity - line.quantity;
        if delta > 0 {
            self.increase_line(customer_key, product_id, variant, delta).await?;
        } else if new_quantity == 0 {
            self.remove(customer_key, product_id, variant).await?;
        } else if delta < 0 {
            self.decrement(customer_key, product_id, variant, -delta).await?;
        }
        Ok(())
    }

    /// Release every line and delete the reservation. A missing
    /// reservation is already clear, not an error.
    pub async fn clear(&self, customer_key: &str) -> AppResult<()> {
        retry_cas(&self.policy, || async move {
            let resv = match self
                .reservations
                .find_by_customer(customer_key)
                .await
                .map_err(AppError::from)?
            {
                Some(resv) => resv,
                None => return Ok(CasOutcome::Applied(())),
            };

            match self.release_all_and_delete(&resv).await {
                Ok(()) => Ok(CasOutcome::Applied(())),
                Err(e) if e.is_retryable() => {
                    debug!(customer = customer_key, "clear retry: {e}");
                    Ok(CasOutcome::Conflict)
                }
                Err(e) => Err(AppError::Database(e.to_string())),
            }
        })
        .await
    }

    /// The customer's cart joined with current product snapshots
    pub async fn read(&self, customer_key: &str) -> AppResult<Vec<CartLine>> {
        let resv = match self
            .reservations
            .find_by_customer(customer_key)
            .await
            .map_err(AppError::from)?
        {
            Some(resv) => resv,
            None => return Ok(Vec::new()),
        };

        let mut lines = Vec::with_capacity(resv.items.len());
        for item in &resv.items {
            let product = self
                .products
                .find_by_record_id(&item.product)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::ProductMissing(item.product.to_string()))?;
            lines.push(CartLine {
                product,
                variant: item.variant.clone(),
                quantity: item.quantity,
            });
        }
        Ok(lines)
    }

    /// One transactional unit releasing every line of a reservation and
    /// deleting it, guarded on the observed `reserved_at`. Shared with the
    /// expiry reaper.
    pub(crate) async fn release_all_and_delete(&self, resv: &Reservation) -> Result<(), TxnError> {
        let mut writes: Vec<StockWrite> = Vec::with_capacity(resv.items.len());
        for item in &resv.items {
            let write = self
                .ledger
                .plan_release(&item.product, item.variant.as_deref(), item.quantity)
                .await
                .map_err(|e| TxnError::Db(e.to_string()))?;
            writes.push(write);
        }

        let customer_key = resv.customer.key().to_string();
        let mut query = txn::begin(&self.db);
        for (idx, write) in writes.iter().enumerate() {
            query = write.apply_to(query, idx);
        }
        let query = guarded_delete(query, &customer_key, resv.reserved_at);
        txn::run(txn::commit(query)).await
    }

    /// Exact-quantity increase used by `update_quantity`
    async fn increase_line(
        &self,
        customer_key: &str,
        product_id: &str,
        variant: Option<&str>,
        delta: i64,
    ) -> AppResult<()> {
        retry_cas(&self.policy, || async move {
            let plan = self
                .ledger
                .plan_reserve_exact(product_id, variant, delta)
                .await?;
            let resv = self
                .reservations
                .find_by_customer(customer_key)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;
            if resv.find_line(&plan.write.product, variant).is_none() {
                return Err(AppError::ItemNotReserved(product_id.to_string()));
            }
            let items = resv.merged_items(&plan.write.product, variant, plan.granted);
            let now = now_millis();

            let query = txn::begin(&self.db);
            let query = plan.write.apply_to(query, 0);
            let query = guarded_update(query, customer_key, items, now, resv.reserved_at);

            match txn::run(txn::commit(query)).await {
                Ok(()) => Ok(CasOutcome::Applied(())),
                Err(e) if e.is_retryable() => Ok(CasOutcome::Conflict),
                Err(e) => Err(AppError::Database(e.to_string())),
            }
        })
        .await
    }

    async fn release_line(
        &self,
        customer_key: &str,
        product_id: &str,
        variant: Option<&str>,
        quantity: Option<i64>,
    ) -> AppResult<ReleaseReceipt> {
        retry_cas(&self.policy, || async move {
            let resv = self
                .reservations
                .find_by_customer(customer_key)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;
            let product = record_id(PRODUCT_TABLE, product_id);
            let line = resv
                .find_line(&product, variant)
                .ok_or_else(|| AppError::ItemNotReserved(product_id.to_string()))?;

            // Over-release is clamped to what the line actually holds
            let released = quantity.unwrap_or(line.quantity).min(line.quantity);
            let write = self.ledger.plan_release(&product, variant, released).await?;
            let new_stock = write
                .next
                .available(variant)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            let items = resv.decremented_items(&product, variant, released);
            let now = now_millis();

            let query = txn::begin(&self.db);
            let query = write.apply_to(query, 0);
            let query = if items.is_empty() {
                guarded_delete(query, customer_key, resv.reserved_at)
            } else {
                guarded_update(query, customer_key, items, now, resv.reserved_at)
            };

            match txn::run(txn::commit(query)).await {
                Ok(()) => Ok(CasOutcome::Applied(ReleaseReceipt { new_stock })),
                Err(e) if e.is_retryable() => {
                    debug!(customer = customer_key, product = product_id, "release retry: {e}");
                    Ok(CasOutcome::Conflict)
                }
                Err(e) => Err(AppError::Database(e.to_string())),
            }
        })
        .await
    }
}

// Reservation write statements. All three use bind names disjoint from the
// stock writes' indexed binds so they can share one transaction chain.

fn create_reservation<'r>(
    query: surrealdb::method::Query<'r, Db>,
    customer_key: &str,
    items: Vec<ReservedItem>,
    now: i64,
) -> surrealdb::method::Query<'r, Db> {
    // A concurrent CREATE for the same customer fails the unique record id
    // with "already exists", which the runner classifies as retryable.
    query
        .query("CREATE $resv CONTENT { customer: $resv_customer, items: $resv_items, reserved_at: $resv_now };")
        .bind(("resv", Reservation::record_id(customer_key)))
        .bind(("resv_customer", crate::db::models::Customer::record_id(customer_key)))
        .bind(("resv_items", items))
        .bind(("resv_now", now))
}

fn guarded_update<'r>(
    query: surrealdb::method::Query<'r, Db>,
    customer_key: &str,
    items: Vec<ReservedItem>,
    now: i64,
    observed_at: i64,
) -> surrealdb::method::Query<'r, Db> {
    query
        .query(
            "LET $resv_rows = (UPDATE $resv SET items = $resv_items, reserved_at = $resv_now \
             WHERE reserved_at = $resv_observed RETURN AFTER);",
        )
        .query(format!(
            "IF array::len($resv_rows) == 0 {{ THROW '{}' }};",
            txn::STOCK_CONFLICT
        ))
        .bind(("resv", Reservation::record_id(customer_key)))
        .bind(("resv_items", items))
        .bind(("resv_now", now))
        .bind(("resv_observed", observed_at))
}

fn guarded_delete<'r>(
    query: surrealdb::method::Query<'r, Db>,
    customer_key: &str,
    observed_at: i64,
) -> surrealdb::method::Query<'r, Db> {
    query
        .query(
            "LET $resv_gone = (DELETE $resv WHERE reserved_at = $resv_observed RETURN BEFORE);",
        )
        .query(format!(
            "IF array::len($resv_gone) == 0 {{ THROW '{}' }};",
            txn::STOCK_CONFLICT
        ))
        .bind(("resv", Reservation::record_id(customer_key)))
        .bind(("resv_observed", observed_at))
}
