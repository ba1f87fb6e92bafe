//! Order Repository
//!
//! Orders are written inside commit transactions; this repository serves
//! reads plus the status transition, the only mutable field.

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{ORDER_TABLE, Order, OrderStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(record_id(ORDER_TABLE, id)).await?;
        Ok(order)
    }

    /// Durable idempotency check for webhook processing
    pub async fn find_by_payment_session(&self, session_id: &str) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE payment_session = $session_id LIMIT 1")
            .bind(("session_id", session_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_by_customer(&self, customer_key: &str) -> RepoResult<Vec<Order>> {
        let customer = crate::db::models::Customer::record_id(customer_key);
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE customer = $customer ORDER BY created_at DESC")
            .bind(("customer", customer))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Advance an order's status; rejects illegal transitions.
    ///
    /// The write carries the observed status as its precondition, so a
    /// concurrent transition makes it match zero rows instead of clobbering
    /// the newer state.
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> RepoResult<Order> {
        let record = record_id(ORDER_TABLE, id);
        let current: Option<Order> = self.base.db().select(record.clone()).await?;
        let current = current.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;

        if !current.status.can_transition_to(next) {
            return Err(RepoError::Validation(format!(
                "illegal status transition {:?} -> {:?}",
                current.status, next
            )));
        }

        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $order SET status = $next WHERE status = $current RETURN AFTER")
            .bind(("order", record))
            .bind(("next", next))
            .bind(("current", current.status))
            .await?
            .take(0)?;

        updated.into_iter().next().ok_or_else(|| {
            RepoError::Conflict(format!("Order {id} status changed concurrently"))
        })
    }
}
