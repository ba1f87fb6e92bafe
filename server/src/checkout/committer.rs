//! Order Committer
//!
//! Converts a customer's reservation into an immutable order. All writes
//! land in one transaction: order snapshot, coupon counters, the
//! customer's used-coupon set and order history, and the reservation
//! delete. Stock is not touched here; it was decremented at reserve time.
//!
//! The order record id is generated up front so the transaction needs no
//! result extraction, only error classification.

use serde::Deserialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::checkout::pricing;
use crate::db::models::{Coupon, Customer, ORDER_TABLE, Order, OrderItem, OrderStatus, Reservation};
use crate::db::repository::{
    CouponRepository, CustomerRepository, ProductRepository, ReservationRepository,
};
use crate::db::txn;
use crate::inventory::{CasOutcome, RetryPolicy, retry_cas};
use crate::utils::{AppError, AppResult, now_millis};

/// Checkout details supplied by the caller. Prices are never part of this.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "shipping address must not be empty"))]
    pub shipping_address: String,
    #[validate(length(min = 1, message = "payment method must not be empty"))]
    pub payment_method: String,
    pub coupon_code: Option<String>,
}

/// The verified identity a commit runs for
#[derive(Debug, Clone)]
pub struct CustomerIdentity {
    pub key: String,
    pub name: String,
}

#[derive(Clone)]
pub struct OrderCommitter {
    db: Surreal<Db>,
    reservations: ReservationRepository,
    products: ProductRepository,
    coupons: CouponRepository,
    customers: CustomerRepository,
    policy: RetryPolicy,
    shipping_cost: f64,
}

impl OrderCommitter {
    pub fn new(db: Surreal<Db>, policy: RetryPolicy, shipping_cost: f64) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            coupons: CouponRepository::new(db.clone()),
            customers: CustomerRepository::new(db.clone()),
            db,
            policy,
            shipping_cost,
        }
    }

    /// Commit the customer's reservation into an order.
    ///
    /// `payment_session` is set on the webhook path and recorded on the
    /// order for durable idempotency.
    pub async fn commit(
        &self,
        customer: &CustomerIdentity,
        request: &CheckoutRequest,
        payment_session: Option<&str>,
    ) -> AppResult<Order> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        retry_cas(&self.policy, || async move {
            match self.attempt_commit(customer, request, payment_session).await {
                Ok(order) => Ok(CasOutcome::Applied(order)),
                // Engine-level write conflict; re-read and try again
                Err(AppError::StockConflict { .. }) => {
                    debug!(customer = %customer.key, "commit retry after write conflict");
                    Ok(CasOutcome::Conflict)
                }
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn attempt_commit(
        &self,
        customer: &CustomerIdentity,
        request: &CheckoutRequest,
        payment_session: Option<&str>,
    ) -> AppResult<Order> {
        let reservation = self
            .reservations
            .find_by_customer(&customer.key)
            .await
            .map_err(AppError::from)?
            .filter(|resv| !resv.is_empty())
            .ok_or(AppError::EmptyCart)?;

        let items = self.snapshot_items(&reservation).await?;
        let customer_record = self.ensure_customer(customer).await?;
        let now = now_millis();

        let coupon = match &request.coupon_code {
            Some(code) => {
                let coupon = self
                    .coupons
                    .find_by_code(code)
                    .await
                    .map_err(AppError::from)?
                    .ok_or_else(|| AppError::CouponNotFound(code.clone()))?;
                pricing::validate_coupon(&coupon, Some(&customer_record), now)?;
                Some(coupon)
            }
            None => None,
        };

        let totals = pricing::compute_totals(
            &items,
            coupon.as_ref().map(|c| c.discount_percent),
            self.shipping_cost,
        );

        let order_id = RecordId::from_table_key(ORDER_TABLE, Uuid::new_v4().to_string());
        let order = Order {
            id: Some(order_id.clone()),
            customer: Customer::record_id(&customer.key),
            items,
            shipping_address: request.shipping_address.clone(),
            payment_method: request.payment_method.clone(),
            subtotal: totals.subtotal,
            shipping_cost: totals.shipping_cost,
            discount: totals.discount,
            final_amount: totals.final_amount,
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            status: OrderStatus::Pending,
            payment_session: payment_session.map(str::to_string),
            created_at: now,
        };

        self.run_commit_txn(&reservation, &order, coupon.as_ref())
            .await
            .map_err(|e| self.classify_commit_error(e, coupon.as_ref()))?;

        info!(
            order = %order_id,
            customer = %customer.key,
            amount = order.final_amount,
            "order committed"
        );
        Ok(order)
    }

    /// Authoritative price snapshot for every reserved line. A vanished
    /// product aborts the whole commit.
    async fn snapshot_items(&self, reservation: &Reservation) -> AppResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(reservation.items.len());
        for line in &reservation.items {
            let product = self
                .products
                .find_by_record_id(&line.product)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::ProductMissing(line.product.to_string()))?;
            items.push(OrderItem {
                product: line.product.clone(),
                name: product.name,
                variant: line.variant.clone(),
                unit_price: product.price,
                quantity: line.quantity,
            });
        }
        Ok(items)
    }

    async fn ensure_customer(&self, customer: &CustomerIdentity) -> AppResult<Customer> {
        match self
            .customers
            .find_by_key(&customer.key)
            .await
            .map_err(AppError::from)?
        {
            Some(existing) => Ok(existing),
            None => self
                .customers
                .upsert(&customer.key, &customer.name)
                .await
                .map_err(AppError::from),
        }
    }

    async fn run_commit_txn(
        &self,
        reservation: &Reservation,
        order: &Order,
        coupon: Option<&Coupon>,
    ) -> Result<(), txn::TxnError> {
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| txn::TxnError::Db("order without id".to_string()))?;
        let customer_id = order.customer.clone();
        let mut content = order.clone();
        content.id = None;

        let query = txn::begin(&self.db)
            // Deleting the reservation is the linearization point: exactly
            // one competing commit (direct checkout, webhook, reaper) wins.
            .query(
                "LET $resv_gone = (DELETE $resv WHERE reserved_at = $resv_observed RETURN BEFORE);",
            )
            .query(format!(
                "IF array::len($resv_gone) == 0 {{ THROW '{}' }};",
                txn::RESERVATION_GONE
            ))
            .bind(("resv", Reservation::record_id(&order.customer.key().to_string())))
            .bind(("resv_observed", reservation.reserved_at))
            .query("CREATE $order_id CONTENT $order_content;")
            .bind(("order_id", order_id.clone()))
            .bind(("order_content", content));

        let query = match coupon {
            Some(coupon) => {
                let coupon_id = coupon
                    .id
                    .clone()
                    .ok_or_else(|| txn::TxnError::Db("coupon without id".to_string()))?;
                query
                    .query(
                        "LET $cust_rows = (UPDATE $customer SET used_coupons += $coupon_code, \
                         orders += $order_ref WHERE !(used_coupons CONTAINS $coupon_code) \
                         RETURN AFTER);",
                    )
                    .query(format!(
                        "IF array::len($cust_rows) == 0 {{ THROW '{}' }};",
                        txn::COUPON_USED
                    ))
                    .query(
                        "UPDATE $coupon SET total_usage += 1, \
                         total_discount_given += $discount_amount;",
                    )
                    .bind(("customer", customer_id))
                    .bind(("coupon", coupon_id))
                    .bind(("coupon_code", coupon.code.clone()))
                    .bind(("order_ref", order_id))
                    .bind(("discount_amount", order.discount))
            }
            None => query
                .query("UPDATE $customer SET orders += $order_ref;")
                .bind(("customer", customer_id))
                .bind(("order_ref", order_id)),
        };

        txn::run(txn::commit(query)).await
    }

    fn classify_commit_error(&self, err: txn::TxnError, coupon: Option<&Coupon>) -> AppError {
        if err.aborted_with(txn::RESERVATION_GONE) {
            // A concurrent commit or the reaper retired the cart first
            return AppError::EmptyCart;
        }
        if err.aborted_with(txn::COUPON_USED) {
            let code = coupon.map(|c| c.code.clone()).unwrap_or_default();
            return AppError::CouponAlreadyUsed(code);
        }
        if err.is_retryable() {
            return AppError::StockConflict {
                retry_after_ms: self.policy.retry_after_ms(),
            };
        }
        AppError::Database(err.to_string())
    }
}
