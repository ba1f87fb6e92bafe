//! Payment Confirmation Processor
//!
//! Drives order commitment from the external provider's asynchronous
//! notification. The checkout metadata inside the notification was
//! embedded when the payment session was created, not re-derived from the
//! current cart, so a cart edited after starting payment does not change
//! what gets committed against.
//!
//! Idempotency is two-layered: the durable truth is the order lookup by
//! session id; the in-memory marker only closes the race window between
//! two near-simultaneous deliveries. The marker is released on commit
//! failure so a retried delivery starts clean.

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::checkout::{CheckoutRequest, CustomerIdentity, OrderCommitter};
use crate::db::models::Order;
use crate::db::repository::OrderRepository;
use crate::payment::session_cache::ProcessedSessions;
use crate::utils::{AppError, AppResult};

/// Notification kinds the provider delivers. Anything unrecognized is
/// acknowledged without action, since the provider retries on non-2xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PaymentSucceeded,
    PaymentFailed,
    SessionExpired,
    #[serde(other)]
    Other,
}

/// Signed payment notification body (signature is checked against the raw
/// bytes before this is parsed)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    pub kind: NotificationKind,
    pub session_id: String,
    /// Customer identity embedded at session-creation time
    pub customer_key: String,
    pub customer_name: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub coupon_code: Option<String>,
}

/// What processing a notification amounted to
#[derive(Debug)]
pub enum ProcessOutcome {
    /// First delivery: an order was committed
    Committed(Order),
    /// This session was already turned into an order
    AlreadyProcessed,
    /// Non-order-affecting kind, logged and acked
    Acknowledged,
}

#[derive(Clone)]
pub struct PaymentProcessor {
    orders: OrderRepository,
    committer: OrderCommitter,
    processed: ProcessedSessions,
}

impl PaymentProcessor {
    pub fn new(
        orders: OrderRepository,
        committer: OrderCommitter,
        processed: ProcessedSessions,
    ) -> Self {
        Self {
            orders,
            committer,
            processed,
        }
    }

    pub async fn process(&self, notification: &PaymentNotification) -> AppResult<ProcessOutcome> {
        match notification.kind {
            NotificationKind::PaymentSucceeded => self.process_success(notification).await,
            NotificationKind::PaymentFailed => {
                // The customer may retry payment; the reservation stays
                warn!(
                    session = %notification.session_id,
                    customer = %notification.customer_key,
                    "payment failed, reservation left in place"
                );
                Ok(ProcessOutcome::Acknowledged)
            }
            NotificationKind::SessionExpired => {
                warn!(
                    session = %notification.session_id,
                    customer = %notification.customer_key,
                    "payment session expired, reservation left in place"
                );
                Ok(ProcessOutcome::Acknowledged)
            }
            NotificationKind::Other => {
                info!(session = %notification.session_id, "ignoring unhandled notification kind");
                Ok(ProcessOutcome::Acknowledged)
            }
        }
    }

    async fn process_success(
        &self,
        notification: &PaymentNotification,
    ) -> AppResult<ProcessOutcome> {
        let session = notification.session_id.as_str();

        // Durable idempotency: an order for this session already exists
        if self
            .orders
            .find_by_payment_session(session)
            .await
            .map_err(AppError::from)?
            .is_some()
        {
            info!(session, "duplicate payment confirmation, order already exists");
            return Ok(ProcessOutcome::AlreadyProcessed);
        }

        // Fast path: another delivery of the same session is in flight
        if !self.processed.mark(session) {
            info!(session, "duplicate payment confirmation, commit in flight");
            return Ok(ProcessOutcome::AlreadyProcessed);
        }

        let customer = CustomerIdentity {
            key: notification.customer_key.clone(),
            name: notification.customer_name.clone(),
        };
        let request = CheckoutRequest {
            shipping_address: notification.shipping_address.clone(),
            payment_method: notification.payment_method.clone(),
            coupon_code: notification.coupon_code.clone(),
        };

        match self.committer.commit(&customer, &request, Some(session)).await {
            Ok(order) => Ok(ProcessOutcome::Committed(order)),
            Err(e) => {
                // Release the claim so a retried delivery can re-attempt
                self.processed.unmark(session);
                match e {
                    // The reservation is gone and no order exists for this
                    // session: nothing left to commit against. Ack so the
                    // provider stops retrying, but record it loudly.
                    AppError::EmptyCart => {
                        error!(
                            session,
                            customer = %notification.customer_key,
                            "paid session has no reservation and no order"
                        );
                        Ok(ProcessOutcome::Acknowledged)
                    }
                    other => Err(other),
                }
            }
        }
    }
}
