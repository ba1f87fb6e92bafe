//! Payment Webhook Handler

use axum::{Json, body::Bytes, extract::State};
use http::HeaderMap;
use serde::Serialize;

use crate::core::AppState;
use crate::payment::{PaymentNotification, ProcessOutcome, signature};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

#[derive(Serialize)]
pub struct WebhookAck {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// POST /api/payments/webhook
///
/// Signature is verified against the raw bytes before anything is parsed;
/// an invalid signature touches no state.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<AppResponse<WebhookAck>>> {
    let provided = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;
    signature::verify(&state.config.webhook_secret, &body, provided)?;

    let notification: PaymentNotification = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("malformed notification: {e}")))?;

    let outcome = state.processor.process(&notification).await?;
    let (order_id, message) = match outcome {
        ProcessOutcome::Committed(order) => (
            order.id.as_ref().map(|id| id.to_string()),
            "Order committed",
        ),
        ProcessOutcome::AlreadyProcessed => (None, "Already processed"),
        ProcessOutcome::Acknowledged => (None, "Acknowledged"),
    };

    Ok(ok_with_message(
        WebhookAck {
            session_id: notification.session_id,
            order_id,
        },
        message,
    ))
}
