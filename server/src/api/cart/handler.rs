//! Cart API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::auth::AuthUser;
use crate::cart::{CartLine, ReleaseReceipt, ReserveReceipt};
use crate::core::AppState;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Deserialize, Validate)]
pub struct ReserveRequest {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    pub variant: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    pub variant: Option<String>,
    /// New absolute quantity; 0 removes the line
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveItemRequest {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    pub variant: Option<String>,
}

/// POST /api/cart/reserve - hold stock, merging into an existing line.
/// Partial fulfilment shows up as `held_quantity < requested_quantity`.
pub async fn reserve(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReserveRequest>,
) -> AppResult<Json<AppResponse<ReserveReceipt>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let receipt = state
        .store
        .add_or_merge(
            &user.id,
            &payload.product_id,
            payload.variant.as_deref(),
            payload.quantity,
        )
        .await?;

    if receipt.held_quantity < receipt.requested_quantity {
        return Ok(ok_with_message(receipt, "Partially fulfilled"));
    }
    Ok(ok(receipt))
}

/// GET /api/cart
pub async fn read(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AppResponse<Vec<CartLine>>>> {
    let lines = state.store.read(&user.id).await?;
    Ok(ok(lines))
}

/// PUT /api/cart/items - set a line to an exact quantity
pub async fn update_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .store
        .update_quantity(
            &user.id,
            &payload.product_id,
            payload.variant.as_deref(),
            payload.quantity,
        )
        .await?;
    Ok(ok(()))
}

/// DELETE /api/cart/items - drop a line, releasing its stock
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RemoveItemRequest>,
) -> AppResult<Json<AppResponse<ReleaseReceipt>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let receipt = state
        .store
        .remove(&user.id, &payload.product_id, payload.variant.as_deref())
        .await?;
    Ok(ok(receipt))
}

/// DELETE /api/cart - release everything
pub async fn clear(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AppResponse<()>>> {
    state.store.clear(&user.id).await?;
    Ok(ok(()))
}
