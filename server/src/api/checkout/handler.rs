//! Checkout API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::checkout::{CheckoutRequest, CustomerIdentity};
use crate::core::AppState;
use crate::db::models::{Order, OrderStatus};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// POST /api/checkout - commit the caller's reservation into an order
pub async fn commit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let customer = CustomerIdentity {
        key: user.id,
        name: user.username,
    };
    let order = state.committer.commit(&customer, &payload, None).await?;
    Ok(ok(order))
}

/// GET /api/orders - the caller's order history, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = state
        .orders
        .find_by_customer(&user.id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(orders))
}

/// GET /api/orders/{id} - owner or admin only
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state
        .orders
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;

    if !user.is_admin() && order.customer.key().to_string() != user.id {
        return Err(AppError::Forbidden("not your order".to_string()));
    }
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PUT /api/orders/{id}/status - admin only, forward transitions only
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }
    let order = state
        .orders
        .update_status(&id, payload.status)
        .await
        .map_err(AppError::from)?;
    Ok(ok(order))
}
