//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::AppState;
use crate::db::models::{Product, ProductCreate};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/products - all active products
pub async fn list(State(state): State<AppState>) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let products = state.products.find_all().await.map_err(AppError::from)?;
    Ok(ok(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Product>>> {
    let product = state
        .products
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;
    Ok(ok(product))
}

/// POST /api/products - admin only
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<Product>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product = state.products.create(payload).await.map_err(AppError::from)?;
    Ok(ok(product))
}
