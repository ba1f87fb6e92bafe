//! Maintenance Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::core::AppState;
use crate::utils::{AppError, AppResponse, AppResult, now_millis, ok};

#[derive(Serialize)]
pub struct ReapResult {
    pub reaped: u64,
}

/// POST /api/maintenance/reap-reservations - admin only
pub async fn reap_reservations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<AppResponse<ReapResult>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }
    let reaped = state.reaper.reap(now_millis()).await?;
    Ok(ok(ReapResult { reaped }))
}
