//! Balance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use leavebook_core::balance::LeaveBalance;
use leavebook_shared::types::{LeaveTypeId, UserId};

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/users/{user_id}/balances/{leave_type_id}",
        get(get_balance),
    )
}

/// Query parameters for a balance lookup.
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// Calendar year; defaults to the current UTC year.
    pub year: Option<i32>,
}

/// Balance with its derived remaining hours.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Balance owner.
    pub user_id: UserId,
    /// Leave type.
    pub leave_type_id: LeaveTypeId,
    /// Calendar year.
    pub year: i32,
    /// Yearly entitlement in hours; zero means uncapped.
    pub allowance: Decimal,
    /// Hours consumed by approved requests.
    pub used: Decimal,
    /// Hours reserved by pending requests.
    pub scheduled: Decimal,
    /// Hours rolled in from the previous year.
    pub carried_over: Decimal,
    /// Manual signed correction.
    pub adjustment: Decimal,
    /// Hours still available.
    pub remaining: Decimal,
    /// True when the balance has no cap.
    pub unlimited: bool,
}

impl From<LeaveBalance> for BalanceResponse {
    fn from(balance: LeaveBalance) -> Self {
        Self {
            user_id: balance.key.user_id,
            leave_type_id: balance.key.leave_type_id,
            year: balance.key.year,
            remaining: balance.remaining(),
            unlimited: balance.is_unlimited(),
            allowance: balance.allowance,
            used: balance.used,
            scheduled: balance.scheduled,
            carried_over: balance.carried_over,
            adjustment: balance.adjustment,
        }
    }
}

/// GET `/users/{user_id}/balances/{leave_type_id}`
async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, leave_type_id)): Path<(UserId, LeaveTypeId)>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<BalanceResponse>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let balance = state
        .leave
        .get_balance(
            auth.user_id(),
            user_id,
            leave_type_id,
            year,
        )
        .await?;
    Ok(Json(balance.into()))
}
