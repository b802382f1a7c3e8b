//! Leave request routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use leavebook_core::leave::{LeaveRequest, NewLeaveRequest};
use leavebook_shared::types::{LeaveRequestId, PageRequest, PageResponse, UserId};

/// Creates the leave request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/leave-requests",
            post(create_leave_request).get(list_leave_requests),
        )
        .route(
            "/leave-requests/{id}",
            get(get_leave_request).delete(delete_leave_request),
        )
        .route("/leave-requests/{id}/approve", post(approve_leave_request))
        .route("/leave-requests/{id}/decline", post(decline_leave_request))
        .route("/leave-requests/{id}/cancel", post(cancel_leave_request))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing requests.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Owner whose requests to list; defaults to the principal.
    pub user_id: Option<UserId>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Body for approve and decline.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewBody {
    /// Optional reviewer note.
    #[serde(default)]
    pub note: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /leave-requests
async fn create_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewLeaveRequest>,
) -> ApiResult<(StatusCode, Json<LeaveRequest>)> {
    let request = state.leave.create(auth.user_id(), payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /leave-requests
async fn list_leave_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<LeaveRequest>>> {
    let owner = query.user_id.unwrap_or_else(|| auth.user_id());
    let page = state
        .leave
        .list(auth.user_id(), owner, &query.page_request())
        .await?;
    Ok(Json(page))
}

/// GET `/leave-requests/{id}`
async fn get_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<LeaveRequestId>,
) -> ApiResult<Json<LeaveRequest>> {
    let request = state
        .leave
        .get(auth.user_id(), id)
        .await?;
    Ok(Json(request))
}

/// POST `/leave-requests/{id}/approve`
async fn approve_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<LeaveRequestId>,
    body: Option<Json<ReviewBody>>,
) -> ApiResult<Json<LeaveRequest>> {
    let note = body.and_then(|Json(b)| b.note);
    let request = state
        .leave
        .approve(auth.user_id(), id, note)
        .await?;
    Ok(Json(request))
}

/// POST `/leave-requests/{id}/decline`
async fn decline_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<LeaveRequestId>,
    body: Option<Json<ReviewBody>>,
) -> ApiResult<Json<LeaveRequest>> {
    let note = body.and_then(|Json(b)| b.note);
    let request = state
        .leave
        .decline(auth.user_id(), id, note)
        .await?;
    Ok(Json(request))
}

/// POST `/leave-requests/{id}/cancel`
async fn cancel_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<LeaveRequestId>,
) -> ApiResult<Json<LeaveRequest>> {
    let request = state
        .leave
        .cancel(auth.user_id(), id)
        .await?;
    Ok(Json(request))
}

/// DELETE `/leave-requests/{id}`
async fn delete_leave_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<LeaveRequestId>,
) -> ApiResult<StatusCode> {
    state
        .leave
        .delete(auth.user_id(), id)
        .await?;
    info!(request_id = %id, principal = %auth.user_id(), "leave request removed via api");
    Ok(StatusCode::NO_CONTENT)
}
