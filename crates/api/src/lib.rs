//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for the leave request lifecycle and balances
//! - Bearer token authentication middleware
//! - Mapping of lifecycle errors onto JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use leavebook_core::audit::AuditSink;
use leavebook_db::{AuditRepository, LeaveRequestRepository};
use leavebook_shared::{JwtService, LeaveConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Leave request lifecycle.
    pub leave: Arc<LeaveRequestRepository>,
}

impl AppState {
    /// Wires the lifecycle repository with the database-backed audit sink.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        lock_timeout: Duration,
        config: LeaveConfig,
    ) -> Self {
        let audit: Arc<dyn AuditSink> = Arc::new(AuditRepository::new(db.clone()));
        let leave = LeaveRequestRepository::new(db.clone(), lock_timeout, config, audit);
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            leave: Arc::new(leave),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
