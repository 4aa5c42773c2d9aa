//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The journal commit and reconciliation endpoints
//! - Read-only catalog listings for remote editors
//! - Requester identity middleware
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use storebooks_core::catalog::LookupSource;
use storebooks_core::journal::{BalanceValidator, PersistenceGateway, Reconciler};
use storebooks_db::{CatalogRepository, JournalRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Atomic entry commit.
    pub gateway: Arc<dyn PersistenceGateway>,
    /// Post-commit counterparty location attachment.
    pub reconciler: Arc<dyn Reconciler>,
    /// Catalog and reference listings.
    pub lookups: Arc<dyn LookupSource>,
}

impl AppState {
    /// Builds the state over the database repositories.
    #[must_use]
    pub fn from_db(db: DatabaseConnection, validator: BalanceValidator) -> Self {
        let journal = Arc::new(JournalRepository::new(db.clone(), validator));
        Self {
            gateway: journal.clone(),
            reconciler: journal,
            lookups: Arc::new(CatalogRepository::new(db)),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
