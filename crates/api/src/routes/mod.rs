//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod catalog;
pub mod health;
pub mod journal;

/// Creates the API router: health is public, everything else needs a requester.
pub fn api_routes() -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(journal::routes())
        .merge(catalog::routes())
        .layer(middleware::from_fn(auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
