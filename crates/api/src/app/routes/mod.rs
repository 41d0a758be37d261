use axum::{Router, routing::get};

pub mod orders;
pub mod parts;
pub mod products;
pub mod system;

/// Full routing tree.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(products::router())
        .merge(parts::router())
        .merge(orders::router())
}
