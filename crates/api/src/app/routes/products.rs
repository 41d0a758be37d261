//! Catalog seeding: products, variants, stock levels.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post, put},
};

use kitforge_catalog::{Product, Variant};
use kitforge_core::{ProductId, VariantId};
use kitforge_infra::store::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id/variants", post(create_variant))
        .route("/products/:id/can_be_part", patch(set_can_be_part))
        .route("/variants/:id/stock", put(set_stock))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let mut product = Product::new(body.name);
    product.can_be_part = body.can_be_part;
    if let Some(individual_sale) = body.individual_sale {
        product.individual_sale = individual_sale;
    }
    if let Some(available) = body.available {
        product.available = available;
    }
    let master = Variant::master(product.id, body.sku);

    if let Err(e) = services.catalog.insert_product(product.clone()) {
        return errors::service_error_to_response(e.into());
    }
    if let Err(e) = services.catalog.insert_variant(master.clone()) {
        return errors::service_error_to_response(e.into());
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": product.id.to_string(),
            "master_variant_id": master.id.to_string(),
        })),
    )
        .into_response()
}

pub async fn create_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateVariantRequest>,
) -> axum::response::Response {
    let product_id = match dto::parse_id::<ProductId>(&id, "product id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    if let Err(e) = services.catalog.product(product_id) {
        return errors::service_error_to_response(e.into());
    }

    let mut variant = Variant::with_options(
        product_id,
        body.sku,
        body.options_text.unwrap_or_default(),
    );
    if let Some(track_inventory) = body.track_inventory {
        variant.track_inventory = track_inventory;
    }

    if let Err(e) = services.catalog.insert_variant(variant.clone()) {
        return errors::service_error_to_response(e.into());
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": variant.id.to_string() })),
    )
        .into_response()
}

pub async fn set_can_be_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetCanBePartRequest>,
) -> axum::response::Response {
    let product_id = match dto::parse_id::<ProductId>(&id, "product id") {
        Ok(v) => v,
        Err(response) => return response,
    };

    match services.parts.set_can_be_part(product_id, body.can_be_part) {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn set_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetStockRequest>,
) -> axum::response::Response {
    let variant_id = match dto::parse_id::<VariantId>(&id, "variant id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    if let Err(e) = services.catalog.variant(variant_id) {
        return errors::service_error_to_response(e.into());
    }

    services.gateway.set_stock(variant_id, body.available);
    (
        StatusCode::OK,
        Json(serde_json::json!({ "variant_id": variant_id.to_string(), "available": body.available })),
    )
        .into_response()
}
