//! Bundle part administration: the part table, assignment, removal, search.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use kitforge_core::{BundlePartId, ProductId};
use kitforge_infra::store::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/products/:id/parts", get(index).post(create))
        .route("/parts/available", get(available))
        .route("/parts/:id", put(set_count).delete(remove))
}

async fn part_table(
    services: &AppServices,
    assembly_id: ProductId,
) -> axum::response::Response {
    match services.parts.list(assembly_id) {
        Ok(rows) => {
            let parts: Vec<_> = rows.iter().map(dto::part_row_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "parts": parts }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn index(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let assembly_id = match dto::parse_id::<ProductId>(&product_id, "product id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    part_table(&services, assembly_id).await
}

/// Assign a part (create path). On success the refreshed part table is
/// returned; validation failures come back as structured 422s.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
    Json(body): Json<dto::AssignPartRequest>,
) -> axum::response::Response {
    let assembly_id = match dto::parse_id::<ProductId>(&product_id, "product id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let form = match body.into_form() {
        Ok(form) => form,
        Err(response) => return response,
    };

    match services.parts.assign(assembly_id, &form) {
        Ok(_) => part_table(&services, assembly_id).await,
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Update an existing part's count (the `set_count` admin operation).
pub async fn set_count(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetCountRequest>,
) -> axum::response::Response {
    let part_id = match dto::parse_id::<BundlePartId>(&id, "part id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let assembly_id = match services.catalog.bundle_part(part_id) {
        Ok(part) => part.assembly_id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    let form = kitforge_catalog::AssignPartForm {
        id: Some(part_id),
        variant_id: None,
        count: dto::raw_count(&body.count),
        variant_selection_deferred: false,
    };

    match services.parts.assign(assembly_id, &form) {
        Ok(_) => part_table(&services, assembly_id).await,
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let part_id = match dto::parse_id::<BundlePartId>(&id, "part id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let assembly_id = match services.catalog.bundle_part(part_id) {
        Ok(part) => part.assembly_id,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.parts.remove(part_id) {
        Ok(()) => part_table(&services, assembly_id).await,
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Part picker search. Blank queries return an empty list; matches are capped
/// server-side.
pub async fn available(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AvailableQuery>,
) -> axum::response::Response {
    match services.parts.available(&query.q) {
        Ok(products) => {
            let products: Vec<_> = products.iter().map(dto::product_to_json).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "products": products })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
