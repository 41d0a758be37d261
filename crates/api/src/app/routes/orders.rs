//! Orders, line items, and their inventory units.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};

use kitforge_core::{LineItemId, OrderId, ShipmentId};
use kitforge_infra::store::InventoryStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id/line_items", post(add_line_item))
        .route("/orders/:id/shipments", get(list_shipments))
        .route(
            "/line_items/:id",
            patch(set_quantity).delete(remove_line_item),
        )
        .route("/line_items/:id/inventory_units", get(inventory_units))
        .route("/shipments/:id/ship", post(ship))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.contents.create_order() {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": order.id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Add a variant to the order. For assemblies, `selected_variants` resolves
/// deferred slots (part id → variant id); the reconciliation report comes
/// back with the line.
pub async fn add_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddLineItemRequest>,
) -> axum::response::Response {
    let order_id = match dto::parse_id::<OrderId>(&id, "order id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let variant_id = match dto::parse_id(&body.variant_id, "variant id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let selected = match body.selections() {
        Ok(v) => v,
        Err(response) => return response,
    };

    match services
        .contents
        .add_to_order(order_id, variant_id, body.quantity, &selected)
    {
        Ok((line, report)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": line.id.to_string(),
                "quantity": line.quantity,
                "report": report,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Change the purchased quantity; the reconciliation report (including any
/// unresolved reductions) is part of the response body.
pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetQuantityRequest>,
) -> axum::response::Response {
    let line_item_id = match dto::parse_id::<LineItemId>(&id, "line item id") {
        Ok(v) => v,
        Err(response) => return response,
    };
    let shipment_hint = match &body.shipment_id {
        Some(raw) => match dto::parse_id::<ShipmentId>(raw, "shipment id") {
            Ok(v) => Some(v),
            Err(response) => return response,
        },
        None => None,
    };

    match services
        .contents
        .set_line_quantity(line_item_id, body.quantity, shipment_hint)
    {
        Ok((line, report)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": line.id.to_string(),
                "quantity": line.quantity,
                "report": report,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let line_item_id = match dto::parse_id::<LineItemId>(&id, "line item id") {
        Ok(v) => v,
        Err(response) => return response,
    };

    match services.contents.remove_line(line_item_id) {
        Ok(report) => (StatusCode::OK, Json(serde_json::json!({ "report": report })))
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn inventory_units(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let line_item_id = match dto::parse_id::<LineItemId>(&id, "line item id") {
        Ok(v) => v,
        Err(response) => return response,
    };

    match services.order_inventory.inventory_units(line_item_id) {
        Ok(units) => {
            let units: Vec<_> = units.iter().map(dto::unit_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "inventory_units": units }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_shipments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id = match dto::parse_id::<OrderId>(&id, "order id") {
        Ok(v) => v,
        Err(response) => return response,
    };

    match services.inventory.shipments_for_order(order_id) {
        Ok(shipments) => {
            let shipments: Vec<_> = shipments.iter().map(dto::shipment_to_json).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "shipments": shipments })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e.into()),
    }
}

pub async fn ship(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let shipment_id = match dto::parse_id::<ShipmentId>(&id, "shipment id") {
        Ok(v) => v,
        Err(response) => return response,
    };

    match services.inventory.mark_shipment_shipped(shipment_id) {
        Ok(shipment) => (StatusCode::OK, Json(dto::shipment_to_json(&shipment))).into_response(),
        Err(e) => errors::service_error_to_response(e.into()),
    }
}
