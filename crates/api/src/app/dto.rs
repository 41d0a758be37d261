use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use kitforge_catalog::{AssignPartForm, Product};
use kitforge_core::{BundlePartId, VariantId};
use kitforge_infra::services::PartRow;
use kitforge_inventory::{InventoryUnit, Shipment};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub can_be_part: bool,
    #[serde(default)]
    pub individual_sale: Option<bool>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVariantRequest {
    pub sku: String,
    #[serde(default)]
    pub options_text: Option<String>,
    #[serde(default)]
    pub track_inventory: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetCanBePartRequest {
    pub can_be_part: bool,
}

/// The admin part form: `count` arrives as whatever the form sent (string or
/// number); validation happens domain-side, not in serde.
#[derive(Debug, Deserialize)]
pub struct AssignPartRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub count: JsonValue,
    #[serde(default)]
    pub variant_selection_deferred: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetCountRequest {
    pub count: JsonValue,
}

#[derive(Debug, Deserialize)]
pub struct AddLineItemRequest {
    pub variant_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub selected_variants: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
    #[serde(default)]
    pub shipment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub available: i64,
}

#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    #[serde(default)]
    pub q: String,
}

// -------------------------
// Parsing helpers
// -------------------------

/// Form counts may arrive as JSON numbers or strings; normalize to the raw
/// string the domain-side parse expects.
pub fn raw_count(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub fn parse_id<T: core::str::FromStr>(
    raw: &str,
    what: &'static str,
) -> Result<T, axum::response::Response> {
    raw.parse::<T>().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {what}"),
        )
    })
}

impl AssignPartRequest {
    pub fn into_form(self) -> Result<AssignPartForm, axum::response::Response> {
        let id = match &self.id {
            Some(raw) => Some(parse_id::<BundlePartId>(raw, "part id")?),
            None => None,
        };
        let variant_id = match &self.variant_id {
            Some(raw) => Some(parse_id::<VariantId>(raw, "variant id")?),
            None => None,
        };
        Ok(AssignPartForm {
            id,
            variant_id,
            count: raw_count(&self.count),
            variant_selection_deferred: self.variant_selection_deferred,
        })
    }
}

impl AddLineItemRequest {
    pub fn selections(
        &self,
    ) -> Result<BTreeMap<BundlePartId, VariantId>, axum::response::Response> {
        let mut selected = BTreeMap::new();
        if let Some(raw) = &self.selected_variants {
            for (part, variant) in raw {
                selected.insert(
                    parse_id::<BundlePartId>(part, "part id")?,
                    parse_id::<VariantId>(variant, "variant id")?,
                );
            }
        }
        Ok(selected)
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "name": product.name,
        "can_be_part": product.can_be_part,
        "individual_sale": product.individual_sale,
        "available": product.available,
    })
}

pub fn part_row_to_json(row: &PartRow) -> serde_json::Value {
    serde_json::json!({
        "id": row.part.id.to_string(),
        "assembly_id": row.part.assembly_id.to_string(),
        "variant_id": row.part.part_variant_id.to_string(),
        "name": row.name,
        "sku": row.sku,
        "count": row.part.count.get(),
        "variant_selection_deferred": row.part.variant_selection_deferred,
        "options_text": row.options_text,
    })
}

pub fn unit_to_json(unit: &InventoryUnit) -> serde_json::Value {
    serde_json::json!({
        "id": unit.id.to_string(),
        "variant_id": unit.variant_id.to_string(),
        "line_item_id": unit.line_item_id.to_string(),
        "shipment_id": unit.shipment_id.map(|id| id.to_string()),
        "state": unit.state,
    })
}

pub fn shipment_to_json(shipment: &Shipment) -> serde_json::Value {
    serde_json::json!({
        "id": shipment.id.to_string(),
        "order_id": shipment.order_id.to_string(),
        "state": shipment.state,
    })
}
