//! Admin-facing bundle definition maintenance.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use uuid::Uuid;

use kitforge_catalog::{AssignPartForm, BundlePart, CatalogEvent, PartUpsert, Product};
use kitforge_core::{BundlePartId, ProductId};
use kitforge_events::{EventBus, EventEnvelope};

use crate::error::ServiceResult;
use crate::services::publish;
use crate::store::CatalogStore;

/// One row of the admin part table: the membership record plus the display
/// attributes delegated from the part variant and its product.
#[derive(Debug, Clone, Serialize)]
pub struct PartRow {
    pub part: BundlePart,
    pub name: String,
    pub sku: String,
    pub options_text: String,
}

/// Creates, updates and removes bundle parts.
pub struct PartAssignmentService<B> {
    catalog: Arc<dyn CatalogStore>,
    bus: B,
}

impl<B> PartAssignmentService<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn new(catalog: Arc<dyn CatalogStore>, bus: B) -> Self {
        Self { catalog, bus }
    }

    /// Create-or-update a part: by id (count-only update) or by
    /// `(assembly, variant, deferred)`.
    pub fn assign(
        &self,
        assembly_id: ProductId,
        form: &AssignPartForm,
    ) -> ServiceResult<BundlePart> {
        let assembly = self.catalog.product(assembly_id)?;
        // Attaching a part makes the product an assembly, so the
        // part/assembly exclusivity check runs with has_parts = true.
        assembly.ensure_part_eligibility(true)?;

        match form.validate()? {
            PartUpsert::UpdateCount { id, count } => {
                let mut part = self.catalog.bundle_part(id)?;
                part.count = count;
                self.catalog.update_bundle_part(part.clone())?;
                debug!(part_id = %part.id, count = %count, "bundle part count updated");
                publish(
                    &self.bus,
                    Uuid::from(part.id),
                    "catalog.bundle_part",
                    &CatalogEvent::PartCountChanged {
                        part_id: part.id,
                        assembly_id,
                        count: count.get(),
                        occurred_at: Utc::now(),
                    },
                )?;
                Ok(part)
            }
            PartUpsert::CreateOrUpdate {
                variant_id,
                count,
                variant_selection_deferred,
            } => {
                let variant = self.catalog.variant(variant_id)?;

                if let Some(mut existing) = self.catalog.find_bundle_part(
                    assembly_id,
                    variant_id,
                    variant_selection_deferred,
                )? {
                    existing.count = count;
                    self.catalog.update_bundle_part(existing.clone())?;
                    publish(
                        &self.bus,
                        Uuid::from(existing.id),
                        "catalog.bundle_part",
                        &CatalogEvent::PartCountChanged {
                            part_id: existing.id,
                            assembly_id,
                            count: count.get(),
                            occurred_at: Utc::now(),
                        },
                    )?;
                    return Ok(existing);
                }

                let part =
                    BundlePart::new(assembly_id, variant_id, count, variant_selection_deferred);
                self.catalog.insert_bundle_part(part.clone())?;
                info!(part_id = %part.id, assembly_id = %assembly_id, variant_id = %variant_id,
                      "bundle part assigned");
                publish(
                    &self.bus,
                    Uuid::from(part.id),
                    "catalog.bundle_part",
                    &CatalogEvent::PartAssigned {
                        part_id: part.id,
                        assembly_id,
                        part_variant_id: variant_id,
                        count: count.get(),
                        variant_selection_deferred,
                        occurred_at: Utc::now(),
                    },
                )?;

                self.disable_master_tracking_for_part(variant.product_id)?;

                Ok(part)
            }
        }
    }

    /// Post-creation hook: a product used as a part stops tracking its own
    /// master stock once it carries real variants (the master is then a pure
    /// catalog entry, never shipped itself).
    fn disable_master_tracking_for_part(&self, part_product_id: ProductId) -> ServiceResult<()> {
        let has_real_variants = self
            .catalog
            .variants_of(part_product_id)?
            .iter()
            .any(|v| !v.is_master);
        if !has_real_variants {
            return Ok(());
        }

        let mut master = self.catalog.master_of(part_product_id)?;
        if !master.track_inventory {
            return Ok(());
        }

        master.track_inventory = false;
        self.catalog.update_variant(master)?;
        info!(product_id = %part_product_id, "master stock tracking disabled for part product");
        publish(
            &self.bus,
            Uuid::from(part_product_id),
            "catalog.product",
            &CatalogEvent::MasterTrackingDisabled {
                product_id: part_product_id,
                occurred_at: Utc::now(),
            },
        )
    }

    /// Delete a part. A second call for the same id fails with `NotFound`.
    pub fn remove(&self, part_id: BundlePartId) -> ServiceResult<()> {
        let part = self.catalog.bundle_part(part_id)?;
        self.catalog.remove_bundle_part(part_id)?;
        info!(part_id = %part_id, assembly_id = %part.assembly_id, "bundle part removed");
        publish(
            &self.bus,
            Uuid::from(part_id),
            "catalog.bundle_part",
            &CatalogEvent::PartRemoved {
                part_id,
                assembly_id: part.assembly_id,
                occurred_at: Utc::now(),
            },
        )
    }

    /// Toggle part eligibility, enforcing assembly/part exclusivity through
    /// the explicit `has_parts` query.
    pub fn set_can_be_part(&self, product_id: ProductId, value: bool) -> ServiceResult<Product> {
        let mut product = self.catalog.product(product_id)?;
        product.can_be_part = value;
        if value {
            let has_parts = self.catalog.has_parts(product_id)?;
            product.ensure_part_eligibility(has_parts)?;
        }
        self.catalog.update_product(product.clone())?;
        Ok(product)
    }

    /// The admin part table for one assembly.
    pub fn list(&self, assembly_id: ProductId) -> ServiceResult<Vec<PartRow>> {
        let parts = self.catalog.bundle_parts(assembly_id)?;
        let mut rows = Vec::with_capacity(parts.len());
        for part in parts {
            let variant = self.catalog.variant(part.part_variant_id)?;
            let product = self.catalog.product(variant.product_id)?;
            let options_text = part.options_text(&variant);
            rows.push(PartRow {
                part,
                name: product.name,
                sku: variant.sku,
                options_text,
            });
        }
        Ok(rows)
    }

    /// Part search for the admin picker.
    pub fn available(&self, query: &str) -> ServiceResult<Vec<Product>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.catalog.search_can_be_part(query)?)
    }
}
