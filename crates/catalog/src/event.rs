use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kitforge_core::{BundlePartId, ProductId, VariantId};
use kitforge_events::Event;

/// Facts about bundle-definition mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogEvent {
    PartAssigned {
        part_id: BundlePartId,
        assembly_id: ProductId,
        part_variant_id: VariantId,
        count: u32,
        variant_selection_deferred: bool,
        occurred_at: DateTime<Utc>,
    },
    PartCountChanged {
        part_id: BundlePartId,
        assembly_id: ProductId,
        count: u32,
        occurred_at: DateTime<Utc>,
    },
    PartRemoved {
        part_id: BundlePartId,
        assembly_id: ProductId,
        occurred_at: DateTime<Utc>,
    },
    /// The master-tracking hook fired: a product used as a part (and carrying
    /// its own variants) stopped tracking master stock.
    MasterTrackingDisabled {
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::PartAssigned { .. } => "catalog.part.assigned",
            CatalogEvent::PartCountChanged { .. } => "catalog.part.count_changed",
            CatalogEvent::PartRemoved { .. } => "catalog.part.removed",
            CatalogEvent::MasterTrackingDisabled { .. } => {
                "catalog.product.master_tracking_disabled"
            }
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::PartAssigned { occurred_at, .. }
            | CatalogEvent::PartCountChanged { occurred_at, .. }
            | CatalogEvent::PartRemoved { occurred_at, .. }
            | CatalogEvent::MasterTrackingDisabled { occurred_at, .. } => *occurred_at,
        }
    }
}
