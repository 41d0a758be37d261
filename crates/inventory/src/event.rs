use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kitforge_core::{LineItemId, VariantId};
use kitforge_events::Event;

/// Facts about inventory-unit mutations, one per (line, variant) batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    UnitsCreated {
        line_item_id: LineItemId,
        variant_id: VariantId,
        count: u32,
        occurred_at: DateTime<Utc>,
    },
    UnitsDestroyed {
        line_item_id: LineItemId,
        variant_id: VariantId,
        count: u32,
        occurred_at: DateTime<Utc>,
    },
    /// A reduction could not be fully satisfied without touching shipped
    /// units; the purchased and fulfilled quantities have diverged.
    ReductionUnresolved {
        line_item_id: LineItemId,
        variant_id: VariantId,
        missing: u32,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::UnitsCreated { .. } => "inventory.units.created",
            InventoryEvent::UnitsDestroyed { .. } => "inventory.units.destroyed",
            InventoryEvent::ReductionUnresolved { .. } => "inventory.reduction.unresolved",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::UnitsCreated { occurred_at, .. }
            | InventoryEvent::UnitsDestroyed { occurred_at, .. }
            | InventoryEvent::ReductionUnresolved { occurred_at, .. } => *occurred_at,
        }
    }
}
