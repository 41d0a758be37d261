use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kitforge_core::{LineItemId, OrderId, VariantId};
use kitforge_events::Event;

/// Facts about order-line mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    LineItemAdded {
        order_id: OrderId,
        line_item_id: LineItemId,
        variant_id: VariantId,
        quantity: u32,
        part_line_items: u32,
        occurred_at: DateTime<Utc>,
    },
    LineQuantityChanged {
        line_item_id: LineItemId,
        quantity: u32,
        occurred_at: DateTime<Utc>,
    },
    LineItemRemoved {
        line_item_id: LineItemId,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::LineItemAdded { .. } => "orders.line_item.added",
            OrderEvent::LineQuantityChanged { .. } => "orders.line_item.quantity_changed",
            OrderEvent::LineItemRemoved { .. } => "orders.line_item.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::LineItemAdded { occurred_at, .. }
            | OrderEvent::LineQuantityChanged { occurred_at, .. }
            | OrderEvent::LineItemRemoved { occurred_at, .. } => *occurred_at,
        }
    }
}
