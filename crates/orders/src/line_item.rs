use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kitforge_core::{DomainError, DomainResult, Entity, LineItemId, OrderId, PartLineItemId, VariantId};

/// A purchase order. The reconciliation engine only needs its identity and
/// which shipments belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new() -> Self {
        Self {
            id: OrderId::new(),
            created_at: Utc::now(),
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A purchase line: N units of one variant on one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(order_id: OrderId, variant_id: VariantId, quantity: u32) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "quantity",
                "must be greater than 0",
            ));
        }
        Ok(Self {
            id: LineItemId::new(),
            order_id,
            variant_id,
            quantity,
        })
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Immutable snapshot of one resolved bundle part for one line.
///
/// Created together with the line, never mutated afterwards, destroyed only
/// when the line is destroyed. `quantity` is per single assembly; the
/// projector multiplies by the line quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartLineItem {
    pub id: PartLineItemId,
    pub line_item_id: LineItemId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl PartLineItem {
    pub fn new(line_item_id: LineItemId, variant_id: VariantId, quantity: u32) -> Self {
        Self {
            id: PartLineItemId::new(),
            line_item_id,
            variant_id,
            quantity,
        }
    }
}

impl Entity for PartLineItem {
    type Id = PartLineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_item_rejects_zero_quantity() {
        let err = LineItem::new(OrderId::new(), VariantId::new(), 0).unwrap_err();
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, "quantity"),
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn line_item_accepts_positive_quantity() {
        let line = LineItem::new(OrderId::new(), VariantId::new(), 2).unwrap();
        assert_eq!(line.quantity, 2);
    }
}
