//! Part selection resolution.
//!
//! Runs once, at the moment an assembly is added to an order line. Fixed
//! parts snapshot their configured variant; deferred parts snapshot the
//! buyer's choice. The whole set resolves or the whole add fails.

use std::collections::BTreeMap;

use kitforge_catalog::BundlePart;
use kitforge_core::{BundlePartId, DomainError, DomainResult, LineItemId, VariantId};

use crate::line_item::PartLineItem;

/// Resolve every bundle part of an assembly into a [`PartLineItem`] snapshot
/// for the given line.
///
/// Pure: the caller persists the returned set atomically with the line.
/// A deferred part with no entry in `selected` fails the entire resolution
/// with [`DomainError::MissingSelection`].
pub fn resolve_part_line_items(
    line_item_id: LineItemId,
    parts: &[BundlePart],
    selected: &BTreeMap<BundlePartId, VariantId>,
) -> DomainResult<Vec<PartLineItem>> {
    parts
        .iter()
        .map(|part| {
            let variant_id = if part.variant_selection_deferred {
                *selected
                    .get(&part.id)
                    .ok_or_else(|| DomainError::missing_selection(part.id.to_string()))?
            } else {
                part.part_variant_id
            };
            Ok(PartLineItem::new(line_item_id, variant_id, part.count.get()))
        })
        .collect()
}
