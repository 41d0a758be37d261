//! Line quantity projection: line → required unit count per variant.
//!
//! Recomputed on every reconciliation trigger; never cached, since the line
//! quantity is mutable.

use std::collections::BTreeMap;

use kitforge_catalog::BundlePart;
use kitforge_core::VariantId;

use crate::line_item::{LineItem, PartLineItem};

/// Where a line's part quantities come from.
///
/// `LiveDefinition` is the compatibility fallback for lines created before
/// snapshotting existed: it reads the current bundle definition instead of a
/// frozen snapshot, so later admin edits leak into old lines. Kept for
/// correctness on legacy data; new lines always get snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePartSource {
    /// The line's variant is not an assembly.
    NotAssembly,
    /// Authoritative path: the line's frozen part snapshots.
    Snapshots(Vec<PartLineItem>),
    /// Legacy fallback: the assembly's live bundle definition.
    LiveDefinition(Vec<BundlePart>),
}

/// Project a line into the target mapping `variant → required unit count`.
///
/// Pure function. Duplicate variants (two snapshots resolving to the same
/// variant) sum their contributions.
pub fn quantity_by_variant(
    line: &LineItem,
    source: &LinePartSource,
) -> BTreeMap<VariantId, u32> {
    let mut target = BTreeMap::new();

    match source {
        LinePartSource::NotAssembly => {
            target.insert(line.variant_id, line.quantity);
        }
        LinePartSource::Snapshots(snapshots) => {
            for snapshot in snapshots {
                *target.entry(snapshot.variant_id).or_insert(0) +=
                    snapshot.quantity * line.quantity;
            }
        }
        LinePartSource::LiveDefinition(parts) => {
            for part in parts {
                *target.entry(part.part_variant_id).or_insert(0) +=
                    part.count.get() * line.quantity;
            }
        }
    }

    target
}
