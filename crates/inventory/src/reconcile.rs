//! The reconcile plan: pure diff between a line's target unit counts and the
//! units it currently holds.
//!
//! State is re-derived from the unit set on every call; nothing here is
//! persisted beyond the units themselves. The orchestrating service applies
//! the plan atomically and feeds additions through the stock determination
//! gateway.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use kitforge_core::{InventoryUnitId, LineItemId, ShipmentId, VariantId};

use crate::shipment::ShipmentState;
use crate::unit::InventoryUnit;

/// Units still to be created for a variant; placement (shipment, on-hand vs
/// backordered) is the gateway's decision, so the plan only carries counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRequirement {
    pub variant_id: VariantId,
    pub count: u32,
}

/// A reduction that could not be fully satisfied without touching units on a
/// shipped shipment. The destroyable open units are still destroyed; the
/// remainder is reported, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReduction {
    pub line_item_id: LineItemId,
    pub variant_id: VariantId,
    pub missing: u32,
}

impl core::fmt::Display for UnresolvedReduction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} unit(s) of variant {} on line {} are frozen on shipped shipments",
            self.missing, self.variant_id, self.line_item_id
        )
    }
}

/// The diff the reconciler must apply to converge a line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    pub additions: Vec<UnitRequirement>,
    pub removals: Vec<InventoryUnitId>,
    pub unresolved: Vec<UnresolvedReduction>,
}

impl ReconcilePlan {
    /// True when the line is already converged: applying the plan would not
    /// create or destroy anything.
    pub fn is_noop(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.unresolved.is_empty()
    }
}

/// Compute the plan for one line.
///
/// - `target` comes from the quantity projector.
/// - `existing` are the line's current units (any variant).
/// - `shipments` maps shipment ids to their state; units on a `Shipped`
///   shipment are frozen.
/// - `shipment_hint` is the shipment the caller is editing: removals prefer
///   units on *other* open shipments so the hint shipment is disturbed last.
///
/// The variant domain is the union of the target's variants and the variants
/// that currently hold units, so a part removed from the bundle after
/// purchase converges to zero instead of leaving orphans.
pub fn plan_line(
    line_item_id: LineItemId,
    target: &BTreeMap<VariantId, u32>,
    existing: &[InventoryUnit],
    shipments: &BTreeMap<ShipmentId, ShipmentState>,
    shipment_hint: Option<ShipmentId>,
) -> ReconcilePlan {
    let mut variants: BTreeSet<VariantId> = target.keys().copied().collect();
    for unit in existing {
        if unit.line_item_id == line_item_id {
            variants.insert(unit.variant_id);
        }
    }

    let mut plan = ReconcilePlan::default();

    for variant_id in variants {
        let (open, shipped) = partition_units(line_item_id, variant_id, existing, shipments);

        let want = target.get(&variant_id).copied().unwrap_or(0) as usize;
        let have = open.len() + shipped.len();

        if want > have {
            plan.additions.push(UnitRequirement {
                variant_id,
                count: (want - have) as u32,
            });
        } else if want < have {
            let needed = have - want;
            let removable = removal_order(open, shipment_hint);

            plan.removals
                .extend(removable.iter().take(needed).map(|unit| unit.id));

            if needed > removable.len() {
                plan.unresolved.push(UnresolvedReduction {
                    line_item_id,
                    variant_id,
                    missing: (needed - removable.len()) as u32,
                });
            }
        }
    }

    plan
}

/// Split a line's units for one variant into open (destroyable) and shipped
/// (frozen) sets. Unassigned units and units on unknown shipments count as
/// open.
fn partition_units<'a>(
    line_item_id: LineItemId,
    variant_id: VariantId,
    existing: &'a [InventoryUnit],
    shipments: &BTreeMap<ShipmentId, ShipmentState>,
) -> (Vec<&'a InventoryUnit>, Vec<&'a InventoryUnit>) {
    existing
        .iter()
        .filter(|unit| unit.line_item_id == line_item_id && unit.variant_id == variant_id)
        .partition(|unit| {
            !unit
                .shipment_id
                .and_then(|id| shipments.get(&id))
                .is_some_and(|state| state.is_shipped())
        })
}

/// Order open units for destruction: units on shipments other than the hint
/// (or unassigned) come first, units on the hint shipment last.
fn removal_order(
    open: Vec<&InventoryUnit>,
    shipment_hint: Option<ShipmentId>,
) -> Vec<&InventoryUnit> {
    let Some(hint) = shipment_hint else {
        return open;
    };

    let (elsewhere, on_hint): (Vec<_>, Vec<_>) =
        open.into_iter().partition(|unit| !unit.is_on(hint));

    let mut ordered = elsewhere;
    ordered.extend(on_hint);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitState;

    struct Fixture {
        line_item_id: LineItemId,
        units: Vec<InventoryUnit>,
        shipments: BTreeMap<ShipmentId, ShipmentState>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                line_item_id: LineItemId::new(),
                units: Vec::new(),
                shipments: BTreeMap::new(),
            }
        }

        fn shipment(&mut self, state: ShipmentState) -> ShipmentId {
            let id = ShipmentId::new();
            self.shipments.insert(id, state);
            id
        }

        fn units(&mut self, variant_id: VariantId, shipment_id: Option<ShipmentId>, count: u32) {
            for _ in 0..count {
                self.units.push(InventoryUnit::new(
                    variant_id,
                    self.line_item_id,
                    shipment_id,
                    UnitState::OnHand,
                ));
            }
        }

        fn plan(
            &self,
            target: &BTreeMap<VariantId, u32>,
            hint: Option<ShipmentId>,
        ) -> ReconcilePlan {
            plan_line(self.line_item_id, target, &self.units, &self.shipments, hint)
        }

        /// Apply a plan the way the service would, minus the gateway:
        /// additions land on the given shipment as on-hand units.
        fn apply(&mut self, plan: &ReconcilePlan, shipment_id: Option<ShipmentId>) {
            self.units.retain(|unit| !plan.removals.contains(&unit.id));
            for addition in &plan.additions {
                self.units(addition.variant_id, shipment_id, addition.count);
            }
        }
    }

    fn target(entries: &[(VariantId, u32)]) -> BTreeMap<VariantId, u32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn fresh_line_creates_one_requirement_per_variant() {
        let fixture = Fixture::new();
        let (v1, v2, v3) = (VariantId::new(), VariantId::new(), VariantId::new());

        let plan = fixture.plan(&target(&[(v1, 1), (v2, 1), (v3, 3)]), None);

        assert_eq!(plan.additions.len(), 3);
        let by_variant: BTreeMap<VariantId, u32> = plan
            .additions
            .iter()
            .map(|req| (req.variant_id, req.count))
            .collect();
        assert_eq!(by_variant[&v1], 1);
        assert_eq!(by_variant[&v2], 1);
        assert_eq!(by_variant[&v3], 3);
        assert!(plan.removals.is_empty());
        assert!(plan.unresolved.is_empty());
    }

    #[test]
    fn converged_line_plans_nothing() {
        let mut fixture = Fixture::new();
        let shipment = fixture.shipment(ShipmentState::Pending);
        let v = VariantId::new();
        fixture.units(v, Some(shipment), 5);

        let plan = fixture.plan(&target(&[(v, 5)]), None);

        assert!(plan.is_noop());
    }

    #[test]
    fn applying_a_plan_then_replanning_is_a_noop() {
        let mut fixture = Fixture::new();
        let shipment = fixture.shipment(ShipmentState::Pending);
        let (v1, v2) = (VariantId::new(), VariantId::new());
        let wanted = target(&[(v1, 2), (v2, 6)]);

        let first = fixture.plan(&wanted, None);
        fixture.apply(&first, Some(shipment));

        let second = fixture.plan(&wanted, None);
        assert!(second.is_noop());
    }

    #[test]
    fn quantity_increase_adds_exactly_the_difference() {
        let mut fixture = Fixture::new();
        let shipment = fixture.shipment(ShipmentState::Pending);
        let v = VariantId::new();
        fixture.units(v, Some(shipment), 3);

        let plan = fixture.plan(&target(&[(v, 6)]), None);

        assert_eq!(plan.additions.len(), 1);
        assert_eq!(plan.additions[0].count, 3);
        assert!(plan.removals.is_empty());
    }

    #[test]
    fn quantity_decrease_removes_exactly_the_difference() {
        let mut fixture = Fixture::new();
        let shipment = fixture.shipment(ShipmentState::Pending);
        let v = VariantId::new();
        fixture.units(v, Some(shipment), 6);

        let plan = fixture.plan(&target(&[(v, 2)]), None);

        assert!(plan.additions.is_empty());
        assert_eq!(plan.removals.len(), 4);
        assert!(plan.unresolved.is_empty());
    }

    #[test]
    fn shipped_units_are_never_removed() {
        let mut fixture = Fixture::new();
        let open = fixture.shipment(ShipmentState::Pending);
        let shipped = fixture.shipment(ShipmentState::Shipped);
        let v = VariantId::new();
        fixture.units(v, Some(shipped), 3);
        fixture.units(v, Some(open), 7);

        let plan = fixture.plan(&target(&[(v, 4)]), None);

        // 10 have, 4 wanted: all 6 removals come from the open shipment.
        assert_eq!(plan.removals.len(), 6);
        let shipped_ids: Vec<InventoryUnitId> = fixture
            .units
            .iter()
            .filter(|unit| unit.is_on(shipped))
            .map(|unit| unit.id)
            .collect();
        for removal in &plan.removals {
            assert!(!shipped_ids.contains(removal));
        }
        assert!(plan.unresolved.is_empty());
    }

    #[test]
    fn reduction_below_shipped_count_reports_the_shortfall() {
        let mut fixture = Fixture::new();
        let open = fixture.shipment(ShipmentState::Pending);
        let shipped = fixture.shipment(ShipmentState::Shipped);
        let v = VariantId::new();
        fixture.units(v, Some(shipped), 3);
        fixture.units(v, Some(open), 2);

        // want 1, have 5, but only 2 destroyable: destroy both, report 2.
        let plan = fixture.plan(&target(&[(v, 1)]), None);

        assert_eq!(plan.removals.len(), 2);
        assert_eq!(plan.unresolved.len(), 1);
        assert_eq!(plan.unresolved[0].variant_id, v);
        assert_eq!(plan.unresolved[0].missing, 2);
    }

    #[test]
    fn orphaned_variants_converge_to_zero() {
        let mut fixture = Fixture::new();
        let shipment = fixture.shipment(ShipmentState::Pending);
        let kept = VariantId::new();
        let orphan = VariantId::new();
        fixture.units(kept, Some(shipment), 2);
        fixture.units(orphan, Some(shipment), 3);

        // The orphan variant no longer appears in the target at all.
        let plan = fixture.plan(&target(&[(kept, 2)]), None);

        assert_eq!(plan.removals.len(), 3);
        let orphan_ids: Vec<InventoryUnitId> = fixture
            .units
            .iter()
            .filter(|unit| unit.variant_id == orphan)
            .map(|unit| unit.id)
            .collect();
        for removal in &plan.removals {
            assert!(orphan_ids.contains(removal));
        }
    }

    #[test]
    fn removals_prefer_units_off_the_hint_shipment() {
        let mut fixture = Fixture::new();
        let hint = fixture.shipment(ShipmentState::Pending);
        let other = fixture.shipment(ShipmentState::Pending);
        let v = VariantId::new();
        fixture.units(v, Some(hint), 3);
        fixture.units(v, Some(other), 3);

        let plan = fixture.plan(&target(&[(v, 3)]), Some(hint));

        assert_eq!(plan.removals.len(), 3);
        let other_ids: Vec<InventoryUnitId> = fixture
            .units
            .iter()
            .filter(|unit| unit.is_on(other))
            .map(|unit| unit.id)
            .collect();
        for removal in &plan.removals {
            assert!(other_ids.contains(removal));
        }
    }

    #[test]
    fn hint_shipment_units_are_removed_once_others_run_out() {
        let mut fixture = Fixture::new();
        let hint = fixture.shipment(ShipmentState::Pending);
        let other = fixture.shipment(ShipmentState::Pending);
        let v = VariantId::new();
        fixture.units(v, Some(hint), 4);
        fixture.units(v, Some(other), 2);

        let plan = fixture.plan(&target(&[(v, 1)]), Some(hint));

        assert_eq!(plan.removals.len(), 5);
        let hint_removals = plan
            .removals
            .iter()
            .filter(|id| {
                fixture
                    .units
                    .iter()
                    .any(|unit| unit.id == **id && unit.is_on(hint))
            })
            .count();
        assert_eq!(hint_removals, 3);
    }

    #[test]
    fn unassigned_units_count_as_open() {
        let mut fixture = Fixture::new();
        let v = VariantId::new();
        fixture.units(v, None, 4);

        let plan = fixture.plan(&target(&[(v, 1)]), None);

        assert_eq!(plan.removals.len(), 3);
        assert!(plan.unresolved.is_empty());
    }

    #[test]
    fn units_of_other_lines_are_ignored() {
        let mut fixture = Fixture::new();
        let v = VariantId::new();
        let foreign = InventoryUnit::new(v, LineItemId::new(), None, UnitState::OnHand);
        fixture.units.push(foreign);

        let plan = fixture.plan(&target(&[(v, 1)]), None);

        assert_eq!(plan.additions.len(), 1);
        assert_eq!(plan.additions[0].count, 1);
        assert!(plan.removals.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: after applying a plan, every variant holds
            /// max(want, shipped) units when shrinking and exactly `want`
            /// when growing, and shipped units are numerically unchanged.
            #[test]
            fn applying_a_plan_converges_within_the_frozen_floor(
                want in 0u32..12,
                open_before in 0u32..12,
                shipped_before in 0u32..6,
            ) {
                let mut fixture = Fixture::new();
                let open = fixture.shipment(ShipmentState::Pending);
                let shipped = fixture.shipment(ShipmentState::Shipped);
                let v = VariantId::new();
                fixture.units(v, Some(shipped), shipped_before);
                fixture.units(v, Some(open), open_before);

                let wanted = target(&[(v, want)]);
                let plan = fixture.plan(&wanted, None);
                fixture.apply(&plan, Some(open));

                let shipped_after = fixture
                    .units
                    .iter()
                    .filter(|unit| unit.is_on(shipped))
                    .count() as u32;
                let total_after = fixture.units.len() as u32;

                prop_assert_eq!(shipped_after, shipped_before);
                prop_assert_eq!(total_after, want.max(shipped_before));

                // Shortfall is reported exactly when the frozen floor binds.
                if shipped_before > want {
                    prop_assert_eq!(plan.unresolved.len(), 1);
                    prop_assert_eq!(plan.unresolved[0].missing, shipped_before - want);
                } else {
                    prop_assert!(plan.unresolved.is_empty());
                }
            }

            /// Property: a second plan after applying the first is a no-op
            /// whenever the first fully converged.
            #[test]
            fn replanning_after_full_convergence_is_a_noop(
                want in 0u32..12,
                open_before in 0u32..12,
            ) {
                let mut fixture = Fixture::new();
                let open = fixture.shipment(ShipmentState::Pending);
                let v = VariantId::new();
                fixture.units(v, Some(open), open_before);

                let wanted = target(&[(v, want)]);
                let plan = fixture.plan(&wanted, None);
                fixture.apply(&plan, Some(open));

                prop_assert!(fixture.plan(&wanted, None).is_noop());
            }
        }
    }
}
