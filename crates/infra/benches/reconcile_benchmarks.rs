//! Reconcile-plan benchmarks: the diff runs on every quantity edit, so its
//! cost at realistic and pathological unit counts is worth watching.

use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use kitforge_core::{LineItemId, ShipmentId, VariantId};
use kitforge_inventory::{InventoryUnit, ShipmentState, UnitState, plan_line};

fn build_state(
    variants: usize,
    units_per_variant: usize,
) -> (
    LineItemId,
    BTreeMap<VariantId, u32>,
    Vec<InventoryUnit>,
    BTreeMap<ShipmentId, ShipmentState>,
) {
    let line_id = LineItemId::new();
    let shipment = ShipmentId::new();
    let mut shipments = BTreeMap::new();
    shipments.insert(shipment, ShipmentState::Pending);

    let mut target = BTreeMap::new();
    let mut units = Vec::new();
    for _ in 0..variants {
        let variant = VariantId::new();
        // Target half of what exists, forcing removals across the board.
        target.insert(variant, (units_per_variant / 2) as u32);
        for _ in 0..units_per_variant {
            units.push(InventoryUnit::new(
                variant,
                line_id,
                Some(shipment),
                UnitState::OnHand,
            ));
        }
    }

    (line_id, target, units, shipments)
}

fn bench_plan_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_line");

    for (variants, units_per_variant) in [(3, 10), (10, 50), (50, 100)] {
        let (line_id, target, units, shipments) = build_state(variants, units_per_variant);
        group.bench_function(
            format!("{variants}_variants_x_{units_per_variant}_units"),
            |b| {
                b.iter(|| {
                    black_box(plan_line(
                        line_id,
                        black_box(&target),
                        black_box(&units),
                        black_box(&shipments),
                        None,
                    ))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_plan_line);
criterion_main!(benches);
