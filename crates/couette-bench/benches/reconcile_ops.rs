//! Criterion micro-benchmarks for sliding-plane flux reconciliation.

use couette_bench::{reference_geometry, seeded_flux};
use couette_comms::Communicator;
use couette_flux::FluxReconciler;
use couette_shear::{PlaneRegistry, ShearPlane};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark: serial reconciliation of three planes on a 32^3 lattice at a
/// fractional displacement.
fn bench_reconcile_serial_three_planes(c: &mut Criterion) {
    let geometry = reference_geometry();
    let planes = [7, 15, 23]
        .into_iter()
        .map(|location| ShearPlane {
            location,
            velocity: 0.5,
        })
        .collect();
    let registry = PlaneRegistry::new(&geometry, planes).unwrap();
    let reconciler = FluxReconciler::new(&geometry, registry);
    let mut comm = Communicator::world(1).remove(0);

    let template = seeded_flux(&geometry);
    c.bench_function("reconcile_serial_three_planes", |b| {
        b.iter(|| {
            let mut flux = template.clone();
            reconciler.fix(&mut comm, &mut flux, 7).unwrap();
            black_box(&flux);
        });
    });
}

/// Benchmark: the displacement and rank-window arithmetic alone, the part
/// re-derived from scratch every step.
fn bench_displacement_evaluation(c: &mut Criterion) {
    let geometry = reference_geometry();
    let registry = PlaneRegistry::new(
        &geometry,
        vec![ShearPlane {
            location: 7,
            velocity: 0.5,
        }],
    )
    .unwrap();

    c.bench_function("displacement_evaluation", |b| {
        b.iter(|| {
            for step in 0..1000u64 {
                let d = registry.displacement_up(0, step);
                black_box(d);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_reconcile_serial_three_planes,
    bench_displacement_evaluation
);
criterion_main!(benches);
