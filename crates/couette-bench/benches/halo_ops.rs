//! Criterion micro-benchmarks for the halo-swap engine.

use couette_bench::reference_geometry;
use couette_comms::{Communicator, HaloSwap, HostHandlers};
use couette_lattice::{CartComm, LatticeGeometry};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark: full three-axis exchange of a 32^3 scalar field, depth 2,
/// single rank (self-send path, no thread synchronisation cost).
fn bench_halo_swap_32_cubed(c: &mut Criterion) {
    let geometry = reference_geometry();
    let mut comm = Communicator::world(1).remove(0);

    let mut swap = HaloSwap::new(&geometry, 2, 1).unwrap();
    swap.set_handlers(Box::new(HostHandlers::new(1)));
    swap.commit();

    let mut data = vec![0.0; geometry.nsites()];
    for (i, v) in data.iter_mut().enumerate() {
        *v = i as f64;
    }

    c.bench_function("halo_swap_32_cubed", |b| {
        b.iter(|| {
            swap.run(&mut comm, &mut data).unwrap();
            black_box(&data);
        });
    });
}

/// Benchmark: same exchange with five elements per site, exercising the
/// pack/unpack handlers on wider payloads.
fn bench_halo_swap_vector_field(c: &mut Criterion) {
    let geometry = LatticeGeometry::new([16, 16, 16], 2, CartComm::single()).unwrap();
    let mut comm = Communicator::world(1).remove(0);

    let nf = 5;
    let mut swap = HaloSwap::new(&geometry, 2, nf).unwrap();
    swap.set_handlers(Box::new(HostHandlers::new(nf)));
    swap.commit();

    let mut data = vec![1.0; geometry.nsites() * nf];

    c.bench_function("halo_swap_vector_field", |b| {
        b.iter(|| {
            swap.run(&mut comm, &mut data).unwrap();
            black_box(&data);
        });
    });
}

criterion_group!(benches, bench_halo_swap_32_cubed, bench_halo_swap_vector_field);
criterion_main!(benches);
