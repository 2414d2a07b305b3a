//! End-to-end consistency scenario: a 16x16x16 lattice with three sliding
//! planes, pure diffusion of a step-function field for ten steps. The run
//! must conserve the field total and produce bit-identical results for any
//! transverse decomposition.

use couette_comms::{Communicator, HaloSwap, HostHandlers};
use couette_core::{FieldAccess, ScalarField};
use couette_flux::{FluxBuffers, FluxReconciler, OrderParameterUpdate};
use couette_lattice::{CartComm, LatticeGeometry, X, Y, Z};
use couette_shear::{PlaneRegistry, ShearPlane};
use couette_test_utils::{
    run_ranks, seed_step_function, seed_step_function_x, FieldPotential,
};

const NTOTAL: [usize; 3] = [16, 16, 16];
const NHALO: usize = 2;
const MOBILITY: f64 = 0.05;
const STEPS: u64 = 10;

fn planes() -> Vec<ShearPlane> {
    [3, 7, 11]
        .into_iter()
        .map(|location| ShearPlane {
            location,
            velocity: 0.5,
        })
        .collect()
}

/// Run the scenario decomposed over `nranks` transverse ranks and return
/// the interior field assembled in global site order.
fn run_scenario(nranks: usize, seed: fn(&LatticeGeometry) -> ScalarField) -> Vec<f64> {
    let parts = run_ranks(nranks, |mut comm: Communicator| {
        let cart = CartComm::new([1, nranks, 1], comm.rank()).unwrap();
        let g = LatticeGeometry::new(NTOTAL, NHALO, cart).unwrap();
        let registry = PlaneRegistry::new(&g, planes()).unwrap();
        let reconciler = FluxReconciler::new(&g, registry);
        let update = OrderParameterUpdate::new(MOBILITY).unwrap();

        let mut swap = HaloSwap::new(&g, NHALO, 1).unwrap();
        swap.set_handlers(Box::new(HostHandlers::new(1)));
        swap.commit();

        let mut phi = seed(&g);
        for step in 0..STEPS {
            swap.run(&mut comm, phi.data_mut()).unwrap();
            let mut flux = FluxBuffers::new(&g, 1);
            update.diffusive_flux(&g, &FieldPotential::new(&phi), &mut flux);
            reconciler.fix(&mut comm, &mut flux, step).unwrap();
            update.forward_step(&g, &mut phi, &flux);
        }

        let mut values = Vec::with_capacity(g.nlocal(X) * g.nlocal(Y) * g.nlocal(Z));
        for i in 0..g.nlocal(X) as i32 {
            for j in 0..g.nlocal(Y) as i32 {
                for k in 0..g.nlocal(Z) as i32 {
                    values.push(phi.scalar(g.site(i, j, k)));
                }
            }
        }
        (g.noffset(Y), values)
    });

    let [nx, ny, nz] = NTOTAL;
    let nly = ny / nranks;
    let mut global = vec![0.0; nx * ny * nz];
    for (offset, values) in parts {
        let mut it = values.into_iter();
        for i in 0..nx {
            for j in 0..nly {
                for k in 0..nz {
                    global[(i * ny + offset + j) * nz + k] = it.next().unwrap();
                }
            }
        }
    }
    global
}

#[test]
fn decomposed_runs_match_the_single_rank_run_bitwise() {
    let serial = run_scenario(1, seed_step_function);
    assert_eq!(serial, run_scenario(2, seed_step_function));
    assert_eq!(serial, run_scenario(4, seed_step_function));
}

#[test]
fn x_step_scenario_is_decomposition_invariant_and_conserved() {
    // The flow-axis step puts the interface across the plane at x = 7.
    let serial = run_scenario(1, seed_step_function_x);
    assert_eq!(serial, run_scenario(2, seed_step_function_x));
    let total: f64 = serial.iter().sum();
    assert!(total.abs() < 1e-10, "x-step total drifted to {total}");
}

#[test]
fn the_scenario_conserves_the_field_total() {
    // The step profile starts balanced at exactly zero.
    for nranks in [1, 2] {
        let total: f64 = run_scenario(nranks, seed_step_function).iter().sum();
        assert!(
            total.abs() < 1e-10,
            "{nranks}-rank total drifted to {total}"
        );
    }
}

#[test]
fn repeated_runs_are_bitwise_identical() {
    assert_eq!(
        run_scenario(2, seed_step_function),
        run_scenario(2, seed_step_function)
    );
}

#[test]
fn the_interface_actually_diffuses() {
    let [_, ny, nz] = NTOTAL;
    let out = run_scenario(1, seed_step_function);
    // At i = 0, just below the midline, the profile must have dropped.
    let below = out[(ny / 2 - 1) * nz];
    assert!(below < 1.0 && below > -1.0, "no diffusion happened: {below}");
}
