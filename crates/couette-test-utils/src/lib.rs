//! Test utilities and fixtures for Couette development.
//!
//! Provides a mock [`ChemicalPotential`] (the field value itself, which
//! turns the update into plain diffusion), canonical field fixtures, and
//! [`run_ranks`], the scoped-thread harness that stands in for a
//! multi-rank launch.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use couette_comms::Communicator;
use couette_core::{ChemicalPotential, FieldAccess, ScalarField};
use couette_lattice::{LatticeGeometry, X, Y, Z};

/// A chemical potential equal to the field value itself, `mu = phi`.
///
/// Under the two-point flux stencil this makes the forward step a plain
/// explicit diffusion of `phi` with diffusivity equal to the mobility.
pub struct FieldPotential<'a> {
    field: &'a ScalarField,
}

impl<'a> FieldPotential<'a> {
    pub fn new(field: &'a ScalarField) -> Self {
        Self { field }
    }
}

impl ChemicalPotential for FieldPotential<'_> {
    fn chemical_potential(&self, index: usize, n: usize) -> f64 {
        self.field.value(index, n)
    }
}

/// A scalar field with a step profile across the transverse midline:
/// `+1` on the lower half of the global y range, `-1` on the upper half.
/// The y step crosses the decomposition axis, so it exercises the row
/// interpolation harder than a profile that is uniform in y; see
/// [`seed_step_function_x`] for the flow-axis variant.
///
/// Only interior sites are written; run a halo exchange (or a periodic
/// fill) before any kernel that reads ghost sites.
pub fn seed_step_function(geometry: &LatticeGeometry) -> ScalarField {
    let mut field = ScalarField::new(geometry.nsites(), 1);
    let mid = geometry.ntotal(Y) / 2;
    for i in 0..geometry.nlocal(X) as i32 {
        for j in 0..geometry.nlocal(Y) as i32 {
            for k in 0..geometry.nlocal(Z) as i32 {
                let gj = geometry.noffset(Y) + j as usize;
                let v = if gj < mid { 1.0 } else { -1.0 };
                field.set_scalar(geometry.site(i, j, k), v);
            }
        }
    }
    field
}

/// The flow-axis counterpart of [`seed_step_function`]: `+1` where the
/// global x coordinate is below the midline, `-1` above. The interface
/// sits across the plane columns instead of along them.
pub fn seed_step_function_x(geometry: &LatticeGeometry) -> ScalarField {
    let mut field = ScalarField::new(geometry.nsites(), 1);
    let mid = geometry.ntotal(X) / 2;
    for i in 0..geometry.nlocal(X) as i32 {
        for j in 0..geometry.nlocal(Y) as i32 {
            for k in 0..geometry.nlocal(Z) as i32 {
                let gi = geometry.noffset(X) + i as usize;
                let v = if gi < mid { 1.0 } else { -1.0 };
                field.set_scalar(geometry.site(i, j, k), v);
            }
        }
    }
    field
}

/// Sum of a scalar field over this rank's interior sites.
pub fn interior_total(geometry: &LatticeGeometry, field: &ScalarField) -> f64 {
    let mut sum = 0.0;
    for i in 0..geometry.nlocal(X) as i32 {
        for j in 0..geometry.nlocal(Y) as i32 {
            for k in 0..geometry.nlocal(Z) as i32 {
                sum += field.scalar(geometry.site(i, j, k));
            }
        }
    }
    sum
}

/// Run `body` once per rank on its own scoped thread, handing each rank
/// its communicator endpoint. Results come back in rank order.
///
/// # Panics
///
/// Propagates a panic from any rank's thread.
pub fn run_ranks<T, F>(nranks: usize, body: F) -> Vec<T>
where
    T: Send,
    F: Fn(Communicator) -> T + Send + Sync,
{
    let world = Communicator::world(nranks);
    let body = &body;
    std::thread::scope(|scope| {
        let handles: Vec<_> = world
            .into_iter()
            .map(|comm| scope.spawn(move || body(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use couette_core::{MessageTag, RankId};
    use couette_lattice::CartComm;

    #[test]
    fn step_function_splits_on_the_global_midline() {
        let cart = CartComm::new([1, 2, 1], RankId(1)).unwrap();
        let g = LatticeGeometry::new([4, 8, 4], 2, cart).unwrap();
        let f = seed_step_function(&g);
        // Rank 1 owns global rows 4..8, all above the midline.
        assert_eq!(f.scalar(g.site(0, 0, 0)), -1.0);
        assert_eq!(interior_total(&g, &f), -(4.0 * 4.0 * 4.0));
    }

    #[test]
    fn x_step_function_splits_on_the_global_x_midline() {
        let g = LatticeGeometry::new([8, 4, 4], 2, CartComm::single()).unwrap();
        let f = seed_step_function_x(&g);
        assert_eq!(f.scalar(g.site(3, 0, 0)), 1.0);
        assert_eq!(f.scalar(g.site(4, 0, 0)), -1.0);
        assert_eq!(interior_total(&g, &f), 0.0);
    }

    #[test]
    fn harness_runs_all_ranks_and_orders_results() {
        let got = run_ranks(3, |mut comm| {
            let next = RankId((comm.rank().0 + 1) % 3);
            let prev = RankId((comm.rank().0 + 2) % 3);
            comm.send(next, MessageTag(1), vec![comm.rank().0 as f64])
                .unwrap();
            let mut batch = couette_comms::RecvBatch::new();
            batch.post(prev, MessageTag(1));
            let payloads = batch.wait_all(&mut comm).unwrap();
            payloads[0][0]
        });
        assert_eq!(got, vec![2.0, 0.0, 1.0]);
    }
}
