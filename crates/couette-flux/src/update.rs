//! Diffusive flux accumulation and the explicit-Euler field update.

use crate::buffers::FluxBuffers;
use crate::error::FluxError;
use couette_core::{ChemicalPotential, FieldAccess};
use couette_lattice::{LatticeGeometry, X, Y, Z};

/// The representative consumer: accumulates diffusive face fluxes from a
/// chemical potential and applies the divergence as a forward Euler step
/// with unit time step.
#[derive(Clone, Copy, Debug)]
pub struct OrderParameterUpdate {
    mobility: f64,
}

impl OrderParameterUpdate {
    /// Validate the mobility coefficient.
    pub fn new(mobility: f64) -> Result<Self, FluxError> {
        if !mobility.is_finite() {
            return Err(FluxError::MobilityNotFinite { value: mobility });
        }
        if mobility < 0.0 {
            return Err(FluxError::MobilityNegative { value: mobility });
        }
        Ok(Self { mobility })
    }

    /// The validated mobility coefficient.
    pub fn mobility(&self) -> f64 {
        self.mobility
    }

    /// Accumulate the two-point chemical-potential stencil into all four
    /// face arrays.
    ///
    /// The loops cover the interior plus the one-below halo row in y and z,
    /// so the low-face divergence terms telescope without a separate pass.
    /// The potential must be valid one site beyond that envelope, hence the
    /// halo-depth requirement.
    ///
    /// # Panics
    ///
    /// Panics if the geometry halo is shallower than 2 or the flux shape
    /// disagrees with the geometry (programming errors).
    pub fn diffusive_flux<P: ChemicalPotential>(
        &self,
        geometry: &LatticeGeometry,
        potential: &P,
        flux: &mut FluxBuffers,
    ) {
        assert!(geometry.nhalo() >= 2, "diffusive flux needs a halo depth of 2");
        let nf = flux.elements_per_site();
        assert_eq!(flux.fe.len(), geometry.nsites() * nf);

        let nx = geometry.nlocal(X) as i32;
        let ny = geometry.nlocal(Y) as i32;
        let nz = geometry.nlocal(Z) as i32;

        for i in 0..nx {
            for j in -1..ny {
                for k in -1..nz {
                    let index0 = geometry.site(i, j, k);
                    for n in 0..nf {
                        let mu0 = potential.chemical_potential(index0, n);

                        // x faces, between i-1 and i, then i and i+1.
                        let mu1 =
                            potential.chemical_potential(geometry.site(i - 1, j, k), n);
                        flux.fw[index0 * nf + n] -= self.mobility * (mu0 - mu1);

                        let mu1 =
                            potential.chemical_potential(geometry.site(i + 1, j, k), n);
                        flux.fe[index0 * nf + n] -= self.mobility * (mu1 - mu0);

                        // y face between j and j+1.
                        let mu1 =
                            potential.chemical_potential(geometry.site(i, j + 1, k), n);
                        flux.fy[index0 * nf + n] -= self.mobility * (mu1 - mu0);

                        // z face between k and k+1.
                        let mu1 =
                            potential.chemical_potential(geometry.site(i, j, k + 1), n);
                        flux.fz[index0 * nf + n] -= self.mobility * (mu1 - mu0);
                    }
                }
            }
        }
    }

    /// Apply the flux divergence to every interior site:
    /// `phi -= fe - fw + fy - fy(y-1) + wz*fz - wz*fz(z-1)`.
    ///
    /// In a genuinely 2-D run (global z extent 1) the z faces carry no
    /// meaningful values, so `wz` drops them.
    ///
    /// # Panics
    ///
    /// Panics if the field and flux element counts disagree (programming
    /// error).
    pub fn forward_step<F: FieldAccess>(
        &self,
        geometry: &LatticeGeometry,
        field: &mut F,
        flux: &FluxBuffers,
    ) {
        let nf = flux.elements_per_site();
        assert_eq!(field.elements_per_site(), nf);

        let ys = geometry.strides()[1];
        let wz = if geometry.ntotal(Z) == 1 { 0.0 } else { 1.0 };

        for i in 0..geometry.nlocal(X) as i32 {
            for j in 0..geometry.nlocal(Y) as i32 {
                for k in 0..geometry.nlocal(Z) as i32 {
                    let index = geometry.site(i, j, k);
                    for n in 0..nf {
                        let a = index * nf + n;
                        let phi = field.value(index, n)
                            - (flux.fe[a] - flux.fw[a] + flux.fy[a]
                                - flux.fy[a - ys * nf]
                                + wz * flux.fz[a]
                                - wz * flux.fz[a - nf]);
                        field.set_value(index, n, phi);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use couette_core::ScalarField;
    use couette_lattice::CartComm;
    use couette_test_utils::{seed_step_function, FieldPotential};

    fn geom() -> LatticeGeometry {
        LatticeGeometry::new([4, 8, 4], 2, CartComm::single()).unwrap()
    }

    fn total(geometry: &LatticeGeometry, field: &ScalarField) -> f64 {
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

    // ── construction ──

    #[test]
    fn rejects_bad_mobility() {
        assert!(matches!(
            OrderParameterUpdate::new(f64::NAN),
            Err(FluxError::MobilityNotFinite { .. })
        ));
        assert!(matches!(
            OrderParameterUpdate::new(-0.5),
            Err(FluxError::MobilityNegative { value }) if value == -0.5
        ));
        assert_eq!(OrderParameterUpdate::new(0.25).unwrap().mobility(), 0.25);
    }

    // ── kernels ──

    #[test]
    fn uniform_field_produces_no_flux() {
        let g = geom();
        let mut phi = ScalarField::new(g.nsites(), 1);
        phi.data_mut().fill(3.0);
        let update = OrderParameterUpdate::new(0.5).unwrap();

        let mut flux = FluxBuffers::new(&g, 1);
        update.diffusive_flux(&g, &FieldPotential::new(&phi), &mut flux);
        assert!(flux.fe.iter().all(|&v| v == 0.0));
        assert!(flux.fy.iter().all(|&v| v == 0.0));

        let before = total(&g, &phi);
        update.forward_step(&g, &mut phi, &flux);
        assert_eq!(total(&g, &phi), before);
    }

    #[test]
    fn step_profile_diffuses_and_conserves() {
        let g = geom();
        let mut phi = seed_step_function(&g);
        // Periodic halos by hand on one rank: mirror the y wrap.
        fill_periodic_halos(&g, &mut phi);
        let update = OrderParameterUpdate::new(0.1).unwrap();

        let before = total(&g, &phi);
        let mu_src = phi.clone();
        let mut flux = FluxBuffers::new(&g, 1);
        update.diffusive_flux(&g, &FieldPotential::new(&mu_src), &mut flux);
        update.forward_step(&g, &mut phi, &flux);
        let after = total(&g, &phi);

        assert!((after - before).abs() < 1e-12, "total drifted: {before} -> {after}");
        // The interface at ny/2 must have smeared.
        let mid = g.site(0, 3, 0);
        assert_ne!(phi.scalar(mid), 1.0);
    }

    #[test]
    fn flat_z_drops_the_z_divergence() {
        let g = LatticeGeometry::new([4, 8, 1], 2, CartComm::single()).unwrap();
        let mut phi = ScalarField::new(g.nsites(), 1);
        let update = OrderParameterUpdate::new(1.0).unwrap();

        // Poison the z faces; a 2-D step must ignore them.
        let mut flux = FluxBuffers::new(&g, 1);
        flux.fz.fill(1000.0);
        update.forward_step(&g, &mut phi, &flux);
        assert!(phi.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "halo depth of 2")]
    fn shallow_halo_rejected() {
        let g = LatticeGeometry::new([4, 4, 4], 1, CartComm::single()).unwrap();
        let phi = ScalarField::new(g.nsites(), 1);
        let mut flux = FluxBuffers::new(&g, 1);
        OrderParameterUpdate::new(1.0)
            .unwrap()
            .diffusive_flux(&g, &FieldPotential::new(&phi), &mut flux);
    }

    /// Single-rank periodic halo fill, all axes, straight copy.
    fn fill_periodic_halos(g: &LatticeGeometry, phi: &mut ScalarField) {
        let h = g.nhalo() as i32;
        let (nx, ny, nz) = (
            g.nlocal(X) as i32,
            g.nlocal(Y) as i32,
            g.nlocal(Z) as i32,
        );
        for i in -h..nx + h {
            for j in -h..ny + h {
                for k in -h..nz + h {
                    let src = g.site(
                        i.rem_euclid(nx),
                        j.rem_euclid(ny),
                        k.rem_euclid(nz),
                    );
                    let dst = g.site(i, j, k);
                    let v = phi.scalar(src);
                    phi.set_scalar(dst, v);
                }
            }
        }
    }
}
