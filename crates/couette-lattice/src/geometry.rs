//! The lattice descriptor: extents, halo envelope, and canonical indexing.

use crate::cart::CartComm;
use crate::error::LatticeError;

/// Fixed global and per-rank lattice extents plus the canonical site index.
///
/// Local coordinates are zero-based over the interior (`0..nlocal`), with
/// the halo envelope addressed by negative offsets (`-halo..0`) and
/// past-the-end offsets (`nlocal..nlocal + halo`). [`site`](Self::site) is
/// the one linear mapping every component must use; the allocated per-axis
/// stride is `nlocal + 2 * halo` by construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeGeometry {
    ntotal: [usize; 3],
    nlocal: [usize; 3],
    noffset: [usize; 3],
    nhalo: usize,
    strides: [usize; 3],
    cart: CartComm,
}

impl LatticeGeometry {
    /// Build the descriptor for this rank's subdomain.
    ///
    /// Per-rank extents are fixed: every global extent must divide evenly
    /// by the rank count on its axis.
    pub fn new(
        ntotal: [usize; 3],
        nhalo: usize,
        cart: CartComm,
    ) -> Result<Self, LatticeError> {
        if nhalo == 0 {
            return Err(LatticeError::ZeroHalo);
        }
        let mut nlocal = [0usize; 3];
        let mut noffset = [0usize; 3];
        for axis in 0..3 {
            if ntotal[axis] == 0 {
                return Err(LatticeError::ZeroExtent { axis });
            }
            let ranks = cart.size(axis);
            if ntotal[axis] % ranks != 0 {
                return Err(LatticeError::ExtentNotDivisible {
                    axis,
                    extent: ntotal[axis],
                    ranks,
                });
            }
            nlocal[axis] = ntotal[axis] / ranks;
            noffset[axis] = nlocal[axis] * cart.coord(axis);
        }
        let zs = 1;
        let ys = nlocal[2] + 2 * nhalo;
        let xs = (nlocal[1] + 2 * nhalo) * ys;
        Ok(Self {
            ntotal,
            nlocal,
            noffset,
            nhalo,
            strides: [xs, ys, zs],
            cart,
        })
    }

    /// Canonical linear site index for local coordinates, halo included.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate falls outside the allocated halo envelope.
    /// That is a programming error in the caller, not a runtime condition.
    pub fn site(&self, i: i32, j: i32, k: i32) -> usize {
        let h = self.nhalo as i32;
        assert!(
            self.in_envelope(i, j, k),
            "site ({i},{j},{k}) outside halo envelope of {:?} + {h}",
            self.nlocal
        );
        let xs = self.strides[0] as i32;
        let ys = self.strides[1] as i32;
        ((i + h) * xs + (j + h) * ys + (k + h)) as usize
    }

    fn in_envelope(&self, i: i32, j: i32, k: i32) -> bool {
        let h = self.nhalo as i32;
        i >= -h
            && i < self.nlocal[0] as i32 + h
            && j >= -h
            && j < self.nlocal[1] as i32 + h
            && k >= -h
            && k < self.nlocal[2] as i32 + h
    }

    /// Total allocated sites, halo envelope included.
    pub fn nsites(&self) -> usize {
        (self.nlocal[0] + 2 * self.nhalo) * self.strides[0]
    }

    /// Linear strides `[xs, ys, zs]` of the allocated storage.
    ///
    /// Exposed for the flux divergence differencing, which reads the
    /// "one before" neighbour by subtracting a stride from a site index.
    pub fn strides(&self) -> [usize; 3] {
        self.strides
    }

    /// Global extent per axis.
    pub fn ntotal(&self, axis: usize) -> usize {
        self.ntotal[axis]
    }

    /// This rank's interior extent per axis.
    pub fn nlocal(&self, axis: usize) -> usize {
        self.nlocal[axis]
    }

    /// This rank's offset into the global index space.
    pub fn noffset(&self, axis: usize) -> usize {
        self.noffset[axis]
    }

    /// Halo depth of the allocated envelope.
    pub fn nhalo(&self) -> usize {
        self.nhalo
    }

    /// The rank topology this geometry was built for.
    pub fn cart(&self) -> &CartComm {
        &self.cart
    }
}
