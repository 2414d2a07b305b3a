//! Ghost-layer exchange for per-site vector fields.
//!
//! One [`HaloSwap`] is created per distinct field shape, committed once,
//! and reused every step. The exchange walks the axes in the fixed order
//! x, y, z; faces on later axes include the halo extent of axes already
//! swapped, so edge and corner ghosts are filled after the full sweep.
//! Packing and unpacking go through the injected [`HaloHandlers`] strategy:
//! [`HostHandlers`] is a plain gather/scatter for host-resident data, and an
//! accelerator build substitutes handlers that stage through device kernels
//! without touching the exchange protocol.

use crate::error::CommsError;
use crate::transport::{Communicator, RecvBatch};
use couette_core::MessageTag;
use couette_lattice::LatticeGeometry;

/// Tag base for halo traffic; each axis uses two tags (low and high face)
/// so both directions can be in flight between one rank pair.
const HALO_TAG_BASE: u32 = 916;

/// Pack/unpack strategy for moving face slabs between field storage and
/// transport buffers.
///
/// `sites` is the engine's precomputed canonical site list for one face;
/// buffers are laid out `slot * elements + n`, matching the site-major
/// field layout.
pub trait HaloHandlers: Send {
    /// Elements per site these handlers were built for; must equal the
    /// engine's element count (checked before any transport).
    fn elements_per_site(&self) -> usize;

    /// Gather `data` values at `sites` into `buf`.
    fn pack(&self, sites: &[usize], data: &[f64], buf: &mut [f64]);

    /// Scatter `buf` into `data` at `sites`.
    fn unpack(&self, sites: &[usize], data: &mut [f64], buf: &[f64]);
}

/// Trivial host-memory gather/scatter handlers.
#[derive(Clone, Debug)]
pub struct HostHandlers {
    elements: usize,
}

impl HostHandlers {
    /// Handlers for a field with `elements` values per site.
    pub fn new(elements: usize) -> Self {
        Self { elements }
    }
}

impl HaloHandlers for HostHandlers {
    fn elements_per_site(&self) -> usize {
        self.elements
    }

    fn pack(&self, sites: &[usize], data: &[f64], buf: &mut [f64]) {
        let nf = self.elements;
        for (slot, &site) in sites.iter().enumerate() {
            buf[slot * nf..(slot + 1) * nf].copy_from_slice(&data[site * nf..site * nf + nf]);
        }
    }

    fn unpack(&self, sites: &[usize], data: &mut [f64], buf: &[f64]) {
        let nf = self.elements;
        for (slot, &site) in sites.iter().enumerate() {
            data[site * nf..site * nf + nf].copy_from_slice(&buf[slot * nf..(slot + 1) * nf]);
        }
    }
}

/// Precomputed site lists for one axis: the two send slabs and the two
/// ghost slabs they land in on the receiving side.
struct AxisFaces {
    axis: usize,
    send_low: Vec<usize>,
    send_high: Vec<usize>,
    recv_low: Vec<usize>,
    recv_high: Vec<usize>,
}

/// The halo-swap engine for one field shape.
pub struct HaloSwap {
    geometry: LatticeGeometry,
    depth: usize,
    elements: usize,
    handlers: Option<Box<dyn HaloHandlers>>,
    faces: Vec<AxisFaces>,
    committed: bool,
}

impl HaloSwap {
    /// Create an engine exchanging `depth` ghost layers of a field with
    /// `elements` values per site over `geometry`.
    ///
    /// Axes with global extent 1 carry no meaningful ghost data and are
    /// skipped by the exchange (the 2-D update path zeroes those flux
    /// terms); on every other axis the depth must fit both the allocated
    /// halo and the subdomain extent.
    pub fn new(
        geometry: &LatticeGeometry,
        depth: usize,
        elements: usize,
    ) -> Result<Self, CommsError> {
        if depth == 0 || depth > geometry.nhalo() {
            return Err(CommsError::DepthMismatch {
                depth,
                halo: geometry.nhalo(),
            });
        }
        if elements == 0 {
            return Err(CommsError::ZeroElements);
        }
        for axis in 0..3 {
            if geometry.ntotal(axis) > 1 && depth > geometry.nlocal(axis) {
                return Err(CommsError::DepthExceedsExtent {
                    axis,
                    depth,
                    extent: geometry.nlocal(axis),
                });
            }
        }
        Ok(Self {
            geometry: geometry.clone(),
            depth,
            elements,
            handlers: None,
            faces: Vec::new(),
            committed: false,
        })
    }

    /// Install the pack/unpack strategy. Must happen before the first run.
    pub fn set_handlers(&mut self, handlers: Box<dyn HaloHandlers>) {
        self.handlers = Some(handlers);
    }

    /// Finalize face site tables and buffer sizing. Idempotent.
    pub fn commit(&mut self) {
        if self.committed {
            return;
        }
        for axis in 0..3 {
            if self.geometry.ntotal(axis) == 1 {
                continue;
            }
            self.faces.push(self.build_faces(axis));
        }
        self.committed = true;
    }

    /// Exchange depth this engine was created for.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Elements per site this engine was created for.
    pub fn elements_per_site(&self) -> usize {
        self.elements
    }

    /// Enumerate the four face slabs for `axis` in canonical (i, j, k)
    /// ascending order. Axes swapped earlier contribute their exchanged
    /// halo extent; later axes contribute interior only, so corner sites
    /// propagate over the full sweep.
    fn build_faces(&self, axis: usize) -> AxisFaces {
        let d = self.depth as i32;
        let n = self.geometry.nlocal(axis) as i32;
        AxisFaces {
            axis,
            send_low: self.slab(axis, 0, d),
            send_high: self.slab(axis, n - d, n),
            recv_low: self.slab(axis, -d, 0),
            recv_high: self.slab(axis, n, n + d),
        }
    }

    fn slab(&self, axis: usize, from: i32, to: i32) -> Vec<usize> {
        let d = self.depth as i32;
        let range = |b: usize| -> (i32, i32) {
            let nb = self.geometry.nlocal(b) as i32;
            if b == axis {
                (from, to)
            } else if b < axis && self.geometry.ntotal(b) > 1 {
                (-d, nb + d)
            } else {
                (0, nb)
            }
        };
        let (i0, i1) = range(0);
        let (j0, j1) = range(1);
        let (k0, k1) = range(2);
        let mut sites =
            Vec::with_capacity(((i1 - i0) * (j1 - j0) * (k1 - k0)) as usize);
        for i in i0..i1 {
            for j in j0..j1 {
                for k in k0..k1 {
                    sites.push(self.geometry.site(i, j, k));
                }
            }
        }
        sites
    }

    /// Perform one full halo exchange on `data`, mutating ghost sites only.
    ///
    /// For each participating axis both receives and both sends are posted
    /// before either is waited on, then the ghost layers are unpacked. The
    /// direction order is fixed, so the exchange is repeatable.
    pub fn run(&mut self, comm: &mut Communicator, data: &mut [f64]) -> Result<(), CommsError> {
        if !self.committed {
            return Err(CommsError::NotCommitted);
        }
        let handlers = self.handlers.as_ref().ok_or(CommsError::HandlersMissing)?;
        if handlers.elements_per_site() != self.elements {
            return Err(CommsError::HandlerShapeMismatch {
                engine: self.elements,
                handler: handlers.elements_per_site(),
            });
        }
        let expected = self.geometry.nsites() * self.elements;
        if data.len() != expected {
            return Err(CommsError::FieldSizeMismatch {
                expected,
                got: data.len(),
            });
        }

        let cart = self.geometry.cart();
        for faces in &self.faces {
            let tag_low = MessageTag(HALO_TAG_BASE + 2 * faces.axis as u32);
            let tag_high = MessageTag(HALO_TAG_BASE + 2 * faces.axis as u32 + 1);
            let lo = cart.neighbour(faces.axis, -1);
            let hi = cart.neighbour(faces.axis, 1);

            let mut low_buf = vec![0.0; faces.send_low.len() * self.elements];
            let mut high_buf = vec![0.0; faces.send_high.len() * self.elements];
            handlers.pack(&faces.send_low, data, &mut low_buf);
            handlers.pack(&faces.send_high, data, &mut high_buf);

            // My low slab becomes the low neighbour's high ghost layer and
            // vice versa; the ghost fill therefore arrives from the
            // opposite neighbour under the sender's face tag.
            let mut batch = RecvBatch::new();
            batch.post(hi, tag_low);
            batch.post(lo, tag_high);
            comm.send(lo, tag_low, low_buf)?;
            comm.send(hi, tag_high, high_buf)?;
            let payloads = batch.wait_all(comm)?;

            for (payload, (sites, source)) in payloads
                .iter()
                .zip([(&faces.recv_high, hi), (&faces.recv_low, lo)])
            {
                if payload.len() != sites.len() * self.elements {
                    return Err(CommsError::PayloadSizeMismatch {
                        source,
                        expected: sites.len() * self.elements,
                        got: payload.len(),
                    });
                }
                handlers.unpack(sites, data, payload);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use couette_lattice::CartComm;

    fn geom() -> LatticeGeometry {
        LatticeGeometry::new([4, 4, 4], 2, CartComm::single()).unwrap()
    }

    #[test]
    fn depth_must_fit_halo() {
        let g = geom();
        assert!(matches!(
            HaloSwap::new(&g, 3, 1),
            Err(CommsError::DepthMismatch { depth: 3, halo: 2 })
        ));
        assert!(matches!(
            HaloSwap::new(&g, 0, 1),
            Err(CommsError::DepthMismatch { depth: 0, .. })
        ));
    }

    #[test]
    fn zero_elements_rejected() {
        let g = geom();
        assert!(matches!(
            HaloSwap::new(&g, 1, 0),
            Err(CommsError::ZeroElements)
        ));
    }

    #[test]
    fn run_requires_commit_and_handlers() {
        let g = geom();
        let mut world = Communicator::world(1);
        let mut swap = HaloSwap::new(&g, 1, 1).unwrap();
        let mut data = vec![0.0; g.nsites()];

        assert_eq!(
            swap.run(&mut world[0], &mut data),
            Err(CommsError::NotCommitted)
        );

        swap.commit();
        assert_eq!(
            swap.run(&mut world[0], &mut data),
            Err(CommsError::HandlersMissing)
        );
    }

    #[test]
    fn handler_shape_checked_before_transport() {
        let g = geom();
        let mut world = Communicator::world(1);
        let mut swap = HaloSwap::new(&g, 1, 2).unwrap();
        swap.set_handlers(Box::new(HostHandlers::new(3)));
        swap.commit();
        let mut data = vec![0.0; g.nsites() * 2];
        assert_eq!(
            swap.run(&mut world[0], &mut data),
            Err(CommsError::HandlerShapeMismatch {
                engine: 2,
                handler: 3
            })
        );
    }

    #[test]
    fn field_size_checked() {
        let g = geom();
        let mut world = Communicator::world(1);
        let mut swap = HaloSwap::new(&g, 1, 1).unwrap();
        swap.set_handlers(Box::new(HostHandlers::new(1)));
        swap.commit();
        let mut data = vec![0.0; 7];
        assert!(matches!(
            swap.run(&mut world[0], &mut data),
            Err(CommsError::FieldSizeMismatch { .. })
        ));
    }

    #[test]
    fn commit_is_idempotent() {
        let g = geom();
        let mut swap = HaloSwap::new(&g, 1, 1).unwrap();
        swap.commit();
        let n_faces = swap.faces.len();
        swap.commit();
        assert_eq!(swap.faces.len(), n_faces);
    }

    #[test]
    fn flat_axes_are_skipped() {
        let g = LatticeGeometry::new([4, 4, 1], 2, CartComm::single()).unwrap();
        let mut swap = HaloSwap::new(&g, 2, 1).unwrap();
        swap.commit();
        assert_eq!(swap.faces.len(), 2);
        assert!(swap.faces.iter().all(|f| f.axis != 2));
    }

    #[test]
    fn depth_exceeding_extent_rejected() {
        // Four ranks on y leave one interior row each, too thin for depth 3.
        let cart = CartComm::new([1, 4, 1], couette_core::RankId(0)).unwrap();
        let g = LatticeGeometry::new([8, 4, 8], 3, cart).unwrap();
        assert!(matches!(
            HaloSwap::new(&g, 3, 1),
            Err(CommsError::DepthExceedsExtent {
                axis: 1,
                depth: 3,
                extent: 1
            })
        ));
    }

    #[test]
    fn host_handlers_round_trip() {
        let h = HostHandlers::new(2);
        let data = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let sites = vec![2, 0];
        let mut buf = vec![0.0; 4];
        h.pack(&sites, &data, &mut buf);
        assert_eq!(buf, vec![4.0, 5.0, 0.0, 1.0]);

        let mut out = vec![0.0; 6];
        h.unpack(&sites, &mut out, &buf);
        assert_eq!(out, vec![0.0, 1.0, 0.0, 0.0, 4.0, 5.0]);
    }
}
