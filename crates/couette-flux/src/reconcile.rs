//! Conservative east/west flux reconciliation across sliding planes.
//!
//! The order parameter either side of a plane lives in a sliding frame, so
//! the flux a cell computes at its east face and the flux its upstairs
//! neighbour computes at the matching west face disagree. Uniqueness is
//! restored by interpolating the far side's value at the displaced position
//! and averaging. Both code paths feed [`blend`] and [`average`] the same
//! way, so a decomposed run reproduces the single-rank result bit for bit.

use crate::buffers::FluxBuffers;
use couette_comms::{CommsError, Communicator, RecvBatch};
use couette_core::MessageTag;
use couette_lattice::{LatticeGeometry, Y, Z};
use couette_shear::{Displacement, PlaneRanks, PlaneRegistry};

/// Tags for the two partial-row transfers of one direction pair. Reused
/// across planes and directions; per-sender FIFO keeps rounds ordered.
const TAG_UPPER: MessageTag = MessageTag(1254);
const TAG_LOWER: MessageTag = MessageTag(1255);

/// Two-point interpolation at fractional displacement `fr`.
///
/// `fr == 0.0` puts all weight on `upper`, so zero displacement degenerates
/// to the undisplaced value with no special case.
#[inline]
fn blend(fr: f64, lower: f64, upper: f64) -> f64 {
    fr * lower + (1.0 - fr) * upper
}

/// The conservative average of the local and reconciled value.
#[inline]
fn average(local: f64, other: f64) -> f64 {
    0.5 * (local + other)
}

/// One direction's interpolation window in local row coordinates: the
/// window covers `rows_high` rows starting at `start`, then `rows_low`
/// rows from the next rank starting at its row 0.
struct Window {
    start: usize,
    rows_high: usize,
    rows_low: usize,
    ranks: PlaneRanks,
}

/// Reconciles east/west fluxes across every sliding plane.
pub struct FluxReconciler {
    geometry: LatticeGeometry,
    registry: PlaneRegistry,
}

impl FluxReconciler {
    /// Build a reconciler over `geometry` for the given plane set.
    pub fn new(geometry: &LatticeGeometry, registry: PlaneRegistry) -> Self {
        Self {
            geometry: geometry.clone(),
            registry,
        }
    }

    /// The plane registry this reconciler serves.
    pub fn registry(&self) -> &PlaneRegistry {
        &self.registry
    }

    /// Reconcile `flux.fe` / `flux.fw` across all local planes after
    /// `elapsed_steps` whole steps.
    ///
    /// Dispatches on the transverse decomposition: with a single rank on y
    /// the interpolation is direct; otherwise every plane's four receives
    /// and four sends are posted before a single wait, one blocking
    /// synchronisation per field per step.
    pub fn fix(
        &self,
        comm: &mut Communicator,
        flux: &mut FluxBuffers,
        elapsed_steps: u64,
    ) -> Result<(), CommsError> {
        if self.geometry.cart().size(Y) > 1 {
            self.fix_parallel(comm, flux, elapsed_steps)
        } else {
            self.fix_serial(flux, elapsed_steps);
            Ok(())
        }
    }

    /// Direct path: the whole transverse extent is local, so both
    /// interpolation buffers are filled straight from the flux arrays.
    /// Both buffers are built before either face is averaged; the
    /// downward-looking pass must read unreconciled east fluxes.
    fn fix_serial(&self, flux: &mut FluxBuffers, elapsed_steps: u64) {
        let ny = self.geometry.nlocal(Y);
        let nz = self.geometry.nlocal(Z);
        let nf = flux.elements_per_site();
        let mut buffer_w = vec![0.0; ny * nz * nf];
        let mut buffer_e = vec![0.0; ny * nz * nf];

        for (p, ic) in self.registry.local_planes() {
            let up = self.registry.displacement_up(p, elapsed_steps);
            self.interpolate_local(&flux.fw, ic + 1, up, nf, &mut buffer_w);
            let down = self.registry.displacement_down(p, elapsed_steps);
            self.interpolate_local(&flux.fe, ic, down, nf, &mut buffer_e);

            for jc in 0..ny {
                for kc in 0..nz {
                    for n in 0..nf {
                        let b = (jc * nz + kc) * nf + n;
                        let ie =
                            self.geometry.site(ic, jc as i32, kc as i32) * nf + n;
                        flux.fe[ie] = average(flux.fe[ie], buffer_w[b]);
                        let iw =
                            self.geometry.site(ic + 1, jc as i32, kc as i32) * nf + n;
                        flux.fw[iw] = average(flux.fw[iw], buffer_e[b]);
                    }
                }
            }
        }
    }

    /// Fill `out` with the displaced interpolation of `src` at column `x`,
    /// row by row over the interior.
    fn interpolate_local(
        &self,
        src: &[f64],
        x: i32,
        d: Displacement,
        nf: usize,
        out: &mut [f64],
    ) {
        let ny = self.geometry.nlocal(Y) as i64;
        let nz = self.geometry.nlocal(Z);
        for jc in 0..ny {
            let j1 = (jc - d.shift - 1).rem_euclid(ny) as i32;
            let j2 = ((j1 as i64 + 1) % ny) as i32;
            for kc in 0..nz {
                for n in 0..nf {
                    let a = src[self.geometry.site(x, j1, kc as i32) * nf + n];
                    let b = src[self.geometry.site(x, j2, kc as i32) * nf + n];
                    out[((jc as usize) * nz + kc) * nf + n] = blend(d.fraction, a, b);
                }
            }
        }
    }

    /// Communicating path. Per plane and direction, the interpolation
    /// window covers `nlocal_y + 1` consecutive global rows starting at
    /// the displaced position of this rank's first row; the window spans
    /// at most two ranks, giving two transfers each way. Rows travel with
    /// their z halo so the buffer layout matches the flux array stride.
    ///
    /// All receives and sends for all local planes are posted before the
    /// one wait; every send packs unreconciled data because writes start
    /// only after the wait. The plane order is the same on every rank, so
    /// per-sender FIFO keeps the shared tags unambiguous across planes.
    fn fix_parallel(
        &self,
        comm: &mut Communicator,
        flux: &mut FluxBuffers,
        elapsed_steps: u64,
    ) -> Result<(), CommsError> {
        let g = &self.geometry;
        let nf = flux.elements_per_site();
        let ny = g.nlocal(Y);
        let nz = g.nlocal(Z);
        let h = g.nhalo();
        let row = (nz + 2 * h) * nf;

        struct Round {
            ic: i32,
            up: Displacement,
            down: Displacement,
            win_w: Window,
            win_e: Window,
        }

        let mut rounds = Vec::new();
        let mut batch = RecvBatch::new();
        for (p, ic) in self.registry.local_planes() {
            let up = self.registry.displacement_up(p, elapsed_steps);
            let win_w = self.window(up);
            let down = self.registry.displacement_down(p, elapsed_steps);
            let win_e = self.window(down);

            batch.post(win_w.ranks.recv[0], TAG_UPPER);
            batch.post(win_w.ranks.recv[1], TAG_LOWER);
            batch.post(win_e.ranks.recv[0], TAG_UPPER);
            batch.post(win_e.ranks.recv[1], TAG_LOWER);

            rounds.push(Round {
                ic,
                up,
                down,
                win_w,
                win_e,
            });
        }

        for round in &rounds {
            self.send_rows(comm, &flux.fw, round.ic + 1, &round.win_w, nf, row)?;
            self.send_rows(comm, &flux.fe, round.ic, &round.win_e, nf, row)?;
        }

        let payloads = batch.wait_all(comm)?;

        for (q, round) in rounds.iter().enumerate() {
            let ic = round.ic;
            let buffer_w =
                Self::assemble(&round.win_w, row, &payloads[4 * q], &payloads[4 * q + 1])?;
            let buffer_e =
                Self::assemble(&round.win_e, row, &payloads[4 * q + 2], &payloads[4 * q + 3])?;

            // Local row jc interpolates between buffer rows jc and jc + 1.
            for jc in 0..ny {
                let lo = jc * row;
                let hi = (jc + 1) * row;
                for kc in 0..nz {
                    for n in 0..nf {
                        let off = (kc + h) * nf + n;
                        let ie = g.site(ic, jc as i32, kc as i32) * nf + n;
                        flux.fe[ie] = average(
                            flux.fe[ie],
                            blend(round.up.fraction, buffer_w[lo + off], buffer_w[hi + off]),
                        );
                        let iw = g.site(ic + 1, jc as i32, kc as i32) * nf + n;
                        flux.fw[iw] = average(
                            flux.fw[iw],
                            blend(round.down.fraction, buffer_e[lo + off], buffer_e[hi + off]),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Window geometry for one direction: the global row the window starts
    /// at, split into this-rank and next-rank parts.
    ///
    /// Uniform per-rank extents make the split identical on every rank, so
    /// the posted receive sizes match the sends.
    fn window(&self, d: Displacement) -> Window {
        let g = &self.geometry;
        let ny_global = g.ntotal(Y) as i64;
        let j1g = (g.noffset(Y) as i64 - d.shift - 1).rem_euclid(ny_global) as usize;
        let start = j1g % g.nlocal(Y);
        Window {
            start,
            rows_high: g.nlocal(Y) - start,
            rows_low: start + 1,
            ranks: self.registry.jstart_to_ranks(j1g),
        }
    }

    /// Send the two contiguous row runs of `src` at column `x`: rows
    /// `start..` to the first destination, rows `0..=start` to the second.
    fn send_rows(
        &self,
        comm: &Communicator,
        src: &[f64],
        x: i32,
        win: &Window,
        nf: usize,
        row: usize,
    ) -> Result<(), CommsError> {
        let h = self.geometry.nhalo() as i32;
        let upper = self.geometry.site(x, win.start as i32, -h) * nf;
        comm.send(
            win.ranks.send[0],
            TAG_UPPER,
            src[upper..upper + win.rows_high * row].to_vec(),
        )?;
        let lower = self.geometry.site(x, 0, -h) * nf;
        comm.send(
            win.ranks.send[1],
            TAG_LOWER,
            src[lower..lower + win.rows_low * row].to_vec(),
        )
    }

    /// Concatenate the two received row runs into one window buffer,
    /// checking the lengths agree with the posted window split.
    fn assemble(
        win: &Window,
        row: usize,
        upper: &[f64],
        lower: &[f64],
    ) -> Result<Vec<f64>, CommsError> {
        if upper.len() != win.rows_high * row {
            return Err(CommsError::PayloadSizeMismatch {
                source: win.ranks.recv[0],
                expected: win.rows_high * row,
                got: upper.len(),
            });
        }
        if lower.len() != win.rows_low * row {
            return Err(CommsError::PayloadSizeMismatch {
                source: win.ranks.recv[1],
                expected: win.rows_low * row,
                got: lower.len(),
            });
        }
        let mut buffer = Vec::with_capacity(upper.len() + lower.len());
        buffer.extend_from_slice(upper);
        buffer.extend_from_slice(lower);
        Ok(buffer)
    }
}
