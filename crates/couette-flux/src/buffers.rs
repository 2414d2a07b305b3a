//! Step-scoped face-flux storage.

use couette_lattice::LatticeGeometry;

/// The four face-flux arrays for one step.
///
/// Each array is dense over the full allocated envelope (halo included),
/// site-major with `elements` values per site. `fe` and `fw` are the
/// east (x-high) and west (x-low) faces, kept separately because the
/// sliding planes break their equality; `fy` and `fz` hold the y-high and
/// z-high faces, with the low faces read from the neighbouring site's
/// entry. Produced fresh each step and consumed once by the update.
#[derive(Clone, Debug)]
pub struct FluxBuffers {
    /// East (x-high) face flux.
    pub fe: Vec<f64>,
    /// West (x-low) face flux.
    pub fw: Vec<f64>,
    /// y-high face flux; the y-low face is the `y - 1` site's entry.
    pub fy: Vec<f64>,
    /// z-high face flux; the z-low face is the `z - 1` site's entry.
    pub fz: Vec<f64>,
    elements: usize,
}

impl FluxBuffers {
    /// Allocate zeroed flux arrays for a field with `elements` values per
    /// site over `geometry`.
    ///
    /// # Panics
    ///
    /// Panics if `elements` is zero.
    pub fn new(geometry: &LatticeGeometry, elements: usize) -> Self {
        assert!(elements > 0, "flux must carry at least one element per site");
        let n = geometry.nsites() * elements;
        Self {
            fe: vec![0.0; n],
            fw: vec![0.0; n],
            fy: vec![0.0; n],
            fz: vec![0.0; n],
            elements,
        }
    }

    /// Elements per site.
    pub fn elements_per_site(&self) -> usize {
        self.elements
    }

    /// Zero all four arrays for reuse on the next step.
    pub fn reset(&mut self) {
        self.fe.fill(0.0);
        self.fw.fill(0.0);
        self.fy.fill(0.0);
        self.fz.fill(0.0);
    }
}
