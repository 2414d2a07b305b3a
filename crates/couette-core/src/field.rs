//! The [`FieldAccess`] collaborator trait and dense [`ScalarField`] storage.
//!
//! Physics kernels (free energy, collision, the update step) see lattice
//! data only through [`FieldAccess`]: a scalar or fixed-size tensor value
//! addressed by the canonical linear site index. The halo-swap engine works
//! on the raw `&mut [f64]` slice instead, so the same storage serves both.

/// Per-site scalar/tensor accessor keyed by the canonical linear site index.
///
/// Valid for both interior and halo sites; callers are expected to hold an
/// index produced by the one canonical geometry mapping.
pub trait FieldAccess {
    /// Number of elements stored per lattice site (1 for a scalar field).
    fn elements_per_site(&self) -> usize;

    /// Read element `n` at `index`.
    fn value(&self, index: usize, n: usize) -> f64;

    /// Write element `n` at `index`.
    fn set_value(&mut self, index: usize, n: usize, value: f64);

    /// Read the scalar value at `index` (element 0).
    fn scalar(&self, index: usize) -> f64 {
        self.value(index, 0)
    }

    /// Write the scalar value at `index` (element 0).
    fn set_scalar(&mut self, index: usize, value: f64) {
        self.set_value(index, 0, value);
    }
}

/// Dense per-site field storage: `elements` values per lattice site.
///
/// The backing vector is laid out site-major (`site * elements + n`), the
/// layout the pack/unpack handlers and flux kernels assume.
#[derive(Clone, Debug)]
pub struct ScalarField {
    elements: usize,
    data: Vec<f64>,
}

impl ScalarField {
    /// Allocate a zeroed field over `nsites` sites with `elements` values each.
    ///
    /// # Panics
    ///
    /// Panics if `elements` is zero.
    pub fn new(nsites: usize, elements: usize) -> Self {
        assert!(elements > 0, "field must carry at least one element per site");
        Self {
            elements,
            data: vec![0.0; nsites * elements],
        }
    }

    /// Number of lattice sites covered by this field.
    pub fn nsites(&self) -> usize {
        self.data.len() / self.elements
    }

    /// Raw site-major storage, for the halo-swap engine.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw storage, for the halo-swap engine.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl FieldAccess for ScalarField {
    fn elements_per_site(&self) -> usize {
        self.elements
    }

    fn value(&self, index: usize, n: usize) -> f64 {
        self.data[index * self.elements + n]
    }

    fn set_value(&mut self, index: usize, n: usize, value: f64) {
        self.data[index * self.elements + n] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip() {
        let mut f = ScalarField::new(10, 1);
        f.set_scalar(3, 2.5);
        assert_eq!(f.scalar(3), 2.5);
        assert_eq!(f.scalar(4), 0.0);
        assert_eq!(f.nsites(), 10);
    }

    #[test]
    fn tensor_layout_is_site_major() {
        let mut f = ScalarField::new(4, 3);
        f.set_value(1, 2, 7.0);
        assert_eq!(f.data()[1 * 3 + 2], 7.0);
        assert_eq!(f.value(1, 2), 7.0);
        assert_eq!(f.elements_per_site(), 3);
    }

    #[test]
    #[should_panic(expected = "at least one element")]
    fn zero_elements_rejected() {
        let _ = ScalarField::new(4, 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Writes land where reads find them, and nowhere else.
            #[test]
            fn writes_are_isolated(
                nsites in 1usize..64,
                elements in 1usize..4,
                value in -1e6f64..1e6,
            ) {
                let site = nsites / 2;
                let n = elements - 1;
                let mut f = ScalarField::new(nsites, elements);
                f.set_value(site, n, value);
                prop_assert_eq!(f.value(site, n), value);
                let touched = f.data().iter().filter(|&&v| v != 0.0).count();
                prop_assert!(touched <= 1);
            }
        }
    }
}
