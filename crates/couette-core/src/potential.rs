//! The [`ChemicalPotential`] collaborator trait.
//!
//! The free-energy machinery lives outside this core; the diffusive flux
//! kernel only needs a chemical potential evaluated at a site. Whatever
//! implements this trait (a full free-energy functional, or a mock in tests)
//! is responsible for having valid values on the halo envelope sites the
//! two-point stencil reaches.

/// Chemical potential evaluated at the canonical linear site index.
pub trait ChemicalPotential {
    /// Potential for field element `n` at `index`.
    fn chemical_potential(&self, index: usize, n: usize) -> f64;
}

/// Blanket impl so `&T` collaborators can be passed straight through.
impl<T: ChemicalPotential + ?Sized> ChemicalPotential for &T {
    fn chemical_potential(&self, index: usize, n: usize) -> f64 {
        (**self).chemical_potential(index, n)
    }
}
