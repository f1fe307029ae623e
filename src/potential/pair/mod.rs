//! Pairwise interactions.

pub mod coulomb;
pub mod lennard_jones;
pub mod polar_align;
pub mod soft;

pub use coulomb::Coulomb;
pub use lennard_jones::LennardJones;
pub use polar_align::PolarAlign;
pub use soft::Soft;
