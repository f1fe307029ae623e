//! External (single-particle) potentials.

pub mod gravity;
pub mod harmonic;

pub use gravity::Gravity;
pub use harmonic::Harmonic;
