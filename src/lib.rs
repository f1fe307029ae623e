//! surface-swarm library
//!
//! A particle-based dynamics engine for active matter on curved
//! two-dimensional manifolds. Self-propelled particles are advanced under
//! pairwise and external forces by a Brownian integrator, while a manifold
//! constraint keeps positions on the surface and directors in the local
//! tangent plane. Exposed as a library to enable integration testing.

pub mod cli;
pub mod config;
pub mod constraint;
pub mod error;
pub mod integrator;
pub mod math;
pub mod neighbor_list;
pub mod particle;
pub mod population;
pub mod potential;
pub mod prelude;
pub mod rng;
pub mod sim_box;
pub mod simulation;
pub mod system;
