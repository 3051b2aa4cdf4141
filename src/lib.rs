//! An event-driven sub-timestep advancer for point-mass particles moving
//! under Coulomb friction across one or more simultaneous collision-plane
//! manifolds.
//!
//! The crate is deliberately narrow: it owns the geometry, the event
//! detection and root-finding, the friction-cone contact resolution, and the
//! sub-timestep loop that ties them together for a single particle over a
//! single outer timestep. Assembling a [`World`], driving an outer
//! phase/timestep loop across many particles, optimizing a controller
//! against it, and recording results are all left to the caller.
mod advance;
mod contact;
mod error;
mod event;
mod geometry;
mod rootfinder;
mod vector;
mod world;

pub use advance::advance;
pub use error::GeometryError;
pub use event::Event;
pub use geometry::{Boundary, CollisionPlane};
pub use rootfinder::Integrator;
pub use vector::{Dimension, Vector};
pub use world::{ForceSource, Particle, PhaseSchedule, Tolerances, World};
