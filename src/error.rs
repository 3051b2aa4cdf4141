//! Construction-time validation errors.
//!
//! These are the one category of failure in this crate that is *not* a core
//! runtime invariant (those fail fast via `assert!`/`debug_assert!`, mirroring
//! the source engine's own `.expect()`-at-the-call-site idiom). Malformed
//! geometry is a world-assembly mistake, made once outside the hot per-timestep
//! path, so it is reported back to the (out-of-scope) world-assembly
//! collaborator as an ordinary `Result`.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("plane normal {normal:?} has length {length}, expected 1.0 within forceEpsilon {epsilon}")]
    NormalNotUnit {
        normal: crate::Vector,
        length: f64,
        epsilon: f64,
    },
    #[error("coefficient of friction {mu} is negative")]
    NegativeFriction { mu: f64 },
    #[error("boundary direction {direction:?} has length {length}, expected 1.0 within forceEpsilon {epsilon}")]
    DirectionNotUnit {
        direction: crate::Vector,
        length: f64,
        epsilon: f64,
    },
    #[error("boundary direction {direction:?} is not in-plane: dot with plane normal is {dot}, expected within forceEpsilon {epsilon} of 0.0")]
    DirectionNotInPlane {
        direction: crate::Vector,
        dot: f64,
        epsilon: f64,
    },
}
