//! Orbit and rotation models for bodies.
//!
//! The two important types in this module are:
//! - [Orbit], which gives the position and velocity of a body relative to the
//!   center of its orbit frame, in that frame's coordinates
//! - [RotationModel], which gives the orientation of a body relative to its
//!   body frame
//!
//! Both are closed enums over the built-in models. Positions and orientations
//! that come from outside the crate (ephemeris kernels, scripts) enter through
//! the [OrbitProvider] and [RotationProvider] traits.

pub mod external;
pub mod orbit;
pub mod rotation;
pub mod scripted;

pub use orbit::{Orbit, OrbitProvider, OrbitSample, OrbitSampleProc, SharedOrbit};
pub use rotation::{RotationModel, RotationProvider, SharedRotationModel};
