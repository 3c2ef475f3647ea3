//! Cyclic coordinate descent (CCD) inverse kinematics for planar joint chains.
//!
//! The crate solves purely in angle space: callers build a [`KinematicsChain`], hand a private
//! copy of it to a [`CcdSolver`] together with a target point and an optional
//! [`ConstraintValidator`], and poll the solver (directly or through an [`AsyncSolver`]) until it
//! reports a terminal [`Outcome`]. Rendering, physics and input handling live elsewhere.

#![forbid(unsafe_code)]

mod angle;
mod chain;
mod error;
mod model;
mod range;
mod runtime;
mod validate;

#[cfg(feature = "json")]
pub mod json;

pub use angle::*;
pub use chain::*;
pub use error::*;
pub use model::*;
pub use range::*;
pub use runtime::*;
pub use validate::*;


#[cfg(test)]
mod chain_tests;


#[cfg(all(test, feature = "json"))]
mod json_tests;
