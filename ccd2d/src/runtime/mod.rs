mod async_solver;
mod ccd;
mod solver;

pub use async_solver::*;
pub use ccd::*;
pub use solver::*;
