//! Solver backends
//!
//! - MILP: `good_lp` with the engine selected by cargo features

pub mod milp;

pub use milp::*;
