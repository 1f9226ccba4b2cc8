//! Solver backends
//!
//! - `GoodLpSolver`: good_lp with the pure-Rust minilp simplex (feature `optimization`)

#[cfg(feature = "optimization")]
pub mod lp_backend;

#[cfg(feature = "optimization")]
pub use lp_backend::*;
