//! Direct solvers for linear systems
//!
//! This module provides direct (non-iterative) solvers:
//! - [`lu_solve`]: LU decomposition with partial pivoting

mod lu;

pub use lu::{lu_factorize, lu_solve, LuError, LuFactorization};
