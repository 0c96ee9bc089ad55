//! Dense direct solvers for vortex-lattice influence systems
//!
//! The per-step aerodynamic influence matrix is dense, square, real-valued
//! and strongly diagonally dominated by panel self-induction, so a direct
//! LU solve with partial pivoting is both robust and cheap at panel counts
//! typical for lattice methods.
//!
//! # Features
//!
//! - **Direct Solvers**: LU decomposition (pure Rust, with an optional
//!   LAPACK-backed path behind the `ndarray-linalg` feature)
//!
//! # Example
//!
//! ```ignore
//! use aero_lattice_solvers::direct::lu_solve;
//!
//! let gamma = lu_solve(&influence_matrix, &normal_wash)?;
//! ```

pub mod direct;

// Re-export direct solvers
pub use direct::{lu_factorize, lu_solve, LuError, LuFactorization};
