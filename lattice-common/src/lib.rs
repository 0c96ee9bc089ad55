//! Common types and utilities for the aero-lattice solver crates
//!
//! This crate provides the small shared vocabulary used across the
//! vortex-lattice workspace:
//!
//! - Cartesian 3-vector type with the usual products and norms
//! - Linear and cosine panel-station distributions

mod spacing;
mod vector;

pub use spacing::*;
pub use vector::*;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
