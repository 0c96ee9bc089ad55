//! Station distributions used when subdividing chords and spans into panels

use std::f64::consts::PI;

/// Generate `num` linearly spaced fractions covering [0, 1]
pub fn lin_fractions(num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![0.0];
    }
    (0..num).map(|i| i as f64 / (num - 1) as f64).collect()
}

/// Generate `num` cosine-clustered fractions covering [0, 1]
///
/// Stations follow `0.5 * (1 - cos(i*pi/(num-1)))`, clustering points near
/// both ends of the interval. Used to refine panels near leading and
/// trailing edges (chordwise) or wing tips (spanwise) where gradients of
/// the solution are largest.
pub fn cosine_fractions(num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![0.0];
    }
    (0..num)
        .map(|i| 0.5 * (1.0 - (i as f64 * PI / (num - 1) as f64).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lin_fractions() {
        let f = lin_fractions(5);
        assert_eq!(f.len(), 5);
        assert_relative_eq!(f[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(f[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(f[4], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cosine_fractions_cluster_at_ends() {
        let f = cosine_fractions(9);
        assert_eq!(f.len(), 9);
        assert_relative_eq!(f[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(f[4], 0.5, epsilon = 1e-12);
        assert_relative_eq!(f[8], 1.0, epsilon = 1e-12);
        // First interval must be tighter than the middle one
        assert!(f[1] - f[0] < f[5] - f[4]);
    }

    #[test]
    fn test_fractions_monotonic() {
        for f in [lin_fractions(17), cosine_fractions(17)] {
            for w in f.windows(2) {
                assert!(w[1] > w[0]);
            }
        }
    }
}
