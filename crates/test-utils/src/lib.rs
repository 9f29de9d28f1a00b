//! Shared test utilities for the field visualization workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Field generators with predictable patterns
//! - Dataset fixtures (the hourly reanalysis sample and small variants)
//! - Approximate equality macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that two RGB channel triples differ by at most `tolerance` per channel.
///
/// ```ignore
/// use test_utils::assert_rgb_near;
///
/// assert_rgb_near!((127, 128, 127), (125, 127, 129), 3);
/// ```
#[macro_export]
macro_rules! assert_rgb_near {
    (($r1:expr, $g1:expr, $b1:expr), ($r2:expr, $g2:expr, $b2:expr), $tolerance:expr) => {{
        let actual = [$r1 as i32, $g1 as i32, $b1 as i32];
        let expected = [$r2 as i32, $g2 as i32, $b2 as i32];
        for (channel, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            if (a - e).abs() > $tolerance as i32 {
                panic!(
                    "assertion failed: channel {} differs: actual {:?}, expected {:?}, tolerance {}",
                    channel, actual, expected, $tolerance
                );
            }
        }
    }};
}

/// Create a temporary directory for test output, removed on drop.
pub fn temp_output_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("field-viz-test")
        .tempdir()
        .expect("failed to create temp dir")
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_rgb_near_passes() {
        assert_rgb_near!((127, 128, 127), (125, 127, 129), 3);
    }

    #[test]
    #[should_panic(expected = "channel 2 differs")]
    fn test_assert_rgb_near_fails() {
        assert_rgb_near!((0, 0, 0), (0, 0, 10), 3);
    }
}
