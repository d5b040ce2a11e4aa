//! Assertion helpers shared across test modules.

/// Asserts elementwise relative equality of two f64 slices, naming the offending
/// index on failure. Exactly equal elements pass regardless of `epsilon`.
pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "slice lengths differ: expected {expected:?}, actual {actual:?}"
    );
    for (index, (&expected, &actual)) in expected.iter().zip(actual).enumerate() {
        if actual == expected {
            continue;
        }
        let tolerance = f64::max(epsilon * expected.abs(), f64::EPSILON);
        assert!(
            (actual - expected).abs() <= tolerance,
            "element {index}: {actual} differs from expected {expected} by more than {tolerance}"
        );
    }
}
