/// Default tolerance for floating-point comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Assert that two floating-point numbers are approximately equal
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
  assert!(
    (actual - expected).abs() < tolerance,
    "Values not approximately equal:\n  actual:   {}\n  expected: {}\n  diff:     {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs(),
    tolerance
  );
}

/// Assert that two accumulated percentage returns are approximately equal
pub fn assert_percentage_eq(actual: f64, expected: f64) {
  // Compounded products drift more than single ratios
  assert_approx_eq(actual, expected, 1e-8);
}

/// Assert that an optional value is present and approximately equal
pub fn assert_some_approx_eq(actual: Option<f64>, expected: f64) {
  match actual {
    Some(value) => assert_approx_eq(value, expected, DEFAULT_TOLERANCE),
    None => panic!("Expected Some({}), got None", expected),
  }
}
