use std::f64::consts::E;

/// Logistic sigmoid: 1 / (1 + e^-x).
///
/// Saturates to exactly 0.0 or 1.0 once |x| is large enough that the
/// exponential over- or underflows.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

/// d/dx sigmoid(x) = sigmoid(x) · (1 - sigmoid(x))
pub fn sigmoid_derivative(x: f64) -> f64 {
    let fx = sigmoid(x);
    fx * (1.0 - fx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn known_values() {
        assert_abs_diff_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(sigmoid(2.0), 0.880_797_077_977_882_3, epsilon = 1e-12);
        assert_abs_diff_eq!(sigmoid(-2.0), 0.119_202_922_022_117_7, epsilon = 1e-12);
        assert_abs_diff_eq!(sigmoid_derivative(0.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn saturates_without_nan() {
        assert_eq!(sigmoid(1e6), 1.0);
        assert_eq!(sigmoid(-1e6), 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn stays_inside_open_unit_interval(x in -30.0f64..30.0) {
            let y = sigmoid(x);
            prop_assert!(y > 0.0 && y < 1.0, "sigmoid({}) = {}", x, y);
        }

        #[test]
        fn is_monotone(a in -20.0f64..20.0, d in 0.01f64..5.0) {
            prop_assert!(sigmoid(a) < sigmoid(a + d));
        }

        #[test]
        fn is_symmetric(x in -30.0f64..30.0) {
            prop_assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
        }
    }
}
