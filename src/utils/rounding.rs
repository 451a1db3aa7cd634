/// Rounds half-up (toward positive infinity at exact .5), matching the
/// convention every stored rating was produced with.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to one decimal place, half-up.
pub fn round_one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Linear interpolation over ascending `(x, y)` breakpoints. Inputs outside
/// the table take the value of the nearest endpoint.
pub fn interpolate(points: &[(f64, f64)], x: f64) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0
    };

    if x <= first.0 {
        return first.1;
    }

    if x >= last.0 {
        return last.1;
    }

    for window in points.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if x <= x1 {
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }

    last.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_round_half_up_positive_tie() {
        assert_eq!(round_half_up(2.5), 3.0);
    }

    #[test]
    fn test_round_half_up_negative_tie() {
        // Rounds toward positive infinity, unlike f64::round
        assert_eq!(round_half_up(-2.5), -2.0);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_abs_diff_eq!(round_one_decimal(52.349), 52.3, epsilon = 1e-9);
        assert_abs_diff_eq!(round_one_decimal(52.36), 52.4, epsilon = 1e-9);
        assert_abs_diff_eq!(round_one_decimal(0.25), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let points = [(0.0, 0.0), (10.0, 100.0)];
        assert_abs_diff_eq!(interpolate(&points, 2.5), 25.0);
    }

    #[test]
    fn test_interpolate_clamps_to_endpoints() {
        let points = [(1.0, 100.0), (6.0, 0.0)];
        assert_eq!(interpolate(&points, -3.0), 100.0);
        assert_eq!(interpolate(&points, 12.0), 0.0);
    }

    #[test]
    fn test_interpolate_empty() {
        assert_eq!(interpolate(&[], 4.0), 0.0);
    }
}
