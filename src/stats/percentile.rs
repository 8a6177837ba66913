//! Linear-interpolation percentiles (§4.5 step 6)
//!
//! `percentile(p) = linear_interp(sorted, p·(n−1))`: if the index is
//! integral, return the value; else interpolate between the two
//! surrounding samples.

/// `sorted` must already be sorted ascending. `p` is a fraction in
/// `[0, 1]`. Returns `0.0` for an empty slice rather than dividing by zero.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let index = p * (n - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = index - lower as f64;
    sorted[lower] * (1.0 - frac) + sorted[upper] * frac
}

use super::Percentiles;

pub fn compute_percentiles(sorted: &[f64]) -> Percentiles {
    Percentiles {
        p25: percentile(sorted, 0.25),
        p50: percentile(sorted, 0.50),
        p75: percentile(sorted, 0.75),
        p90: percentile(sorted, 0.90),
        p95: percentile(sorted, 0.95),
        p99: percentile(sorted, 0.99),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_yields_zero() {
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn single_element_equals_that_element_for_every_quantile() {
        for p in [0.25, 0.5, 0.75, 0.9, 0.95, 0.99] {
            assert_eq!(percentile(&[42.0], p), 42.0);
        }
    }

    #[test]
    fn percentiles_are_monotone_non_decreasing() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let p = compute_percentiles(&sorted);
        assert!(p.p25 <= p.p50);
        assert!(p.p50 <= p.p75);
        assert!(p.p75 <= p.p90);
        assert!(p.p90 <= p.p95);
        assert!(p.p95 <= p.p99);
    }

    #[test]
    fn interpolates_between_surrounding_samples() {
        let sorted = vec![10.0, 20.0, 30.0, 40.0];
        // index = 0.5 * 3 = 1.5 -> between sorted[1] and sorted[2]
        assert_eq!(percentile(&sorted, 0.5), 25.0);
    }
}
