use rand::distr::{weighted::WeightedIndex, Distribution};
use rand::Rng;

/// Log of a sum of exponentials, shifted by the largest term.
///
/// Returns negative infinity for an empty slice or when every term is
/// negative infinity.
pub fn ln_sum_exp(terms: &[f64]) -> f64 {
    let max_term = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_term == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max_term + terms.iter().map(|t| (t - max_term).exp()).sum::<f64>().ln()
}

/// Draws one index with probability proportional to `weights`.
///
/// Returns `None` when the weights carry no mass (all zero, negative or
/// non-finite), leaving the caller to decide how to report it.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let dist = WeightedIndex::new(weights).ok()?;
    Some(dist.sample(rng))
}

/// Same as [`sample_index`] for weights given on the log scale.
pub fn sample_log_index<R: Rng + ?Sized>(log_weights: &[f64], rng: &mut R) -> Option<usize> {
    let max_term = log_weights
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_term.is_finite() {
        return None;
    }
    let weights: Vec<f64> = log_weights.iter().map(|w| (w - max_term).exp()).collect();
    sample_index(&weights, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_ln_sum_exp_matches_direct_sum() {
        let terms = [0.1_f64.ln(), 0.2_f64.ln(), 0.3_f64.ln()];
        assert_relative_eq!(ln_sum_exp(&terms), 0.6_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_ln_sum_exp_survives_underflow() {
        let terms = [-2000.0, -2000.0];
        assert_relative_eq!(ln_sum_exp(&terms), -2000.0 + 2.0_f64.ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_ln_sum_exp_all_negative_infinity() {
        assert_eq!(ln_sum_exp(&[f64::NEG_INFINITY; 3]), f64::NEG_INFINITY);
        assert_eq!(ln_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_sample_index_single_mass() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(sample_index(&[0.0, 3.0, 0.0], &mut rng), Some(1));
        }
    }

    #[test]
    fn test_sample_index_zero_mass() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(sample_index(&[0.0, 0.0], &mut rng), None);
        assert_eq!(sample_index(&[], &mut rng), None);
    }

    #[test]
    fn test_sample_log_index_frequencies() {
        let mut rng = StdRng::seed_from_u64(7);
        let log_weights = [-1000.0 + 0.25_f64.ln(), -1000.0 + 0.75_f64.ln()];
        let draws = 20_000;
        let ones = (0..draws)
            .filter(|_| sample_log_index(&log_weights, &mut rng) == Some(1))
            .count();
        assert_relative_eq!(ones as f64 / draws as f64, 0.75, epsilon = 0.02);
    }

    #[test]
    fn test_sample_log_index_degenerate() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            sample_log_index(&[f64::NEG_INFINITY, f64::NEG_INFINITY], &mut rng),
            None
        );
    }
}
