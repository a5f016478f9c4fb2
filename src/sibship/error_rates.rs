use super::latent::sample_locus_rates;
use super::{Dataset, ErrorRates, Paternity, Result};
use rand::Rng;

/// Per-locus traces of a rate chain, `values[locus][iteration]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateChain {
    pub dropout: Vec<Vec<f64>>,
    pub mistyping: Vec<Vec<f64>>,
}

impl RateChain {
    pub fn with_capacity(num_loci: usize, iterations: usize) -> Self {
        RateChain {
            dropout: vec![Vec::with_capacity(iterations); num_loci],
            mistyping: vec![Vec::with_capacity(iterations); num_loci],
        }
    }

    pub fn push(&mut self, rates: &[ErrorRates]) {
        for (locus, r) in rates.iter().enumerate() {
            self.dropout[locus].push(r.dropout);
            self.mistyping[locus].push(r.mistyping);
        }
    }

    pub fn num_iterations(&self) -> usize {
        self.dropout.first().map_or(0, Vec::len)
    }

    /// Rates of every locus at one iteration.
    pub fn at(&self, iteration: usize) -> Vec<ErrorRates> {
        self.dropout
            .iter()
            .zip(&self.mistyping)
            .map(|(d, m)| ErrorRates {
                dropout: d[iteration],
                mistyping: m[iteration],
            })
            .collect()
    }
}

/// Gibbs sampler for the error rates of every locus with paternity held
/// fixed. `rates` holds the starting values and is left at the last draw.
pub fn sample_error_rates<R: Rng + ?Sized>(
    paternity: &Paternity,
    dataset: &Dataset,
    rates: &mut [ErrorRates],
    iterations: usize,
    rng: &mut R,
) -> Result<RateChain> {
    dataset.validate_inputs(paternity, rates)?;
    let families = paternity.families();
    let mut chain = RateChain::with_capacity(dataset.num_loci(), iterations);

    for iteration in 0..iterations {
        if iteration % 100 == 0 {
            log::info!("Error rate sampler: [{}]", iteration);
        }
        for (locus, locus_rates) in dataset.loci.iter().zip(rates.iter_mut()) {
            *locus_rates = sample_locus_rates(&families, locus, *locus_rates, rng)?;
        }
        chain.push(rates);
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sibship::{AllelePair, Locus, SibshipError};
    use rand::{rngs::StdRng, SeedableRng};

    fn dataset() -> Dataset {
        let call = |a, b| Some(AllelePair(a, b));
        let l1 = Locus::new("L1", &[0.5, 0.3, 0.2], call(0, 1), vec![call(0, 2), call(1, 2)]).unwrap();
        let l2 = Locus::new("L2", &[0.25; 4], None, vec![call(3, 3), None]).unwrap();
        Dataset::new(vec![l1, l2]).unwrap()
    }

    #[test]
    fn test_chain_shape_and_range() {
        let dataset = dataset();
        let mut rates = vec![ErrorRates::new(0.05, 0.05).unwrap(); 2];
        let mut rng = StdRng::seed_from_u64(42);
        let chain =
            sample_error_rates(&Paternity::single_father(2), &dataset, &mut rates, 50, &mut rng)
                .unwrap();
        assert_eq!(chain.dropout.len(), 2);
        assert_eq!(chain.mistyping.len(), 2);
        assert_eq!(chain.num_iterations(), 50);
        for locus in 0..2 {
            assert!(chain.dropout[locus].iter().all(|&d| d > 0.0 && d < 0.5));
            assert!(chain.mistyping[locus].iter().all(|&m| m > 0.0 && m < 1.0));
        }
        assert_eq!(chain.at(49), rates);
    }

    #[test]
    fn test_zero_iterations() {
        let dataset = dataset();
        let mut rates = vec![ErrorRates::new(0.05, 0.05).unwrap(); 2];
        let start = rates.clone();
        let mut rng = StdRng::seed_from_u64(42);
        let chain =
            sample_error_rates(&Paternity::singletons(2), &dataset, &mut rates, 0, &mut rng).unwrap();
        assert_eq!(chain.num_iterations(), 0);
        assert_eq!(rates, start);
    }

    #[test]
    fn test_rejects_rate_count_mismatch() {
        let dataset = dataset();
        let mut rates = vec![ErrorRates::new(0.05, 0.05).unwrap()];
        let mut rng = StdRng::seed_from_u64(42);
        assert!(matches!(
            sample_error_rates(&Paternity::singletons(2), &dataset, &mut rates, 10, &mut rng),
            Err(SibshipError::InputShape { .. })
        ));
    }
}
