//! Posterior sampling of paternity under a Chinese restaurant process prior.
//!
//! Each offspring in turn is removed from its family and reassigned among the
//! remaining families and one empty family (Neal's algorithm 8 with a single
//! auxiliary cluster). An offspring that was alone keeps its emptied family
//! as the empty candidate. Candidates are scored with the full multi-locus
//! likelihood; error rates stay fixed.

use super::error_rates::RateChain;
use super::likelihood::candidate_logliks;
use super::{Dataset, ErrorRates, Paternity, Result, SibshipError};
use crate::utils::sample_log_index;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub iterations: usize,
    /// CRP concentration; larger values favour more fathers
    pub concentration: f64,
}

impl Default for SamplerParams {
    fn default() -> Self {
        SamplerParams {
            iterations: 1000,
            concentration: 1.0,
        }
    }
}

impl SamplerParams {
    fn validate(&self) -> Result<()> {
        if !(self.concentration > 0.0 && self.concentration.is_finite()) {
            return Err(SibshipError::invalid_parameter(format!(
                "concentration must be positive, got {}",
                self.concentration
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaternityChain {
    /// Compacted assignment after each iteration
    pub paternity: Vec<Paternity>,
    pub rates: RateChain,
    /// `-2` times the log weight of the last draw of each iteration
    pub deviance: Vec<f64>,
}

/// Log CRP prior weights of the candidates for one offspring, including the
/// `n - 1 + alpha` normalizer.
fn log_prior_weights(
    sizes: &[usize],
    num_candidates: usize,
    num_offspring: usize,
    alpha: f64,
) -> Vec<f64> {
    let normalizer = (num_offspring as f64 - 1.0 + alpha).ln();
    (0..num_candidates)
        .map(|father| match sizes[father] {
            0 => alpha.ln() - normalizer,
            size => (size as f64).ln() - normalizer,
        })
        .collect()
}

/// Redraws the father of every offspring once; returns the deviance of the
/// last draw.
fn sweep<R: Rng + ?Sized>(
    paternity: &mut Paternity,
    dataset: &Dataset,
    rates: &[ErrorRates],
    alpha: f64,
    rng: &mut R,
) -> Result<f64> {
    let num_offspring = paternity.len();
    let mut deviance = 0.0;
    for offspring in 0..num_offspring {
        let num_fathers = paternity.num_fathers();
        let mut sizes = paternity.family_sizes();
        sizes.push(0);
        let current = paternity.father_of(offspring);
        let is_singleton = sizes[current] == 1;
        sizes[current] -= 1;

        let num_candidates = if is_singleton { num_fathers } else { num_fathers + 1 };
        let logliks = candidate_logliks(paternity, offspring, num_candidates, dataset, rates);
        let weights: Vec<f64> = logliks
            .iter()
            .zip(log_prior_weights(&sizes, num_candidates, num_offspring, alpha))
            .map(|(loglik, prior)| loglik + prior)
            .collect();

        let father = sample_log_index(&weights, rng).ok_or_else(|| {
            SibshipError::numeric_degeneracy(format!(
                "every candidate father of offspring {} has zero probability",
                offspring + 1
            ))
        })?;
        paternity.assign(offspring, father);
        paternity.compact();
        deviance = -2.0 * weights[father];
    }
    Ok(deviance)
}

/// Draws `params.iterations` paternity samples starting from `initial`.
pub fn sample_paternity<R: Rng + ?Sized>(
    initial: &Paternity,
    dataset: &Dataset,
    rates: &[ErrorRates],
    params: SamplerParams,
    rng: &mut R,
) -> Result<PaternityChain> {
    dataset.validate_inputs(initial, rates)?;
    params.validate()?;

    let mut paternity = initial.clone();
    paternity.compact();
    let mut chain = PaternityChain {
        paternity: Vec::with_capacity(params.iterations),
        rates: RateChain::with_capacity(dataset.num_loci(), params.iterations),
        deviance: Vec::with_capacity(params.iterations),
    };
    for iteration in 0..params.iterations {
        let deviance = sweep(&mut paternity, dataset, rates, params.concentration, rng)?;
        chain.paternity.push(paternity.clone());
        chain.rates.push(rates);
        chain.deviance.push(deviance);
        if iteration % 100 == 0 {
            log::info!(
                "Paternity sampler: [{}] deviance: {:.4}, fathers: {}",
                iteration,
                deviance,
                paternity.num_fathers()
            );
        }
    }
    Ok(chain)
}
