//! Maximum-likelihood paternity by coordinate ascent.
//!
//! Each sweep visits the offspring in order and moves each one to whichever
//! existing family, or a new one, maximizes the multi-locus likelihood.
//! Sweeps repeat until the likelihood stops improving.

use super::likelihood::{candidate_logliks, total_loglik};
use super::{Dataset, ErrorRates, Paternity, Result, SibshipError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeParams {
    pub max_sweeps: usize,
    pub tolerance: f64,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        OptimizeParams {
            max_sweeps: 1000,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub paternity: Paternity,
    pub log_likelihood: f64,
    /// Index of the last sweep run
    pub sweeps: usize,
    pub converged: bool,
    /// Log-likelihood after each sweep
    pub trace: Vec<f64>,
}

/// Index of the largest value, keeping the first among ties.
fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (index, value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((index, value)),
        })
}

pub fn optimize_paternity(
    initial: &Paternity,
    dataset: &Dataset,
    rates: &[ErrorRates],
    params: OptimizeParams,
) -> Result<OptimizeResult> {
    dataset.validate_inputs(initial, rates)?;
    if !(params.tolerance >= 0.0) {
        return Err(SibshipError::invalid_parameter(format!(
            "tolerance must be non-negative, got {}",
            params.tolerance
        )));
    }

    let mut paternity = initial.clone();
    let mut current = f64::NEG_INFINITY;
    let mut trace = Vec::new();
    let mut sweep = 0;
    while sweep <= params.max_sweeps {
        paternity.compact();
        let previous = current;
        current = total_loglik(&paternity, dataset, rates);
        for offspring in 0..paternity.len() {
            let num_candidates = paternity.num_fathers() + 1;
            let logliks = candidate_logliks(&paternity, offspring, num_candidates, dataset, rates);
            let (father, best) = argmax(&logliks).ok_or_else(|| {
                SibshipError::numeric_degeneracy(format!(
                    "no candidate father for offspring {}",
                    offspring + 1
                ))
            })?;
            paternity.assign(offspring, father);
            paternity.compact();
            current = best;
        }
        trace.push(current);
        log::info!(
            "Sweep [{}] loglik: {:.6}, delta: {:.3e}",
            sweep,
            current,
            current - previous
        );
        if current - previous < params.tolerance {
            break;
        }
        sweep += 1;
    }
    let sweeps = sweep.min(params.max_sweeps);

    Ok(OptimizeResult {
        paternity,
        log_likelihood: current,
        sweeps,
        converged: sweep < params.max_sweeps,
        trace,
    })
}
