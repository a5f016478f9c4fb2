//! Marginal likelihood of the observed calls given a paternity assignment.
//!
//! Mother and fathers are unobserved. The maternal genotype is summed over
//! under Hardy-Weinberg proportions; each father contributes a single allele
//! shared by all of his offspring, and each offspring inherits one of the two
//! maternal alleles with equal probability. Fathers are independent given the
//! maternal genotype, so the likelihood factorizes over families inside the
//! maternal sum.

use super::error_model::likelihood;
use super::{Allele, AllelePair, Dataset, ErrorRates, Genotype, Locus, Paternity, Result, SibshipError};
use crate::utils::ln_sum_exp;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Unordered maternal genotypes `(w, v)` with `w <= v`.
pub(crate) fn maternal_genotypes(num_alleles: usize) -> impl Iterator<Item = Genotype> {
    (0..num_alleles).flat_map(move |w| (w..num_alleles).map(move |v| AllelePair(w, v)))
}

/// Log of the Hardy-Weinberg prior times the probability of the mother's
/// call, for one maternal genotype.
fn maternal_log_prior(maternal: Genotype, locus: &Locus, rates: ErrorRates) -> f64 {
    let freqs = locus.frequencies();
    let AllelePair(w, v) = maternal;
    let multiplicity = if w == v { 1.0 } else { 2.0 };
    let mut log_weight = (multiplicity * freqs[w] * freqs[v]).ln();
    if let Some(call) = locus.mother {
        log_weight += likelihood(call, maternal, locus.num_alleles(), rates).ln();
    }
    log_weight
}

/// Log probability of the calls of one offspring given its mother's genotype
/// and its father's allele.
pub(crate) fn offspring_loglik(
    offspring: usize,
    maternal: Genotype,
    paternal: Allele,
    locus: &Locus,
    rates: ErrorRates,
) -> f64 {
    match locus.offspring[offspring] {
        Some(call) => {
            let k = locus.num_alleles();
            let from_first = likelihood(call, AllelePair(maternal.0, paternal), k, rates);
            let from_second = likelihood(call, AllelePair(maternal.1, paternal), k, rates);
            (0.5 * from_first + 0.5 * from_second).ln()
        }
        None => 0.0,
    }
}

/// Log of `f_u * P(family calls | maternal genotype, paternal allele u)`.
pub(crate) fn paternal_allele_log_weight(
    paternal: Allele,
    maternal: Genotype,
    family: &[usize],
    locus: &Locus,
    rates: ErrorRates,
) -> f64 {
    let prior = locus.frequencies()[paternal].ln();
    family.iter().fold(prior, |acc, &offspring| {
        acc + offspring_loglik(offspring, maternal, paternal, locus, rates)
    })
}

/// Log-likelihood of one family's calls given the maternal genotype,
/// marginal over the father's allele.
pub(crate) fn family_loglik(
    maternal: Genotype,
    family: &[usize],
    locus: &Locus,
    rates: ErrorRates,
) -> f64 {
    let terms: Vec<f64> = (0..locus.num_alleles())
        .map(|u| paternal_allele_log_weight(u, maternal, family, locus, rates))
        .collect();
    ln_sum_exp(&terms)
}

/// Unnormalized log posterior of one maternal genotype.
pub(crate) fn maternal_log_weight(
    maternal: Genotype,
    families: &[Vec<usize>],
    locus: &Locus,
    rates: ErrorRates,
) -> f64 {
    families
        .iter()
        .fold(maternal_log_prior(maternal, locus, rates), |acc, family| {
            acc + family_loglik(maternal, family, locus, rates)
        })
}

pub(crate) fn locus_loglik(families: &[Vec<usize>], locus: &Locus, rates: ErrorRates) -> f64 {
    let terms: Vec<f64> = maternal_genotypes(locus.num_alleles())
        .map(|maternal| maternal_log_weight(maternal, families, locus, rates))
        .collect();
    ln_sum_exp(&terms)
}

/// Multi-locus log-likelihood without input checks.
pub(crate) fn total_loglik(paternity: &Paternity, dataset: &Dataset, rates: &[ErrorRates]) -> f64 {
    let families = paternity.families();
    dataset
        .loci
        .iter()
        .zip(rates)
        .map(|(locus, &locus_rates)| locus_loglik(&families, locus, locus_rates))
        .sum()
}

/// Multi-locus log-likelihood with `offspring` moved to each label in
/// `0..num_candidates`, in label order. Runs on the current rayon pool.
pub(crate) fn candidate_logliks(
    paternity: &Paternity,
    offspring: usize,
    num_candidates: usize,
    dataset: &Dataset,
    rates: &[ErrorRates],
) -> Vec<f64> {
    (0..num_candidates)
        .into_par_iter()
        .map(|father| {
            let mut candidate = paternity.clone();
            candidate.assign(offspring, father);
            total_loglik(&candidate, dataset, rates)
        })
        .collect()
}

/// Log-likelihood of one locus' calls under `paternity`.
pub fn locus_log_likelihood(
    paternity: &Paternity,
    locus: &Locus,
    rates: ErrorRates,
) -> Result<f64> {
    if paternity.len() != locus.num_offspring() {
        return Err(SibshipError::input_shape(format!(
            "locus {} has phenotypes for {} offspring but paternity has {} entries",
            locus.id,
            locus.num_offspring(),
            paternity.len()
        )));
    }
    rates.validate()?;
    Ok(locus_loglik(&paternity.families(), locus, rates))
}

/// Log-likelihood of the whole dataset under `paternity`; loci are
/// conditionally independent given paternity.
pub fn log_likelihood(paternity: &Paternity, dataset: &Dataset, rates: &[ErrorRates]) -> Result<f64> {
    dataset.validate_inputs(paternity, rates)?;
    Ok(total_loglik(paternity, dataset, rates))
}
