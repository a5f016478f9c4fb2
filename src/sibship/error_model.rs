//! Genotyping error model with allele dropout and mistyping.
//!
//! A call is scored against a true genotype by first classifying the pair
//! into one of seven allele-sharing cases ([`ErrorCase`]); the probability of
//! the call and the set of error scenarios that could have produced it are
//! both read off the case.

use super::{AllelePair, ErrorRates, Result, SibshipError};
use crate::utils::sample_index;
use arrayvec::ArrayVec;
use rand::Rng;

/// Latent error events behind one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorCounts {
    pub dropouts: u32,
    pub mistypings: u32,
}

impl ErrorCounts {
    pub const fn new(dropouts: u32, mistypings: u32) -> Self {
        ErrorCounts {
            dropouts,
            mistypings,
        }
    }
}

impl std::ops::AddAssign for ErrorCounts {
    fn add_assign(&mut self, other: Self) {
        self.dropouts += other.dropouts;
        self.mistypings += other.mistypings;
    }
}

/// Allele-sharing pattern between a call and a genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCase {
    /// Homozygous genotype called as itself
    HomozygousMatch = 1,
    /// Homozygous genotype, one called allele matches
    HomozygousPartial = 2,
    /// Homozygous genotype, no called allele matches
    HomozygousMismatch = 3,
    /// Heterozygous genotype called as itself
    HeterozygousMatch = 4,
    /// Heterozygous genotype called homozygous for one of its alleles
    HeterozygousDropout = 5,
    /// Heterozygous genotype, no called allele matches
    HeterozygousMismatch = 6,
    /// Heterozygous genotype called heterozygous with one shared allele
    HeterozygousPartial = 7,
}

/// Rate terms shared by every case: e1, the per-allele mistyping rate e2
/// and the total mistyping rate E2.
#[derive(Debug, Clone, Copy)]
struct RateTerms {
    e1: f64,
    e2: f64,
    big_e2: f64,
}

impl RateTerms {
    fn new(num_alleles: usize, rates: ErrorRates) -> Self {
        RateTerms {
            e1: rates.dropout,
            e2: rates.mistyping / (num_alleles - 1) as f64,
            big_e2: rates.mistyping,
        }
    }
}

type Scenarios = ArrayVec<(f64, ErrorCounts), 4>;

impl ErrorCase {
    pub fn classify(phenotype: AllelePair, genotype: AllelePair) -> ErrorCase {
        let AllelePair(p0, p1) = phenotype;
        if genotype.is_homozygous() {
            let g = genotype.0;
            match (p0 == g, p1 == g) {
                (true, true) => ErrorCase::HomozygousMatch,
                (false, false) => ErrorCase::HomozygousMismatch,
                _ => ErrorCase::HomozygousPartial,
            }
        } else if phenotype.same_as(&genotype) {
            ErrorCase::HeterozygousMatch
        } else if phenotype.is_homozygous() && genotype.contains(p0) {
            ErrorCase::HeterozygousDropout
        } else if !genotype.contains(p0) && !genotype.contains(p1) {
            ErrorCase::HeterozygousMismatch
        } else {
            ErrorCase::HeterozygousPartial
        }
    }

    /// Numeric tag 1..=7 of the case.
    pub fn tag(self) -> u8 {
        self as u8
    }

    fn probability(self, homozygous_call: bool, t: RateTerms) -> f64 {
        let RateTerms { e1, e2, big_e2 } = t;
        // number of ordered ways to produce a call with two unmatched alleles
        let unmatched_orders = if homozygous_call { 1.0 } else { 2.0 };
        match self {
            ErrorCase::HomozygousMatch => (1.0 - big_e2).powi(2),
            ErrorCase::HomozygousPartial => 2.0 * e2 * (1.0 - big_e2),
            ErrorCase::HomozygousMismatch | ErrorCase::HeterozygousMismatch => {
                unmatched_orders * e2.powi(2)
            }
            ErrorCase::HeterozygousMatch => {
                (1.0 - big_e2).powi(2) + e2.powi(2) - 2.0 * e1 * (1.0 - big_e2 - e2).powi(2)
            }
            ErrorCase::HeterozygousDropout => {
                e2 * (1.0 - big_e2) + e1 * (1.0 - big_e2 - e2).powi(2)
            }
            ErrorCase::HeterozygousPartial => e2 * (1.0 - big_e2 + e2),
        }
    }

    /// Unnormalized weights of the error scenarios consistent with the case.
    fn scenarios(self, t: RateTerms) -> Scenarios {
        let RateTerms { e1, e2, big_e2 } = t;
        let no_dropout = 1.0 - 2.0 * e1;
        let mut scenarios = Scenarios::new();
        let mut push = |weight: f64, dropouts: u32, mistypings: u32| {
            scenarios.push((weight, ErrorCounts::new(dropouts, mistypings)))
        };
        match self {
            ErrorCase::HomozygousMatch => push(1.0, 0, 0),
            ErrorCase::HomozygousPartial => push(1.0, 0, 1),
            ErrorCase::HomozygousMismatch => push(1.0, 0, 2),
            ErrorCase::HeterozygousMatch => {
                push(no_dropout * (1.0 - big_e2).powi(2), 0, 0);
                push(no_dropout * e2 * e2, 0, 2);
                // dropout repaired by a single mistyping
                push(4.0 * e1 * e2 * (1.0 - big_e2), 1, 1);
            }
            ErrorCase::HeterozygousDropout => {
                push(e1 * (1.0 - big_e2).powi(2), 1, 0);
                push(no_dropout * e2 * (1.0 - big_e2), 0, 1);
                push(e1 * e2 * e2, 1, 2);
            }
            ErrorCase::HeterozygousMismatch => {
                push(no_dropout * e2 * e2, 0, 2);
                push(2.0 * e1 * e2 * e2, 1, 2);
            }
            ErrorCase::HeterozygousPartial => {
                push(no_dropout * e2 * (1.0 - big_e2), 0, 1);
                push(no_dropout * e2 * e2, 0, 2);
                push(2.0 * e1 * e2 * (1.0 - big_e2), 1, 1);
                push(2.0 * e1 * e2 * e2, 1, 2);
            }
        }
        scenarios
    }
}

/// Probability of observing `phenotype` when the true genotype is `genotype`.
///
/// Monomorphic loci (`num_alleles == 1`) always score 1.
pub fn likelihood(
    phenotype: AllelePair,
    genotype: AllelePair,
    num_alleles: usize,
    rates: ErrorRates,
) -> f64 {
    if num_alleles == 1 {
        return 1.0;
    }
    ErrorCase::classify(phenotype, genotype)
        .probability(phenotype.is_homozygous(), RateTerms::new(num_alleles, rates))
}

pub fn classify(phenotype: AllelePair, genotype: AllelePair) -> ErrorCase {
    ErrorCase::classify(phenotype, genotype)
}

/// Draws the number of dropout and mistyping events that turned `genotype`
/// into the observed `phenotype`.
pub fn simulate_error_counts<R: Rng + ?Sized>(
    phenotype: AllelePair,
    genotype: AllelePair,
    num_alleles: usize,
    rates: ErrorRates,
    rng: &mut R,
) -> Result<ErrorCounts> {
    if num_alleles == 1 {
        return Ok(ErrorCounts::default());
    }
    let case = ErrorCase::classify(phenotype, genotype);
    let scenarios = case.scenarios(RateTerms::new(num_alleles, rates));
    if scenarios.len() == 1 {
        return Ok(scenarios[0].1);
    }
    let weights: ArrayVec<f64, 4> = scenarios.iter().map(|(w, _)| *w).collect();
    let index = sample_index(&weights, rng).ok_or_else(|| {
        SibshipError::numeric_degeneracy(format!(
            "no error scenario has positive weight for call {} given genotype {}",
            phenotype, genotype
        ))
    })?;
    Ok(scenarios[index].1)
}
