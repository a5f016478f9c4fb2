//! Data augmentation for the per-locus error rates.
//!
//! Given paternity, the true genotypes behind every call are drawn from their
//! joint posterior (mother first, then one allele per father, then the
//! maternal allele each offspring inherited). The imputed genotypes turn the
//! calls into dropout and mistyping counts, which update the rates through
//! their Beta conjugate posteriors.

use super::error_model::{likelihood, simulate_error_counts, ErrorCounts};
use super::likelihood::{maternal_genotypes, maternal_log_weight, paternal_allele_log_weight};
use super::{Allele, AllelePair, ErrorRates, Genotype, Locus, Paternity, Result, SibshipError};
use crate::utils::{sample_index, sample_log_index};
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// One joint draw of the unobserved genotypes at a locus.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentGenotypes {
    pub maternal: Genotype,
    /// Allele transmitted by each father, indexed like `families`
    pub paternal: Vec<Allele>,
    pub offspring: Vec<Genotype>,
}

impl LatentGenotypes {
    pub fn draw<R: Rng + ?Sized>(
        families: &[Vec<usize>],
        locus: &Locus,
        rates: ErrorRates,
        rng: &mut R,
    ) -> Result<Self> {
        let maternal = draw_maternal(families, locus, rates, rng)?;
        let mut paternal = Vec::with_capacity(families.len());
        let mut offspring = vec![AllelePair(0, 0); locus.num_offspring()];
        for family in families {
            let allele = draw_paternal(maternal, family, locus, rates, rng)?;
            for &index in family {
                let inherited = draw_inherited(index, maternal, allele, locus, rates, rng)?;
                offspring[index] = AllelePair(inherited, allele);
            }
            paternal.push(allele);
        }
        Ok(LatentGenotypes {
            maternal,
            paternal,
            offspring,
        })
    }

    /// Imputes the error events behind every call and returns them with the
    /// number of phenotyped individuals.
    pub fn error_counts<R: Rng + ?Sized>(
        &self,
        locus: &Locus,
        rates: ErrorRates,
        rng: &mut R,
    ) -> Result<(ErrorCounts, u32)> {
        let k = locus.num_alleles();
        let mut counts = ErrorCounts::default();
        let mut phenotyped = 0;
        let calls = std::iter::once((locus.mother, self.maternal))
            .chain(locus.offspring.iter().copied().zip(self.offspring.iter().copied()));
        for (call, genotype) in calls {
            if let Some(call) = call {
                counts += simulate_error_counts(call, genotype, k, rates, rng)?;
                phenotyped += 1;
            }
        }
        Ok((counts, phenotyped))
    }
}

fn draw_maternal<R: Rng + ?Sized>(
    families: &[Vec<usize>],
    locus: &Locus,
    rates: ErrorRates,
    rng: &mut R,
) -> Result<Genotype> {
    let candidates: Vec<Genotype> = maternal_genotypes(locus.num_alleles()).collect();
    let log_weights: Vec<f64> = candidates
        .iter()
        .map(|&maternal| maternal_log_weight(maternal, families, locus, rates))
        .collect();
    let index = sample_log_index(&log_weights, rng).ok_or_else(|| {
        SibshipError::numeric_degeneracy(format!(
            "locus {}: maternal genotype posterior has no mass",
            locus.id
        ))
    })?;
    Ok(candidates[index])
}

fn draw_paternal<R: Rng + ?Sized>(
    maternal: Genotype,
    family: &[usize],
    locus: &Locus,
    rates: ErrorRates,
    rng: &mut R,
) -> Result<Allele> {
    let log_weights: Vec<f64> = (0..locus.num_alleles())
        .map(|u| paternal_allele_log_weight(u, maternal, family, locus, rates))
        .collect();
    sample_log_index(&log_weights, rng).ok_or_else(|| {
        SibshipError::numeric_degeneracy(format!(
            "locus {}: paternal allele posterior has no mass",
            locus.id
        ))
    })
}

/// Maternal allele passed to one offspring; uniform when it has no call.
fn draw_inherited<R: Rng + ?Sized>(
    offspring: usize,
    maternal: Genotype,
    paternal: Allele,
    locus: &Locus,
    rates: ErrorRates,
    rng: &mut R,
) -> Result<Allele> {
    let weights = match locus.offspring[offspring] {
        Some(call) => {
            let k = locus.num_alleles();
            [
                likelihood(call, AllelePair(maternal.0, paternal), k, rates),
                likelihood(call, AllelePair(maternal.1, paternal), k, rates),
            ]
        }
        None => [1.0, 1.0],
    };
    let index = sample_index(&weights, rng).ok_or_else(|| {
        SibshipError::numeric_degeneracy(format!(
            "locus {}: no maternal allele explains the call of offspring {}",
            locus.id,
            offspring + 1
        ))
    })?;
    Ok(if index == 0 { maternal.0 } else { maternal.1 })
}

/// Draws new rates from the Beta posteriors given `counts` over `phenotyped`
/// individuals. Dropout lives on `(0, 0.5)`, hence the halved draw.
pub fn conjugate_update<R: Rng + ?Sized>(
    counts: ErrorCounts,
    phenotyped: u32,
    rng: &mut R,
) -> Result<ErrorRates> {
    let d = counts.dropouts as f64;
    let m = counts.mistypings as f64;
    let n = phenotyped as f64;
    if d > n || m > 2.0 * n {
        return Err(SibshipError::invalid_parameter(format!(
            "error counts (dropouts {}, mistypings {}) exceed what {} calls allow",
            counts.dropouts, counts.mistypings, phenotyped
        )));
    }
    let dropout = Beta::new(1.0 + d, 1.0 + n - d)
        .map_err(|e| SibshipError::invalid_parameter(format!("dropout posterior: {}", e)))?;
    let mistyping = Beta::new(1.0 + m, 1.0 + 2.0 * n - m)
        .map_err(|e| SibshipError::invalid_parameter(format!("mistyping posterior: {}", e)))?;
    Ok(ErrorRates {
        dropout: 0.5 * dropout.sample(rng),
        mistyping: mistyping.sample(rng),
    })
}

/// Closed-form means of the distributions drawn from by [`conjugate_update`],
/// as `(dropout, mistyping)`.
pub fn posterior_means(counts: ErrorCounts, phenotyped: u32) -> (f64, f64) {
    let d = counts.dropouts as f64;
    let m = counts.mistypings as f64;
    let n = phenotyped as f64;
    (0.5 * (1.0 + d) / (2.0 + n), (1.0 + m) / (2.0 + 2.0 * n))
}

pub(crate) fn sample_locus_rates<R: Rng + ?Sized>(
    families: &[Vec<usize>],
    locus: &Locus,
    rates: ErrorRates,
    rng: &mut R,
) -> Result<ErrorRates> {
    let latent = LatentGenotypes::draw(families, locus, rates, rng)?;
    let (counts, phenotyped) = latent.error_counts(locus, rates, rng)?;
    conjugate_update(counts, phenotyped, rng)
}

/// One Gibbs update of the error rates of a single locus with paternity held
/// fixed.
pub fn sample_error_rates_by_locus<R: Rng + ?Sized>(
    paternity: &Paternity,
    locus: &Locus,
    rates: ErrorRates,
    rng: &mut R,
) -> Result<ErrorRates> {
    if paternity.len() != locus.num_offspring() {
        return Err(SibshipError::input_shape(format!(
            "locus {} has phenotypes for {} offspring but paternity has {} entries",
            locus.id,
            locus.num_offspring(),
            paternity.len()
        )));
    }
    rates.validate()?;
    sample_locus_rates(&paternity.families(), locus, rates, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn call(a: usize, b: usize) -> Option<AllelePair> {
        Some(AllelePair(a, b))
    }

    fn rates() -> ErrorRates {
        ErrorRates::new(0.01, 0.01).unwrap()
    }

    #[test]
    fn test_posterior_means_single_clean_call() {
        let (dropout, mistyping) = posterior_means(ErrorCounts::default(), 1);
        assert_relative_eq!(dropout, 0.5 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(mistyping, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_conjugate_update_matches_posterior_means() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 20_000;
        let (mut dropout_sum, mut mistyping_sum) = (0.0, 0.0);
        for _ in 0..draws {
            let r = conjugate_update(ErrorCounts::default(), 1, &mut rng).unwrap();
            assert!(r.dropout > 0.0 && r.dropout < 0.5);
            assert!(r.mistyping > 0.0 && r.mistyping < 1.0);
            dropout_sum += r.dropout;
            mistyping_sum += r.mistyping;
        }
        let (dropout_mean, mistyping_mean) = posterior_means(ErrorCounts::default(), 1);
        assert_relative_eq!(dropout_sum / draws as f64, dropout_mean, epsilon = 0.01);
        assert_relative_eq!(mistyping_sum / draws as f64, mistyping_mean, epsilon = 0.01);
    }

    #[test]
    fn test_conjugate_update_rejects_impossible_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            conjugate_update(ErrorCounts::new(3, 0), 2, &mut rng),
            Err(SibshipError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_clean_family_is_imputed_without_errors() {
        let locus = Locus::new(
            "L1",
            &[0.4, 0.3, 0.3],
            call(0, 0),
            vec![call(0, 1), call(0, 1), call(0, 1), None],
        )
        .unwrap();
        let families = Paternity::single_father(4).families();
        let mut rng = StdRng::seed_from_u64(7);
        let latent = LatentGenotypes::draw(&families, &locus, rates(), &mut rng).unwrap();
        assert_eq!(latent.maternal, AllelePair(0, 0));
        assert_eq!(latent.paternal, vec![1]);
        assert_eq!(latent.offspring[0], AllelePair(0, 1));
        assert_eq!(latent.offspring[3], AllelePair(0, 1));

        let (counts, phenotyped) = latent.error_counts(&locus, rates(), &mut rng).unwrap();
        assert_eq!(phenotyped, 4);
        assert_eq!(counts, ErrorCounts::default());
    }

    #[test]
    fn test_noisy_locus_raises_mistyping() {
        let clean = Locus::new(
            "clean",
            &[0.2; 5],
            call(0, 0),
            vec![call(0, 1); 10],
        )
        .unwrap();
        let noisy = Locus::new(
            "noisy",
            &[0.2; 5],
            call(0, 0),
            vec![call(2, 3), call(3, 4), call(2, 4), call(0, 1), call(1, 2)]
                .into_iter()
                .cycle()
                .take(10)
                .collect(),
        )
        .unwrap();
        let paternity = Paternity::single_father(10);
        let mut rng = StdRng::seed_from_u64(11);
        let mean_mistyping = |locus: &Locus, rng: &mut StdRng| {
            let mut current = ErrorRates::new(0.05, 0.05).unwrap();
            let mut total = 0.0;
            for _ in 0..200 {
                current = sample_error_rates_by_locus(&paternity, locus, current, rng).unwrap();
                total += current.mistyping;
            }
            total / 200.0
        };
        let clean_mean = mean_mistyping(&clean, &mut rng);
        let noisy_mean = mean_mistyping(&noisy, &mut rng);
        assert!(clean_mean < 0.1);
        assert!(noisy_mean > clean_mean);
    }

    #[test]
    fn test_same_seed_same_draw() {
        let locus = Locus::new("L1", &[0.5, 0.5], call(0, 1), vec![call(0, 0), call(1, 1)]).unwrap();
        let paternity = Paternity::singletons(2);
        let a = sample_error_rates_by_locus(&paternity, &locus, rates(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        let b = sample_error_rates_by_locus(&paternity, &locus, rates(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shape_mismatch() {
        let locus = Locus::new("L1", &[0.5, 0.5], None, vec![None]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            sample_error_rates_by_locus(&Paternity::singletons(3), &locus, rates(), &mut rng),
            Err(SibshipError::InputShape { .. })
        ));
    }
}
