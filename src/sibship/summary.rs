//! Posterior summaries of sampler output.

use super::{Paternity, Result, SibshipError};
use std::collections::HashMap;

fn check_burn_in(num_samples: usize, burn_in: usize) -> Result<()> {
    if burn_in >= num_samples {
        return Err(SibshipError::invalid_parameter(format!(
            "burn-in ({}) must be smaller than the number of samples ({})",
            burn_in, num_samples
        )));
    }
    Ok(())
}

/// Most frequent partition after burn-in, with its relative frequency.
///
/// Samples are compared after compaction, so relabelled copies of a
/// partition count together. Ties go to the partition seen first.
pub fn modal_partition(samples: &[Paternity], burn_in: usize) -> Result<(Paternity, f64)> {
    check_burn_in(samples.len(), burn_in)?;
    let kept = &samples[burn_in..];
    let mut counts: HashMap<Paternity, (usize, usize)> = HashMap::new();
    for (order, sample) in kept.iter().enumerate() {
        let mut key = sample.clone();
        key.compact();
        counts.entry(key).or_insert((0, order)).0 += 1;
    }
    let (mode, (count, _)) = counts
        .into_iter()
        .max_by(|(_, (a, first_a)), (_, (b, first_b))| a.cmp(b).then(first_b.cmp(first_a)))
        .ok_or_else(|| SibshipError::input_shape("no samples after burn-in"))?;
    Ok((mode, count as f64 / kept.len() as f64))
}

/// Fraction of post-burn-in samples in which each pair of offspring shares a
/// father, as a symmetric matrix with ones on the diagonal.
pub fn coassignment(samples: &[Paternity], burn_in: usize) -> Result<Vec<Vec<f64>>> {
    check_burn_in(samples.len(), burn_in)?;
    let kept = &samples[burn_in..];
    let num_offspring = kept[0].len();
    if let Some(sample) = kept.iter().find(|s| s.len() != num_offspring) {
        return Err(SibshipError::input_shape(format!(
            "paternity samples have {} and {} offspring",
            num_offspring,
            sample.len()
        )));
    }
    let mut together = vec![vec![0usize; num_offspring]; num_offspring];
    for sample in kept {
        for i in 0..num_offspring {
            for j in i..num_offspring {
                if sample.father_of(i) == sample.father_of(j) {
                    together[i][j] += 1;
                }
            }
        }
    }
    let total = kept.len() as f64;
    let mut matrix = vec![vec![0.0; num_offspring]; num_offspring];
    for i in 0..num_offspring {
        for j in i..num_offspring {
            let value = together[i][j] as f64 / total;
            matrix[i][j] = value;
            matrix[j][i] = value;
        }
    }
    Ok(matrix)
}

/// Posterior mean of each locus' trace after burn-in.
pub fn chain_means(chain: &[Vec<f64>], burn_in: usize) -> Result<Vec<f64>> {
    chain
        .iter()
        .map(|trace| {
            check_burn_in(trace.len(), burn_in)?;
            let kept = &trace[burn_in..];
            Ok(kept.iter().sum::<f64>() / kept.len() as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples() -> Vec<Paternity> {
        [
            vec![0, 1, 2],
            vec![0, 0, 1],
            vec![1, 1, 0],
            vec![0, 0, 0],
            vec![0, 0, 1],
        ]
        .into_iter()
        .map(Paternity::new)
        .collect()
    }

    #[test]
    fn test_modal_partition_merges_relabelled_samples() {
        let (mode, frequency) = modal_partition(&samples(), 1).unwrap();
        assert_eq!(mode.labels(), &[0, 0, 1]);
        assert_relative_eq!(frequency, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_modal_partition_tie_keeps_first_seen() {
        let samples = vec![Paternity::singletons(2), Paternity::single_father(2)];
        let (mode, frequency) = modal_partition(&samples, 0).unwrap();
        assert_eq!(mode, Paternity::singletons(2));
        assert_relative_eq!(frequency, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_coassignment() {
        let matrix = coassignment(&samples(), 1).unwrap();
        assert_relative_eq!(matrix[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[0][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(matrix[1][2], 0.25, epsilon = 1e-12);
        assert_relative_eq!(matrix[2][1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_chain_means() {
        let chain = vec![vec![1.0, 0.2, 0.4], vec![5.0, 1.0, 2.0]];
        let means = chain_means(&chain, 1).unwrap();
        assert_relative_eq!(means[0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(means[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_burn_in_must_leave_samples() {
        assert!(matches!(
            modal_partition(&samples(), 5),
            Err(SibshipError::InvalidParameter { .. })
        ));
        assert!(coassignment(&[], 0).is_err());
        assert!(chain_means(&[vec![0.1]], 1).is_err());
    }
}
