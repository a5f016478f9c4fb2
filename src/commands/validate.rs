use crate::cli::ValidateArgs;
use crate::commands::load_inputs;
use crate::sibship::{log_likelihood, Dataset, Locus};
use crate::utils::Result;

pub fn validate(args: ValidateArgs) -> Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let dataset = &inputs.dataset;

    let allele_counts: Vec<usize> = dataset.loci.iter().map(Locus::num_alleles).collect();
    let phenotyped: Vec<usize> = dataset.loci.iter().map(Locus::num_phenotyped).collect();
    let allele_stats = calculate_stats(&allele_counts);
    let phenotyped_stats = calculate_stats(&phenotyped);

    log::info!(
        "Alleles per Locus - Range: [{},{}], Median: {:.2}, Mean: {:.2}, StdDev: {:.2}",
        allele_stats.min,
        allele_stats.max,
        allele_stats.median,
        allele_stats.mean,
        allele_stats.std_dev
    );
    log::info!(
        "Calls per Locus - Range: [{},{}], Median: {:.2}, Mean: {:.2}, StdDev: {:.2}",
        phenotyped_stats.min,
        phenotyped_stats.max,
        phenotyped_stats.median,
        phenotyped_stats.mean,
        phenotyped_stats.std_dev
    );

    for locus in dataset.loci.iter().filter(|l| l.num_alleles() == 1) {
        log::warn!("Locus {} is monomorphic and carries no information", locus.id);
    }

    let mismatches = maternal_mismatches(dataset);
    for (locus, offspring) in &mismatches {
        log::warn!(
            "Offspring {} shares no allele with mother {} at locus {}",
            offspring,
            dataset.mother_id,
            locus
        );
    }

    let loglik = log_likelihood(&inputs.paternity, dataset, &inputs.rates)?;
    if !loglik.is_finite() {
        return Err(format!(
            "Initial paternity has zero likelihood (loglik {})",
            loglik
        ));
    }

    match mismatches.len() {
        0 => log::info!(
            "Validation successful. Loci={}, offspring={}, initial loglik={:.4}",
            dataset.num_loci(),
            dataset.num_offspring(),
            loglik
        ),
        count => log::info!(
            "Validation finished with {} maternal mismatches ({:.2}% of offspring calls)",
            count,
            100.0 * count as f64 / offspring_calls(dataset).max(1) as f64
        ),
    }

    Ok(())
}

/// Offspring calls that share no allele with the mother's call, as
/// `(locus id, offspring id)`. These need a genotyping error to be explained.
fn maternal_mismatches(dataset: &Dataset) -> Vec<(String, String)> {
    let mut mismatches = Vec::new();
    for locus in &dataset.loci {
        let Some(mother) = locus.mother else {
            continue;
        };
        for (id, call) in dataset.offspring_ids.iter().zip(&locus.offspring) {
            if let Some(call) = call {
                if !mother.contains(call.0) && !mother.contains(call.1) {
                    mismatches.push((locus.id.clone(), id.clone()));
                }
            }
        }
    }
    mismatches
}

fn offspring_calls(dataset: &Dataset) -> usize {
    dataset
        .loci
        .iter()
        .map(|l| l.offspring.iter().filter(|c| c.is_some()).count())
        .sum()
}

fn calculate_stats(data: &[usize]) -> Stats {
    let mut sorted = data.to_vec();
    sorted.sort_unstable();
    let len = sorted.len();
    if len == 0 {
        return Stats::default();
    }
    let median = if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) as f64 / 2.0
    } else {
        sorted[len / 2] as f64
    };
    let sum: usize = sorted.iter().sum();
    let mean = sum as f64 / len as f64;
    let std_dev = (sorted
        .iter()
        .map(|&x| (x as f64 - mean).powi(2))
        .sum::<f64>()
        / len as f64)
        .sqrt();
    Stats {
        min: sorted[0],
        max: sorted[len - 1],
        mean,
        median,
        std_dev,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Stats {
    min: usize,
    max: usize,
    mean: f64,
    median: f64,
    std_dev: f64,
}
