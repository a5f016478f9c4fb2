pub mod error_rates;
pub mod loglik;
pub mod optimize;
pub mod sample;
pub mod validate;

use crate::cli::InputArgs;
use crate::sibship::{read_dataset, read_loci, Dataset, ErrorRates, Paternity};
use crate::utils::{open_input_reader, InitialPaternity, Result};
use rayon::ThreadPoolBuilder;

/// Dataset, per-locus error rates and starting paternity named by the
/// input arguments.
pub(crate) struct Inputs {
    pub dataset: Dataset,
    pub rates: Vec<ErrorRates>,
    pub paternity: Paternity,
}

pub(crate) fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let records = read_loci(open_input_reader(&args.loci_path)?)
        .map_err(|e| format!("{}: {}", args.loci_path.display(), e))?;
    let (dataset, rates) = read_dataset(&records, open_input_reader(&args.genotypes_path)?)
        .map_err(|e| format!("{}: {}", args.genotypes_path.display(), e))?;
    let paternity = InitialPaternity::new(&args.paternity)?.resolve(&dataset.offspring_ids)?;
    log::info!(
        "Loaded {} loci for mother {} and {} offspring",
        dataset.num_loci(),
        dataset.mother_id,
        dataset.num_offspring()
    );
    log::debug!(
        "Initial paternity ({}): {} fathers",
        args.paternity,
        paternity.num_fathers()
    );
    Ok(Inputs {
        dataset,
        rates,
        paternity,
    })
}

pub(crate) fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    log::debug!("Initializing thread pool with {} threads...", num_threads);
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("sibship-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
