use crate::cli::ErrorRatesArgs;
use crate::commands::load_inputs;
use crate::sibship::{sample_error_rates, summary, writers};
use crate::utils::{create_writer, Result};
use rand::{rngs::StdRng, SeedableRng};

pub fn error_rates(args: ErrorRatesArgs) -> Result<()> {
    args.chain.check_burn_in()?;
    let inputs = load_inputs(&args.inputs)?;
    let mut rates = inputs.rates.clone();
    let mut rng = StdRng::seed_from_u64(args.chain.seed);
    let chain = sample_error_rates(
        &inputs.paternity,
        &inputs.dataset,
        &mut rates,
        args.chain.iterations,
        &mut rng,
    )?;

    let burn_in = args.chain.burn_in;
    let dropout_means = summary::chain_means(&chain.dropout, burn_in)?;
    let mistyping_means = summary::chain_means(&chain.mistyping, burn_in)?;
    for ((locus, dropout), mistyping) in inputs
        .dataset
        .loci
        .iter()
        .zip(dropout_means)
        .zip(mistyping_means)
    {
        log::info!(
            "Locus {} posterior mean dropout {:.4}, mistyping {:.4}",
            locus.id,
            dropout,
            mistyping
        );
    }

    create_writer(&args.output_prefix, "error_rates.tsv", |path| {
        writers::write_rate_chain(path, &inputs.dataset, &chain)
    })
}
