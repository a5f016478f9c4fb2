use crate::cli::SampleArgs;
use crate::commands::{initialize_thread_pool, load_inputs};
use crate::sibship::{sample_paternity, summary, writers, SamplerParams};
use crate::utils::{create_writer, Result};
use rand::{rngs::StdRng, SeedableRng};

pub fn sample(args: SampleArgs) -> Result<()> {
    args.chain.check_burn_in()?;
    let inputs = load_inputs(&args.inputs)?;
    let params = SamplerParams {
        iterations: args.chain.iterations,
        concentration: args.concentration,
    };

    let pool = initialize_thread_pool(args.num_threads)?;
    let mut rng = StdRng::seed_from_u64(args.chain.seed);
    let chain = pool.install(|| {
        sample_paternity(
            &inputs.paternity,
            &inputs.dataset,
            &inputs.rates,
            params,
            &mut rng,
        )
    })?;

    let burn_in = args.chain.burn_in;
    let (mode, frequency) = summary::modal_partition(&chain.paternity, burn_in)?;
    log::info!(
        "Modal partition has {} fathers, posterior frequency {:.3}",
        mode.num_fathers(),
        frequency
    );
    let coassignment = summary::coassignment(&chain.paternity, burn_in)?;

    let prefix = &args.output_prefix;
    create_writer(prefix, "paternity.tsv", |path| {
        writers::write_paternity_chain(path, &inputs.dataset, &chain)
    })?;
    create_writer(prefix, "error_rates.tsv", |path| {
        writers::write_rate_chain(path, &inputs.dataset, &chain.rates)
    })?;
    create_writer(prefix, "deviance.tsv", |path| {
        writers::write_deviance(path, &chain.deviance)
    })?;
    create_writer(prefix, "coassignment.tsv", |path| {
        writers::write_coassignment(path, &inputs.dataset, &coassignment)
    })
}
