use crate::cli::OptimizeArgs;
use crate::commands::{initialize_thread_pool, load_inputs};
use crate::sibship::{optimize_paternity, writers, OptimizeParams};
use crate::utils::{create_writer, Result};

pub fn optimize(args: OptimizeArgs) -> Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let params = OptimizeParams {
        max_sweeps: args.max_sweeps,
        tolerance: args.tolerance,
    };

    let pool = initialize_thread_pool(args.num_threads)?;
    let result = pool.install(|| {
        optimize_paternity(&inputs.paternity, &inputs.dataset, &inputs.rates, params)
    })?;

    if result.converged {
        log::info!(
            "Converged after {} sweeps: loglik {:.6}, {} fathers",
            result.sweeps,
            result.log_likelihood,
            result.paternity.num_fathers()
        );
    } else {
        log::warn!(
            "Stopped at the sweep limit ({}) without converging: loglik {:.6}",
            result.sweeps,
            result.log_likelihood
        );
    }

    create_writer(&args.output_prefix, "paternity.tsv", |path| {
        writers::write_assignment(path, &inputs.dataset, &result.paternity)
    })
}
