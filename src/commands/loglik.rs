use crate::cli::LoglikArgs;
use crate::commands::load_inputs;
use crate::sibship::{locus_log_likelihood, log_likelihood};
use crate::utils::Result;

pub fn loglik(args: LoglikArgs) -> Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let total = log_likelihood(&inputs.paternity, &inputs.dataset, &inputs.rates)?;
    for (locus, &rates) in inputs.dataset.loci.iter().zip(&inputs.rates) {
        let value = locus_log_likelihood(&inputs.paternity, locus, rates)?;
        log::debug!("Locus {} loglik: {:.6}", locus.id, value);
    }
    println!("{}", total);
    Ok(())
}
