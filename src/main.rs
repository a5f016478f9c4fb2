use clap::Parser;
use sibship::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{error_rates, loglik, optimize, sample, validate},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Loglik(_) => "loglik",
        Command::Optimize(_) => "optimize",
        Command::Sample(_) => "sample",
        Command::ErrorRates(_) => "error-rates",
        Command::Validate(_) => "validate",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Loglik(args) => loglik::loglik(args)?,
        Command::Optimize(args) => optimize::optimize(args)?,
        Command::Sample(args) => sample::sample(args)?,
        Command::ErrorRates(args) => error_rates::error_rates(args)?,
        Command::Validate(args) => validate::validate(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
