use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="sibship",
          version=&**FULL_VERSION,
          about="Paternity inference for maternal families genotyped with error",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Log-likelihood of a paternity assignment")]
    Loglik(LoglikArgs),
    #[clap(about = "Maximum-likelihood paternity by coordinate ascent")]
    Optimize(OptimizeArgs),
    #[clap(about = "Posterior paternity samples under a Dirichlet-process prior")]
    Sample(SampleArgs),
    #[clap(about = "Posterior genotyping error rates given paternity")]
    ErrorRates(ErrorRatesArgs),
    #[clap(about = "Dataset validator")]
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[clap(required = true)]
    #[clap(short = 'l')]
    #[clap(long = "loci")]
    #[clap(help = "Loci file: ID DROPOUT MISTYPING FREQUENCIES")]
    #[clap(value_name = "LOCI")]
    #[arg(value_parser = check_file_exists)]
    pub loci_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "genotypes")]
    #[clap(help = "Genotypes file: ID ROLE CALL...")]
    #[clap(value_name = "GENOTYPES")]
    #[arg(value_parser = check_file_exists)]
    pub genotypes_path: PathBuf,

    #[clap(short = 'p')]
    #[clap(long = "paternity")]
    #[clap(value_name = "PATERNITY")]
    #[clap(help = "Initial paternity (single or singletons or file name)")]
    #[clap(default_value = "single")]
    pub paternity: String,
}

#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    #[clap(help_heading("Sampling"))]
    #[clap(long = "iterations")]
    #[clap(value_name = "ITERATIONS")]
    #[clap(help = "Number of sampler iterations")]
    #[clap(default_value = "1000")]
    #[arg(value_parser = positive_count)]
    pub iterations: usize,

    #[clap(help_heading("Sampling"))]
    #[clap(long = "burn-in")]
    #[clap(value_name = "BURN_IN")]
    #[clap(help = "Iterations discarded before summarizing")]
    #[clap(default_value = "100")]
    pub burn_in: usize,

    #[clap(help_heading("Sampling"))]
    #[clap(long = "seed")]
    #[clap(value_name = "SEED")]
    #[clap(help = "Seed of the random number generator")]
    #[clap(default_value = "42")]
    pub seed: u64,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("loglik")))]
#[command(arg_required_else_help(true))]
pub struct LoglikArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("optimize")))]
#[command(arg_required_else_help(true))]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-sweeps")]
    #[clap(value_name = "SWEEPS")]
    #[clap(help = "Maximum number of coordinate-ascent sweeps")]
    #[clap(default_value = "1000")]
    pub max_sweeps: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "tolerance")]
    #[clap(value_name = "TOLERANCE")]
    #[clap(help = "Stop once a sweep improves the log-likelihood by less than this")]
    #[clap(default_value = "1e-8")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub tolerance: f64,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("sample")))]
#[command(arg_required_else_help(true))]
pub struct SampleArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[command(flatten)]
    pub chain: ChainArgs,

    #[clap(help_heading("Sampling"))]
    #[clap(long = "concentration")]
    #[clap(value_name = "ALPHA")]
    #[clap(help = "Concentration of the Dirichlet-process prior on families")]
    #[clap(default_value = "1.0")]
    #[arg(value_parser = ensure_positive_float)]
    pub concentration: f64,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("error-rates")))]
#[command(arg_required_else_help(true))]
pub struct ErrorRatesArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[command(flatten)]
    pub chain: ChainArgs,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("validate")))]
#[command(arg_required_else_help(true))]
pub struct ValidateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

impl ChainArgs {
    pub fn check_burn_in(&self) -> Result<()> {
        if self.burn_in >= self.iterations {
            return Err(format!(
                "Burn-in ({}) must be smaller than the number of iterations ({})",
                self.burn_in, self.iterations
            ));
        }
        Ok(())
    }
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn positive_count(s: &str) -> Result<usize> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if count >= 1 {
        Ok(count)
    } else {
        Err("Value must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_positive_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("The value must be positive, got: {}", value))
    }
}

fn ensure_non_negative_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("The value must be non-negative, got: {}", value))
    }
}
