mod dataset;
mod error;
pub mod error_model;
mod error_rates;
mod gibbs;
pub mod latent;
mod likelihood;
mod locus;
mod optimize;
mod paternity;
pub mod summary;
pub mod writers;

pub use dataset::{read_dataset, read_loci, Dataset, LocusRecord};
pub use error::{Result, SibshipError};
pub use error_model::{ErrorCase, ErrorCounts};
pub use error_rates::{sample_error_rates, RateChain};
pub use gibbs::{sample_paternity, PaternityChain, SamplerParams};
pub use latent::sample_error_rates_by_locus;
pub use likelihood::{locus_log_likelihood, log_likelihood};
pub use locus::{parse_call, Allele, AllelePair, ErrorRates, Genotype, Locus, Phenotype};
pub use optimize::{optimize_paternity, OptimizeParams, OptimizeResult};
pub use paternity::{compact_labels, Paternity};
