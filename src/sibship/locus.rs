use super::{Result, SibshipError};
use std::fmt;

pub type Allele = usize;

/// Unordered pair of alleles at one locus.
///
/// Used both for true diploid genotypes and for observed calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllelePair(pub Allele, pub Allele);

pub type Genotype = AllelePair;

/// Observed call at one locus, `None` when the individual was not called.
pub type Phenotype = Option<AllelePair>;

impl AllelePair {
    pub fn is_homozygous(&self) -> bool {
        self.0 == self.1
    }

    pub fn contains(&self, allele: Allele) -> bool {
        self.0 == allele || self.1 == allele
    }

    pub fn swapped(&self) -> AllelePair {
        AllelePair(self.1, self.0)
    }

    pub fn max_allele(&self) -> Allele {
        self.0.max(self.1)
    }

    /// Equal as unordered pairs.
    pub fn same_as(&self, other: &AllelePair) -> bool {
        *self == *other || *self == other.swapped()
    }
}

impl fmt::Display for AllelePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Parses a call encoded as `a/b`; `.` and `./.` encode a missing call.
pub fn parse_call(encoding: &str) -> std::result::Result<Phenotype, String> {
    if encoding == "." || encoding == "./." {
        return Ok(None);
    }
    let error_msg = || format!("Invalid call encoding: {}", encoding);
    let (first, second) = encoding.split_once('/').ok_or_else(error_msg)?;
    let first: Allele = first.parse().map_err(|_| error_msg())?;
    let second: Allele = second.parse().map_err(|_| error_msg())?;
    Ok(Some(AllelePair(first, second)))
}

/// Per-locus genotyping error rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRates {
    /// Probability that one allele of a heterozygote drops out (e1)
    pub dropout: f64,
    /// Probability that an allele is miscalled as any other allele (E2)
    pub mistyping: f64,
}

impl ErrorRates {
    pub fn new(dropout: f64, mistyping: f64) -> Result<Self> {
        let rates = ErrorRates { dropout, mistyping };
        rates.validate()?;
        Ok(rates)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dropout > 0.0 && self.dropout < 0.5) {
            return Err(SibshipError::invalid_parameter(format!(
                "dropout rate must lie in (0, 0.5), got {}",
                self.dropout
            )));
        }
        if !(self.mistyping > 0.0 && self.mistyping < 1.0) {
            return Err(SibshipError::invalid_parameter(format!(
                "mistyping rate must lie in (0, 1), got {}",
                self.mistyping
            )));
        }
        Ok(())
    }
}

/// A marker with its allele frequencies and the phenotypes observed on one
/// maternal family.
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    pub id: String,
    frequencies: Vec<f64>,
    pub mother: Phenotype,
    pub offspring: Vec<Phenotype>,
}

impl Locus {
    /// Builds a locus, normalizing the allele frequencies to sum to one.
    pub fn new(
        id: impl Into<String>,
        frequencies: &[f64],
        mother: Phenotype,
        offspring: Vec<Phenotype>,
    ) -> Result<Self> {
        let id = id.into();
        if frequencies.is_empty() {
            return Err(SibshipError::input_shape(format!(
                "locus {} has no allele frequencies",
                id
            )));
        }
        if frequencies.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(SibshipError::invalid_parameter(format!(
                "locus {} has negative allele frequencies",
                id
            )));
        }
        let total: f64 = frequencies.iter().sum();
        if total <= 0.0 {
            return Err(SibshipError::invalid_parameter(format!(
                "locus {} allele frequencies sum to zero",
                id
            )));
        }

        let num_alleles = frequencies.len();
        let out_of_range = |call: &Phenotype| call.is_some_and(|p| p.max_allele() >= num_alleles);
        if out_of_range(&mother) {
            return Err(SibshipError::invalid_parameter(format!(
                "locus {}: maternal allele out of range",
                id
            )));
        }
        if let Some(index) = offspring.iter().position(out_of_range) {
            return Err(SibshipError::invalid_parameter(format!(
                "locus {}: offspring {} allele out of range",
                id, index
            )));
        }

        Ok(Locus {
            id,
            frequencies: frequencies.iter().map(|f| f / total).collect(),
            mother,
            offspring,
        })
    }

    pub fn num_alleles(&self) -> usize {
        self.frequencies.len()
    }

    /// Normalized allele frequencies.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn num_offspring(&self) -> usize {
        self.offspring.len()
    }

    /// Number of individuals (mother included) with an observed call.
    pub fn num_phenotyped(&self) -> usize {
        self.mother.is_some() as usize + self.offspring.iter().filter(|p| p.is_some()).count()
    }
}
