//! Error type shared by the inference engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SibshipError {
    /// Dimension mismatches between paternity, phenotypes, loci and rates
    #[error("Input shape error: {message}")]
    InputShape { message: String },

    /// Rates, frequencies, allele indices or sampler settings out of range
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Categorical draw over weights that carry no probability mass
    #[error("Numeric degeneracy: {message}")]
    NumericDegeneracy { message: String },
}

pub type Result<T> = std::result::Result<T, SibshipError>;

impl SibshipError {
    pub fn input_shape(message: impl Into<String>) -> Self {
        Self::InputShape {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn numeric_degeneracy(message: impl Into<String>) -> Self {
        Self::NumericDegeneracy {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InputShape { message }
            | Self::InvalidParameter { message }
            | Self::NumericDegeneracy { message } => message,
        }
    }
}

// Lets command code propagate engine errors with `?` into the CLI's String errors
impl From<SibshipError> for String {
    fn from(err: SibshipError) -> Self {
        err.to_string()
    }
}
