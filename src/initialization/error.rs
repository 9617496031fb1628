use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The specific result type for the initialization module.
pub type Result<T> = std::result::Result<T, InitErr>;

/// Error returned whenever the initial global model can't be generated.
#[derive(Debug)]
pub enum InitErr {
    /// The distribution parameters are invalid for the chosen distribution.
    Distribution(String),
    /// The generator ran out of values before every layer was filled.
    Exhausted { layer: usize },
}

impl From<NormalError> for InitErr {
    fn from(value: NormalError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<UniformError> for InitErr {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl Display for InitErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distribution(msg) => write!(f, "invalid distribution: {msg}"),
            Self::Exhausted { layer } => {
                write!(f, "parameter generator exhausted while filling layer {layer}")
            }
        }
    }
}

impl Error for InitErr {}
