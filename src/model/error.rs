use std::{
    error::Error,
    fmt::{self, Display},
};

/// The specific result type for tensor construction inside the model module.
pub type Result<T> = std::result::Result<T, TensorErr>;

/// Error returned whenever a tensor can't be built from the given values.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorErr {
    /// The flat data doesn't match the amount of values the shape describes.
    DataLength { expected: usize, got: usize },
    /// A nested array has a different length than its siblings.
    Ragged {
        depth: usize,
        expected: usize,
        got: usize,
    },
    /// Numbers and arrays were mixed at the same nesting depth.
    MixedNesting { depth: usize },
    /// A value doesn't fit in a finite `f32`.
    OutOfRange { value: f64 },
}

impl Display for TensorErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataLength { expected, got } => {
                write!(f, "tensor data length mismatch: got {got}, expected {expected}")
            }
            Self::Ragged {
                depth,
                expected,
                got,
            } => write!(
                f,
                "ragged tensor at depth {depth}: got {got} elements, expected {expected}"
            ),
            Self::MixedNesting { depth } => {
                write!(f, "tensor mixes numbers and arrays at depth {depth}")
            }
            Self::OutOfRange { value } => {
                write!(f, "tensor value {value} is out of the f32 range")
            }
        }
    }
}

impl Error for TensorErr {}

/// Describes how two sets of model weights disagree in their structure.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchKind {
    LayerCount {
        expected: usize,
        got: usize,
    },
    LayerShape {
        layer: usize,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

impl Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerCount { expected, got } => {
                write!(f, "layer count mismatch: got {got}, expected {expected}")
            }
            Self::LayerShape {
                layer,
                expected,
                got,
            } => write!(
                f,
                "layer {layer} shape mismatch: got {got:?}, expected {expected:?}"
            ),
        }
    }
}
