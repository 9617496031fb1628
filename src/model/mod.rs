mod error;
mod state;
mod tensor;
mod weights;

pub use error::{MismatchKind, Result, TensorErr};
pub use state::{ClientUpdate, GlobalModelState};
pub use tensor::Tensor;
pub use weights::ModelWeights;
