mod constant;
mod error;
mod initializer;
mod param_gen;
mod random;

pub use constant::ConstParamGen;
pub use error::{InitErr, Result};
pub use initializer::ModelInitializer;
pub use param_gen::ParamGen;
pub use random::RandParamGen;
