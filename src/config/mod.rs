mod error;
mod server;

pub use error::{ConfigErr, Result};
pub use server::{InitSpec, ServerConfig};
