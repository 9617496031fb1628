mod builder;
mod error;
mod routes;
mod server;
mod wire;

pub use builder::ServerBuilder;
pub use error::ApiErr;
pub use routes::router;
pub use server::FedAvgServer;
pub use wire::{ErrorResponse, StatusResponse, UpdateRequest, UpdateResponse};
