//! Federated Averaging round coordinator.
//!
//! Clients submit locally trained weights, once a quorum of updates is pending the
//! round is closed by averaging them and publishing the result as the new global model.

pub mod aggregation;
pub mod config;
pub mod coordination;
pub mod initialization;
pub mod model;
pub mod service;
pub mod storage;

pub use config::ServerConfig;
pub use service::{FedAvgServer, ServerBuilder};
