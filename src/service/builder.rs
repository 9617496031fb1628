use std::sync::Arc;

use log::info;
use rand::{SeedableRng, rngs::StdRng};

use super::FedAvgServer;
use crate::{
    config::{InitSpec, ServerConfig},
    coordination::{AggregationCoordinator, AggregationDispatcher},
    initialization::{ConstParamGen, ModelInitializer, ParamGen, RandParamGen, Result},
    model::{GlobalModelState, ModelWeights},
    storage::{GlobalModelStore, RoundAccumulator},
};

/// Builds a running `FedAvgServer` given a configuration.
pub struct ServerBuilder;

impl ServerBuilder {
    /// Creates a new `ServerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Seeds the round 0 model and wires the accumulator, store, coordinator and dispatcher.
    ///
    /// Must be called from within a tokio runtime, the dispatcher task is spawned on it.
    ///
    /// # Arguments
    /// * `config` - The server configuration.
    ///
    /// # Returns
    /// The server and its dispatcher, or an `InitErr` if the initial model can't be generated.
    pub fn build(&self, config: &ServerConfig) -> Result<(FedAvgServer, AggregationDispatcher)> {
        let weights = self.initial_weights(config)?;
        info!(
            layers = weights.len(),
            params = weights.params();
            "seeded placeholder global model"
        );

        let accumulator = Arc::new(RoundAccumulator::new(config.quorum_threshold));
        let store = Arc::new(GlobalModelStore::new(GlobalModelState::new(0, weights)));
        let coordinator = Arc::new(AggregationCoordinator::new(accumulator, store));

        let (dispatcher, trigger) = AggregationDispatcher::spawn(Arc::clone(&coordinator));
        let server = FedAvgServer::new(coordinator, trigger, config.validate_submissions);

        Ok((server, dispatcher))
    }

    /// Generates a random number generator given (or not) a seed.
    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn initial_weights(&self, config: &ServerConfig) -> Result<ModelWeights> {
        let initializer = ModelInitializer::new(config.initial_model_shape.clone());
        let limit = initializer.params();
        let rng = self.generate_rng(config.seed);

        let mut param_gen: Box<dyn ParamGen> = match config.init {
            InitSpec::Const { value } => Box::new(ConstParamGen::new(value, limit)),
            InitSpec::Uniform { low, high } => {
                Box::new(RandParamGen::uniform(rng, limit, low, high)?)
            }
            InitSpec::Normal { mean, std_dev } => {
                Box::new(RandParamGen::normal(rng, limit, mean, std_dev)?)
            }
        };

        initializer.build(param_gen.as_mut())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
