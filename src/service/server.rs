use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use super::{ApiErr, StatusResponse};
use crate::{
    coordination::{AggregationCoordinator, AggregationTrigger},
    model::{ClientUpdate, GlobalModelState},
    storage::SubmitResult,
};

/// The entry point of the transport layer into the round engine.
///
/// Submissions are appended to the current round and an aggregation attempt is
/// queued, the caller gets its answer without waiting on the aggregation.
#[derive(Debug)]
pub struct FedAvgServer {
    coordinator: Arc<AggregationCoordinator>,
    trigger: AggregationTrigger,
    validate_submissions: bool,
}

impl FedAvgServer {
    /// Creates a new `FedAvgServer`.
    ///
    /// # Arguments
    /// * `coordinator` - The coordinator owning the accumulator and the store.
    /// * `trigger` - Feeds the aggregation dispatcher.
    /// * `validate_submissions` - Whether to reject updates shaped unlike the global model.
    pub fn new(
        coordinator: Arc<AggregationCoordinator>,
        trigger: AggregationTrigger,
        validate_submissions: bool,
    ) -> Self {
        Self {
            coordinator,
            trigger,
            validate_submissions,
        }
    }

    /// Returns a snapshot of the published global model.
    pub fn global_model(&self) -> Arc<GlobalModelState> {
        self.coordinator.store().read()
    }

    /// Adds `update` to the current round and schedules an aggregation attempt.
    ///
    /// # Arguments
    /// * `update` - The client's locally trained weights.
    ///
    /// # Returns
    /// The pending count after accepting the update, `ApiErr::ShapeMismatch` if validation
    /// is enabled and the weights don't match the global model, or `ApiErr::Unavailable`
    /// if no aggregation can run anymore, in which case the update isn't kept.
    pub fn submit(&self, update: ClientUpdate) -> Result<SubmitResult, ApiErr> {
        if self.trigger.is_closed() {
            warn!(client_id = update.client_id.as_str(); "aggregation dispatcher is gone");
            return Err(ApiErr::Unavailable);
        }

        if self.validate_submissions {
            let global = self.global_model();

            if let Err(kind) = global.weights.check_compatible(&update.weights) {
                warn!(client_id = update.client_id.as_str(); "rejected update: {kind}");
                return Err(ApiErr::ShapeMismatch {
                    client_id: update.client_id,
                    kind,
                });
            }
        }

        debug!(
            client_id = update.client_id.as_str(),
            local_fpr = update.local_fpr;
            "received update"
        );

        let res = self.coordinator.accumulator().submit(update);

        // The update is already appended, report it as received either way.
        if !self.trigger.trigger() {
            warn!("aggregation dispatcher stopped after accepting the update, it stays pending");
        }

        Ok(res)
    }

    pub fn status(&self) -> StatusResponse {
        let accumulator = self.coordinator.accumulator();

        StatusResponse {
            round: self.coordinator.store().round(),
            pending: accumulator.pending(),
            quorum: accumulator.quorum(),
        }
    }

    /// Subscribes to the round number of every published global model.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.coordinator.store().subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use tokio::runtime::Runtime;

    use super::*;
    use crate::{
        coordination::AggregationDispatcher,
        model::{ModelWeights, Tensor},
        storage::{GlobalModelStore, RoundAccumulator},
    };

    fn weights(value: f32) -> ModelWeights {
        ModelWeights::new(vec![Tensor::vector(vec![value, value])])
    }

    fn coordinator() -> Arc<AggregationCoordinator> {
        let accumulator = Arc::new(RoundAccumulator::new(NonZeroUsize::new(2).unwrap()));
        let store = Arc::new(GlobalModelStore::new(GlobalModelState::new(0, weights(0.))));
        Arc::new(AggregationCoordinator::new(accumulator, store))
    }

    #[test]
    fn stopped_dispatcher_refuses_without_keeping_the_update() {
        let coord = coordinator();
        let rt = Runtime::new().unwrap();
        let (_dispatcher, trigger) = {
            let _guard = rt.enter();
            AggregationDispatcher::spawn(Arc::clone(&coord))
        };

        // Shutting the runtime down drops the dispatcher task and its receiver.
        drop(rt);

        let server = FedAvgServer::new(Arc::clone(&coord), trigger, true);
        let err = server
            .submit(ClientUpdate::new("late", weights(1.), 0.))
            .unwrap_err();

        assert!(matches!(err, ApiErr::Unavailable));
        assert_eq!(server.status().pending, 0);
    }

    #[test]
    fn live_dispatcher_accepts_updates() {
        let coord = coordinator();
        let rt = Runtime::new().unwrap();
        let _guard = rt.enter();
        let (_dispatcher, trigger) = AggregationDispatcher::spawn(Arc::clone(&coord));

        let server = FedAvgServer::new(coord, trigger, true);
        let res = server.submit(ClientUpdate::new("a", weights(1.), 0.)).unwrap();

        assert_eq!(res.accepted_count, 1);
    }
}
