use std::sync::Arc;

use log::{error, info, warn};
use parking_lot::Mutex;

use crate::{
    aggregation::{self, AggregationErr, Result},
    model::{ClientUpdate, GlobalModelState, ModelWeights},
    storage::{GlobalModelStore, RoundAccumulator},
};

/// Describes a successfully closed round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round: u64,
    pub participants: usize,
    pub client_ids: Vec<String>,
}

/// Closes rounds: drains the accumulator, averages the batch and publishes the result.
///
/// The drain, average and publish steps of a round run under a single lock, so at most
/// one aggregation is in flight while submissions keep flowing into the accumulator.
#[derive(Debug)]
pub struct AggregationCoordinator {
    accumulator: Arc<RoundAccumulator>,
    store: Arc<GlobalModelStore>,
    aggregating: Mutex<()>,
}

impl AggregationCoordinator {
    /// Creates a new `AggregationCoordinator`.
    ///
    /// # Arguments
    /// * `accumulator` - Where the pending client updates are collected.
    /// * `store` - Where the global model gets published.
    pub fn new(accumulator: Arc<RoundAccumulator>, store: Arc<GlobalModelStore>) -> Self {
        Self {
            accumulator,
            store,
            aggregating: Mutex::new(()),
        }
    }

    /// Aggregates the pending updates if the quorum has been reached.
    ///
    /// A failed aggregation discards the drained batch and leaves the round untouched.
    ///
    /// # Returns
    /// The report of the published round, `None` if the quorum wasn't reached or an
    /// `AggregationErr` if the drained batch couldn't be averaged.
    pub fn maybe_aggregate(&self) -> Result<Option<RoundReport>> {
        let _guard = self.aggregating.lock();

        if !self.accumulator.is_quorum_reached() {
            return Ok(None);
        }

        let batch = self.accumulator.drain();
        if batch.is_empty() {
            return Ok(None);
        }

        let current = self.store.read();
        let weights = match Self::average(&batch) {
            Ok(weights) => weights,
            Err(e) => {
                Self::log_failure(&e, current.round, batch.len());
                return Err(e);
            }
        };

        let round = current.round + 1;
        self.store.publish(GlobalModelState::new(round, weights));

        let client_ids: Vec<_> = batch.into_iter().map(|u| u.client_id).collect();
        info!(round = round, participants = client_ids.len(); "published global model");

        Ok(Some(RoundReport {
            round,
            participants: client_ids.len(),
            client_ids,
        }))
    }

    pub fn accumulator(&self) -> &RoundAccumulator {
        &self.accumulator
    }

    pub fn store(&self) -> &GlobalModelStore {
        &self.store
    }

    /// Unweighted FedAvg over the batch, `local_fpr` doesn't take part.
    fn average(batch: &[ClientUpdate]) -> Result<ModelWeights> {
        let weights: Vec<_> = batch.iter().map(|u| &u.weights).collect();
        aggregation::average(&weights)
    }

    fn log_failure(e: &AggregationErr, round: u64, discarded: usize) {
        match e {
            AggregationErr::EmptyInput => {
                error!(round = round; "averaged an empty batch after reaching quorum: {e}")
            }
            AggregationErr::ShapeMismatch { .. } => {
                warn!(round = round, discarded = discarded; "discarding round batch: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, thread};

    use super::*;
    use crate::model::Tensor;

    fn weights(values: &[f32]) -> ModelWeights {
        ModelWeights::new(vec![Tensor::vector(values.to_vec())])
    }

    fn coordinator(quorum: usize) -> AggregationCoordinator {
        let accumulator = Arc::new(RoundAccumulator::new(NonZeroUsize::new(quorum).unwrap()));
        let initial = GlobalModelState::new(0, weights(&[0., 0.]));
        let store = Arc::new(GlobalModelStore::new(initial));
        AggregationCoordinator::new(accumulator, store)
    }

    fn submit(coord: &AggregationCoordinator, id: &str, values: &[f32]) {
        coord
            .accumulator()
            .submit(ClientUpdate::new(id, weights(values), 0.1));
    }

    #[test]
    fn below_quorum_is_noop() {
        let coord = coordinator(3);
        submit(&coord, "a", &[1., 1.]);
        submit(&coord, "b", &[3., 3.]);

        let before = coord.store().read();
        assert_eq!(coord.maybe_aggregate(), Ok(None));

        assert_eq!(coord.accumulator().pending(), 2);
        assert!(Arc::ptr_eq(&before, &coord.store().read()));
    }

    #[test]
    fn quorum_publishes_average() {
        let coord = coordinator(2);
        submit(&coord, "a", &[1., 2.]);
        submit(&coord, "b", &[3., 4.]);

        let report = coord.maybe_aggregate().unwrap().unwrap();

        assert_eq!(report.round, 1);
        assert_eq!(report.participants, 2);
        assert_eq!(report.client_ids, ["a", "b"]);
        assert_eq!(coord.store().read().weights, weights(&[2., 3.]));
        assert_eq!(coord.accumulator().pending(), 0);
    }

    #[test]
    fn rounds_advance_by_one() {
        let coord = coordinator(1);

        for expected in 1..=5 {
            submit(&coord, "a", &[expected as f32, 0.]);
            let report = coord.maybe_aggregate().unwrap().unwrap();
            assert_eq!(report.round, expected);
            assert_eq!(coord.store().round(), expected);
        }
    }

    #[test]
    fn mismatch_discards_batch_and_keeps_round() {
        let coord = coordinator(2);
        submit(&coord, "a", &[1., 1.]);
        submit(&coord, "b", &[1., 1., 1.]);

        let err = coord.maybe_aggregate().unwrap_err();

        assert!(matches!(err, AggregationErr::ShapeMismatch { update: 1, .. }));
        assert_eq!(coord.store().round(), 0);
        assert_eq!(coord.store().read().weights, weights(&[0., 0.]));
        assert_eq!(coord.accumulator().pending(), 0);
    }

    #[test]
    fn concurrent_triggers_aggregate_once() {
        const TRIGGERS: usize = 16;

        let coord = Arc::new(coordinator(3));
        submit(&coord, "a", &[1., 1.]);
        submit(&coord, "b", &[3., 3.]);
        submit(&coord, "c", &[5., 5.]);

        let handles: Vec<_> = (0..TRIGGERS)
            .map(|_| {
                let coord = Arc::clone(&coord);
                thread::spawn(move || coord.maybe_aggregate())
            })
            .collect();

        let published = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .filter(Option::is_some)
            .count();

        assert_eq!(published, 1);
        assert_eq!(coord.store().round(), 1);
        assert_eq!(coord.store().read().weights, weights(&[3., 3.]));
    }
}
