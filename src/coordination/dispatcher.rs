use std::sync::Arc;

use log::{debug, error, info};
use tokio::{
    sync::mpsc,
    task::{self, JoinHandle},
};

use super::AggregationCoordinator;

/// The sending end used to request an aggregation attempt.
///
/// Triggering never waits on the aggregation itself, the attempt runs on the dispatcher task.
#[derive(Debug, Clone)]
pub struct AggregationTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl AggregationTrigger {
    /// Returns `true` once the dispatcher has stopped and no attempt can run anymore.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Enqueues an aggregation attempt.
    ///
    /// # Returns
    /// `false` if the dispatcher is no longer running.
    pub fn trigger(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// A single consumer task running every queued aggregation attempt, one at a time.
pub struct AggregationDispatcher {
    task: JoinHandle<()>,
}

impl AggregationDispatcher {
    /// Spawns the dispatcher task on the current runtime.
    ///
    /// # Arguments
    /// * `coordinator` - The coordinator whose `maybe_aggregate` gets called on every trigger.
    ///
    /// # Returns
    /// The dispatcher and the trigger to feed it. The task stops once every trigger clone is dropped.
    pub fn spawn(coordinator: Arc<AggregationCoordinator>) -> (Self, AggregationTrigger) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run(coordinator, rx));

        (Self { task }, AggregationTrigger { tx })
    }

    /// Waits until every queued trigger has been processed and the task exits.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("aggregation dispatcher stopped abnormally: {e}");
        }
    }

    async fn run(coordinator: Arc<AggregationCoordinator>, mut rx: mpsc::UnboundedReceiver<()>) {
        while rx.recv().await.is_some() {
            let coordinator = Arc::clone(&coordinator);

            // Averaging is CPU-bound, keep it off the async workers.
            match task::spawn_blocking(move || coordinator.maybe_aggregate()).await {
                Ok(Ok(Some(report))) => {
                    debug!(round = report.round; "round closed by {:?}", report.client_ids)
                }
                // Failures are logged by the coordinator along with the discarded batch.
                Ok(Ok(None)) | Ok(Err(_)) => {}
                Err(e) => error!("aggregation task panicked: {e}"),
            }
        }

        info!("aggregation dispatcher stopped");
    }
}
