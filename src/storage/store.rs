use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::model::GlobalModelState;

/// Holds the single published `GlobalModelState`.
///
/// Readers get an `Arc` snapshot, so the lock is only held for the pointer clone or swap
/// and a read never waits on an in-flight aggregation.
#[derive(Debug)]
pub struct GlobalModelStore {
    state: RwLock<Arc<GlobalModelState>>,
    rounds: watch::Sender<u64>,
}

impl GlobalModelStore {
    /// Creates a new `GlobalModelStore`.
    ///
    /// # Arguments
    /// * `initial` - The state published before any aggregation took place.
    pub fn new(initial: GlobalModelState) -> Self {
        let (rounds, _) = watch::channel(initial.round);

        Self {
            state: RwLock::new(Arc::new(initial)),
            rounds,
        }
    }

    /// Returns a consistent snapshot of the published state.
    pub fn read(&self) -> Arc<GlobalModelState> {
        Arc::clone(&self.state.read())
    }

    /// Returns the round of the published state.
    pub fn round(&self) -> u64 {
        self.state.read().round
    }

    /// Replaces the published state with `next`.
    ///
    /// # Arguments
    /// * `next` - The new global state, its round must follow the current one.
    pub(crate) fn publish(&self, next: GlobalModelState) {
        let round = next.round;

        {
            let mut state = self.state.write();
            debug_assert_eq!(round, state.round + 1, "rounds must advance by one");
            *state = Arc::new(next);
        }

        self.rounds.send_replace(round);
    }

    /// Subscribes to the round number of every future publication.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rounds.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelWeights, Tensor};

    fn state(round: u64, value: f32) -> GlobalModelState {
        let weights = ModelWeights::new(vec![Tensor::vector(vec![value; 2])]);
        GlobalModelState::new(round, weights)
    }

    #[test]
    fn publish_replaces_state() {
        let store = GlobalModelStore::new(state(0, 0.));
        let before = store.read();

        store.publish(state(1, 1.));

        assert_eq!(before.round, 0);
        assert_eq!(*before, state(0, 0.));
        assert_eq!(*store.read(), state(1, 1.));
        assert_eq!(store.round(), 1);
    }

    #[test]
    fn subscribers_see_rounds() {
        let store = GlobalModelStore::new(state(0, 0.));
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow_and_update(), 0);

        store.publish(state(1, 1.));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
