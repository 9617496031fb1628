use std::{mem, num::NonZeroUsize};

use parking_lot::Mutex;

use crate::model::ClientUpdate;

/// The outcome of accepting a client update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitResult {
    /// The amount of updates pending for the current round, including this one.
    pub accepted_count: usize,
}

/// Collects the client updates of the in-flight round and decides when it may close.
#[derive(Debug)]
pub struct RoundAccumulator {
    quorum: NonZeroUsize,
    pending: Mutex<Vec<ClientUpdate>>,
}

impl RoundAccumulator {
    /// Creates a new `RoundAccumulator`.
    ///
    /// # Arguments
    /// * `quorum` - The minimum amount of updates required before a round can be aggregated.
    pub fn new(quorum: NonZeroUsize) -> Self {
        Self {
            quorum,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Appends `update` to the pending updates.
    ///
    /// The update is always accepted, whether the quorum is already reached or not.
    ///
    /// # Arguments
    /// * `update` - The client update to add to the current round.
    ///
    /// # Returns
    /// The amount of pending updates after appending this one.
    pub fn submit(&self, update: ClientUpdate) -> SubmitResult {
        let mut pending = self.pending.lock();
        pending.push(update);

        SubmitResult {
            accepted_count: pending.len(),
        }
    }

    /// Whether there are at least `quorum` pending updates.
    pub fn is_quorum_reached(&self) -> bool {
        self.pending.lock().len() >= self.quorum.get()
    }

    /// Takes every pending update, leaving the accumulator empty.
    ///
    /// # Returns
    /// The pending updates in the order they were submitted.
    pub fn drain(&self) -> Vec<ClientUpdate> {
        mem::take(&mut *self.pending.lock())
    }

    /// Returns the amount of pending updates.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn quorum(&self) -> usize {
        self.quorum.get()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::model::{ModelWeights, Tensor};

    fn update(id: usize) -> ClientUpdate {
        let weights = ModelWeights::new(vec![Tensor::vector(vec![id as f32])]);
        ClientUpdate::new(id.to_string(), weights, 0.)
    }

    fn accumulator(quorum: usize) -> RoundAccumulator {
        RoundAccumulator::new(NonZeroUsize::new(quorum).unwrap())
    }

    #[test]
    fn submit_counts_pending() {
        let acc = accumulator(3);

        assert_eq!(acc.submit(update(0)).accepted_count, 1);
        assert_eq!(acc.submit(update(1)).accepted_count, 2);
        assert_eq!(acc.pending(), 2);
    }

    #[test]
    fn quorum_threshold() {
        let acc = accumulator(2);
        assert!(!acc.is_quorum_reached());

        acc.submit(update(0));
        assert!(!acc.is_quorum_reached());

        acc.submit(update(1));
        assert!(acc.is_quorum_reached());

        acc.submit(update(2));
        assert!(acc.is_quorum_reached());
    }

    #[test]
    fn drain_keeps_order_and_empties() {
        let acc = accumulator(1);
        (0..5).for_each(|i| {
            acc.submit(update(i));
        });

        let ids: Vec<_> = acc.drain().into_iter().map(|u| u.client_id).collect();
        assert_eq!(ids, ["0", "1", "2", "3", "4"]);
        assert_eq!(acc.pending(), 0);
        assert!(acc.drain().is_empty());
    }

    #[test]
    fn concurrent_submit_and_drain_lose_nothing() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 500;

        let acc = Arc::new(accumulator(1));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let acc = Arc::clone(&acc);
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        acc.submit(update(p * PER_PRODUCER + i));
                    }
                })
            })
            .collect();

        let drainer = {
            let acc = Arc::clone(&acc);
            thread::spawn(move || {
                let mut drains = Vec::new();
                for _ in 0..200 {
                    drains.push(acc.drain());
                    thread::yield_now();
                }
                drains
            })
        };

        producers.into_iter().for_each(|p| p.join().unwrap());
        let mut drains = drainer.join().unwrap();
        drains.push(acc.drain());

        let mut seen = vec![0usize; PRODUCERS * PER_PRODUCER];
        for drain in &drains {
            let mut last_per_producer = vec![None; PRODUCERS];

            for u in drain {
                let id: usize = u.client_id.parse().unwrap();
                seen[id] += 1;

                // Every producer submits in increasing order, a drain must preserve it.
                let producer = id / PER_PRODUCER;
                if let Some(last) = last_per_producer[producer] {
                    assert!(id > last);
                }
                last_per_producer[producer] = Some(id);
            }
        }

        assert!(seen.iter().all(|&count| count == 1));
    }
}
