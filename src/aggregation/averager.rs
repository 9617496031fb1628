use rayon::prelude::*;

use super::{AggregationErr, Result};
use crate::model::{ModelWeights, Tensor};

/// Computes the element-wise mean of every layer across all `updates` (FedAvg).
///
/// Every coordinate is summed in the order of `updates`, so repeated calls over the
/// same input yield bit-identical results regardless of how the layers get scheduled.
///
/// # Arguments
/// * `updates` - The weights contributed by each client.
///
/// # Returns
/// The averaged weights, `AggregationErr::EmptyInput` if `updates` is empty or
/// `AggregationErr::ShapeMismatch` if any update differs in structure from the first one.
pub fn average(updates: &[&ModelWeights]) -> Result<ModelWeights> {
    let Some((first, rest)) = updates.split_first() else {
        return Err(AggregationErr::EmptyInput);
    };

    for (i, update) in rest.iter().enumerate() {
        first
            .check_compatible(update)
            .map_err(|kind| AggregationErr::ShapeMismatch { update: i + 1, kind })?;
    }

    let n = updates.len() as f64;

    let layers = (0..first.len())
        .into_par_iter()
        .map(|layer| {
            let mut mean = Tensor::zeros(first.layers()[layer].shape());

            // Summed in f64 so finite inputs near f32::MAX can't overflow before dividing.
            let mut acc = vec![0f64; mean.len()];
            for update in updates {
                acc.iter_mut()
                    .zip(update.layers()[layer].data())
                    .for_each(|(s, &v)| *s += v as f64);
            }

            mean.data_mut()
                .iter_mut()
                .zip(acc)
                .for_each(|(m, s)| *m = (s / n) as f32);
            mean
        })
        .collect();

    Ok(ModelWeights::new(layers))
}
