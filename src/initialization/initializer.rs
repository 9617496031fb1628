use super::{InitErr, ParamGen, Result};
use crate::model::{ModelWeights, Tensor};

/// Builds a `ModelWeights` with a fixed layer layout out of a `ParamGen`.
#[derive(Debug, Clone)]
pub struct ModelInitializer {
    shapes: Vec<Vec<usize>>,
}

impl ModelInitializer {
    /// Creates a new `ModelInitializer`.
    ///
    /// # Arguments
    /// * `shapes` - The shape of every layer, in order.
    pub fn new(shapes: Vec<Vec<usize>>) -> Self {
        Self { shapes }
    }

    /// Returns the total amount of parameters across all layers.
    pub fn params(&self) -> usize {
        self.shapes.iter().map(|s| s.iter().product::<usize>()).sum()
    }

    /// Fills every layer with values sampled from `param_gen`.
    ///
    /// # Arguments
    /// * `param_gen` - Where the values come from, sampled layer after layer.
    ///
    /// # Returns
    /// The new weights or `InitErr::Exhausted` if `param_gen` runs dry.
    pub fn build(&self, param_gen: &mut dyn ParamGen) -> Result<ModelWeights> {
        let layers = self
            .shapes
            .iter()
            .enumerate()
            .map(|(layer, shape)| {
                let data = param_gen
                    .fill(shape.iter().product())
                    .ok_or(InitErr::Exhausted { layer })?;

                Tensor::new(shape.clone(), data).map_err(|_| InitErr::Exhausted { layer })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ModelWeights::new(layers))
    }
}
