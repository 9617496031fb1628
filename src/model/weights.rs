use serde::{Deserialize, Serialize};

use super::{MismatchKind, Tensor};

/// The ordered set of layer tensors that make up a model.
///
/// The layer order is agreed with the clients out of band, the server never
/// interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelWeights(Vec<Tensor>);

impl ModelWeights {
    /// Creates a new `ModelWeights`.
    ///
    /// # Arguments
    /// * `layers` - The tensors of every layer, in order.
    pub fn new(layers: Vec<Tensor>) -> Self {
        Self(layers)
    }

    pub fn layers(&self) -> &[Tensor] {
        &self.0
    }

    /// Returns the amount of layers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the total amount of scalar parameters across all layers.
    pub fn params(&self) -> usize {
        self.0.iter().map(Tensor::len).sum()
    }

    /// Returns the shape of every layer.
    pub fn shapes(&self) -> Vec<Vec<usize>> {
        self.0.iter().map(|t| t.shape().to_vec()).collect()
    }

    /// Checks that `other` has the same layer count and layer shapes as `self`.
    ///
    /// # Arguments
    /// * `other` - The weights to compare against `self`.
    ///
    /// # Returns
    /// The first structural difference found, if any.
    pub fn check_compatible(&self, other: &ModelWeights) -> Result<(), MismatchKind> {
        if self.len() != other.len() {
            return Err(MismatchKind::LayerCount {
                expected: self.len(),
                got: other.len(),
            });
        }

        let mismatch = self
            .0
            .iter()
            .zip(&other.0)
            .position(|(a, b)| a.shape() != b.shape());

        match mismatch {
            Some(layer) => Err(MismatchKind::LayerShape {
                layer,
                expected: self.0[layer].shape().to_vec(),
                got: other.0[layer].shape().to_vec(),
            }),
            None => Ok(()),
        }
    }
}
