use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as _,
    ser::SerializeSeq,
};

use super::{Result, TensorErr};

/// A dense row-major tensor of `f32` values.
///
/// On the wire a tensor is a nested JSON array whose nesting depth is its rank,
/// e.g. a `(2, 3)` layer is `[[a, b, c], [d, e, f]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new `Tensor`.
    ///
    /// # Arguments
    /// * `shape` - The size of every dimension, outermost first.
    /// * `data` - The row-major values of the tensor.
    ///
    /// # Returns
    /// A `TensorErr` if `data` doesn't hold exactly as many values as `shape` describes.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();

        if expected != data.len() {
            return Err(TensorErr::DataLength {
                expected,
                got: data.len(),
            });
        }

        Ok(Self { shape, data })
    }

    /// Creates a rank one tensor out of `values`.
    pub fn vector(values: Vec<f32>) -> Self {
        Self {
            shape: vec![values.len()],
            data: values,
        }
    }

    /// Creates a tensor of the given shape filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        let len = shape.iter().product();

        Self {
            shape: shape.to_vec(),
            data: vec![0.; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the values, the shape stays fixed.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the amount of scalar values held by this tensor.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A borrowed view over a sub tensor, used to serialize the nesting recursively.
struct NestedView<'a> {
    shape: &'a [usize],
    data: &'a [f32],
}

impl Serialize for NestedView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let Some((&outer, inner)) = self.shape.split_first() else {
            return serializer.serialize_f32(self.data[0]);
        };

        let stride: usize = inner.iter().product();
        let mut seq = serializer.serialize_seq(Some(outer))?;

        for i in 0..outer {
            seq.serialize_element(&NestedView {
                shape: inner,
                data: &self.data[i * stride..(i + 1) * stride],
            })?;
        }

        seq.end()
    }
}

impl Serialize for Tensor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        NestedView {
            shape: &self.shape,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

/// The raw nested form of a tensor as it arrives from a client.
#[derive(Deserialize)]
#[serde(untagged)]
enum Nested {
    Scalar(f64),
    Array(Vec<Nested>),
}

impl Nested {
    /// Infers the shape from the first element at every depth.
    fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut curr = self;

        while let Nested::Array(items) = curr {
            shape.push(items.len());
            match items.first() {
                Some(first) => curr = first,
                None => break,
            }
        }

        shape
    }

    /// Flattens `self` into `out`, checking it conforms to `shape` at every depth.
    fn flatten_into(self, shape: &[usize], depth: usize, out: &mut Vec<f32>) -> Result<()> {
        match (self, shape.split_first()) {
            (Nested::Scalar(value), None) => {
                if !value.is_finite() || value.abs() > f32::MAX as f64 {
                    return Err(TensorErr::OutOfRange { value });
                }

                out.push(value as f32);
                Ok(())
            }
            (Nested::Array(items), Some((&len, inner))) if items.len() == len => items
                .into_iter()
                .try_for_each(|item| item.flatten_into(inner, depth + 1, out)),
            (Nested::Array(items), Some((&len, _))) => Err(TensorErr::Ragged {
                depth,
                expected: len,
                got: items.len(),
            }),
            _ => Err(TensorErr::MixedNesting { depth }),
        }
    }
}

impl TryFrom<Nested> for Tensor {
    type Error = TensorErr;

    fn try_from(nested: Nested) -> Result<Self> {
        let shape = nested.shape();
        let mut data = Vec::with_capacity(shape.iter().product());
        nested.flatten_into(&shape, 0, &mut data)?;
        Tensor::new(shape, data)
    }
}

impl<'de> Deserialize<'de> for Tensor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let nested = Nested::deserialize(deserializer)?;
        Tensor::try_from(nested).map_err(D::Error::custom)
    }
}
