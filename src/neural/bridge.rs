//! Bridging: turn a positional [`ParameterBundle`] into named, correctly
//! oriented tensors for the tch network.
//!
//! The transform is pure. The input bundle is never mutated and bridging the
//! same bundle twice yields bit-identical tensors; none of the outputs alias
//! the bundle's storage.

use tch::Tensor;

use crate::neural::bundle::{bundle_schema, ParameterBundle, Transform};
use crate::{GomokuError, Result};

/// Named tensors ready to be copied into a [`super::PolicyValueNet`]'s
/// VarStore, in schema order.
#[derive(Debug)]
pub struct BridgedNetwork {
    tensors: Vec<(&'static str, Tensor)>,
}

impl BridgedNetwork {
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors
            .iter()
            .find(|(target, _)| *target == name)
            .map(|(_, tensor)| tensor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Tensor)> {
        self.tensors.iter().map(|(name, tensor)| (*name, tensor))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

/// Reverse a convolution kernel along its two trailing spatial axes,
/// leaving the channel axes untouched.
pub fn flip_kernel(weight: &Tensor) -> Tensor {
    weight.flip([2, 3])
}

/// Reorient a dense weight from legacy `[in, out]` to tch `[out, in]`.
pub fn transpose_dense(weight: &Tensor) -> Tensor {
    weight.transpose(0, 1).contiguous()
}

/// Validate the bundle against the positional schema for the given board
/// dimensions and produce the bridged tensors.
///
/// Fails fast on the first mismatching position: an arity error if the
/// bundle does not hold exactly 16 arrays, otherwise a
/// [`GomokuError::BridgeShape`] naming position, role and both shapes.
pub fn bridge(bundle: &ParameterBundle, width: i64, height: i64) -> Result<BridgedNetwork> {
    let schema = bundle_schema(width, height);
    if bundle.len() != schema.len() {
        return Err(GomokuError::BundleArity {
            expected: schema.len(),
            actual: bundle.len(),
        });
    }

    let mut tensors = Vec::with_capacity(schema.len());
    for (position, (row, array)) in schema.iter().zip(bundle.arrays()).enumerate() {
        let actual = array.size();
        if actual != row.shape {
            return Err(GomokuError::BridgeShape {
                position,
                role: row.role,
                expected: row.shape.clone(),
                actual,
            });
        }
        let tensor = match row.transform {
            Transform::FlipKernel => flip_kernel(array),
            Transform::TransposeDense => transpose_dense(array),
            Transform::CopyBias => array.copy(),
        };
        tensors.push((row.target, tensor));
    }
    Ok(BridgedNetwork { tensors })
}
