//! The legacy parameter bundle and its positional schema.
//!
//! The original training pipeline persisted the network as a flat ordered
//! list of 16 numpy arrays. That positional contract is fragile, so it is
//! written down once here as an explicit schema table (role, target tensor
//! name, transform, expected shape) and validated eagerly at load time.
//!
//! On disk the bundle is a safetensors file with keys `param_0` ...
//! `param_15` preserving the legacy order (the pickle is converted offline;
//! safetensors survives libtorch upgrades and needs no Python to read).

use safetensors::tensor::{Dtype, SafeTensors, TensorView};
use std::path::Path;
use tch::Tensor;

use crate::{GomokuError, Result};

/// Number of arrays in a well-formed bundle.
pub const BUNDLE_LEN: usize = 16;

/// How a bundle array must be reoriented for the tch network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Convolution weight: reverse the two trailing spatial axes. The legacy
    /// engine computed true convolution while tch computes cross-correlation;
    /// flipping the kernel once at load time makes both numerically identical.
    FlipKernel,
    /// Dense weight: legacy stores `[in_features, out_features]`, tch linear
    /// wants `[out_features, in_features]`.
    TransposeDense,
    /// Bias vectors are copied unchanged.
    CopyBias,
}

/// One row of the positional schema.
#[derive(Debug)]
pub struct SchemaRow {
    /// Human-readable role, used in error messages.
    pub role: &'static str,
    /// Variable name inside the target network's VarStore.
    pub target: &'static str,
    pub transform: Transform,
    /// Expected shape for the deployed board dimensions.
    pub shape: Vec<i64>,
}

/// The full 16-position schema for a `width` × `height` board.
///
/// Order: three shared 3×3 conv layers, policy-head 1×1 conv, policy-head
/// dense, value-head 1×1 conv, two value-head dense layers; weight before
/// bias throughout.
pub fn bundle_schema(width: i64, height: i64) -> Vec<SchemaRow> {
    use Transform::*;
    let cells = width * height;
    let row = |role, target, transform, shape| SchemaRow {
        role,
        target,
        transform,
        shape,
    };
    vec![
        row("conv1 weight", "conv1.weight", FlipKernel, vec![32, 4, 3, 3]),
        row("conv1 bias", "conv1.bias", CopyBias, vec![32]),
        row("conv2 weight", "conv2.weight", FlipKernel, vec![64, 32, 3, 3]),
        row("conv2 bias", "conv2.bias", CopyBias, vec![64]),
        row("conv3 weight", "conv3.weight", FlipKernel, vec![128, 64, 3, 3]),
        row("conv3 bias", "conv3.bias", CopyBias, vec![128]),
        row(
            "policy conv weight",
            "policy_conv.weight",
            FlipKernel,
            vec![4, 128, 1, 1],
        ),
        row("policy conv bias", "policy_conv.bias", CopyBias, vec![4]),
        row(
            "policy dense weight",
            "policy_fc.weight",
            TransposeDense,
            vec![4 * cells, cells],
        ),
        row("policy dense bias", "policy_fc.bias", CopyBias, vec![cells]),
        row(
            "value conv weight",
            "value_conv.weight",
            FlipKernel,
            vec![2, 128, 1, 1],
        ),
        row("value conv bias", "value_conv.bias", CopyBias, vec![2]),
        row(
            "value dense-1 weight",
            "value_fc1.weight",
            TransposeDense,
            vec![2 * cells, 64],
        ),
        row("value dense-1 bias", "value_fc1.bias", CopyBias, vec![64]),
        row(
            "value dense-2 weight",
            "value_fc2.weight",
            TransposeDense,
            vec![64, 1],
        ),
        row("value dense-2 bias", "value_fc2.bias", CopyBias, vec![1]),
    ]
}

/// Ordered sequence of raw parameter arrays, exactly as the legacy pipeline
/// wrote them. Orientation is fixed later by [`crate::neural::bridge`].
#[derive(Debug)]
pub struct ParameterBundle {
    arrays: Vec<Tensor>,
}

impl ParameterBundle {
    /// Wrap in-memory arrays in legacy order.
    pub fn from_tensors(arrays: Vec<Tensor>) -> ParameterBundle {
        ParameterBundle { arrays }
    }

    /// Read a bundle from a safetensors file with `param_<i>` keys.
    ///
    /// Missing file, unparsable content or a gap in the key sequence all
    /// surface as [`GomokuError::ModelLoad`]; shape problems are left for
    /// the bridge so they carry the offending position.
    pub fn load(path: impl AsRef<Path>) -> Result<ParameterBundle> {
        let path = path.as_ref();
        let buffer = std::fs::read(path)
            .map_err(|e| GomokuError::ModelLoad(format!("cannot read {}: {e}", path.display())))?;
        let tensors = SafeTensors::deserialize(&buffer)
            .map_err(|e| GomokuError::ModelLoad(format!("corrupt bundle {}: {e}", path.display())))?;

        let count = tensors.names().len();
        let mut arrays = Vec::with_capacity(count);
        for position in 0..count {
            let key = format!("param_{position}");
            let view = tensors.tensor(&key).map_err(|_| {
                GomokuError::ModelLoad(format!(
                    "bundle {} holds {count} arrays but key {key} is missing",
                    path.display()
                ))
            })?;
            arrays.push(view_to_tensor(&view)?);
        }
        Ok(ParameterBundle { arrays })
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn arrays(&self) -> &[Tensor] {
        &self.arrays
    }
}

fn view_to_tensor(view: &TensorView) -> Result<Tensor> {
    let shape: Vec<i64> = view.shape().iter().map(|&x| x as i64).collect();
    let data = view.data();

    match view.dtype() {
        Dtype::F32 => {
            let floats: Vec<f32> = data
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            Ok(Tensor::from_slice(&floats).reshape(&shape))
        }
        Dtype::F64 => {
            // Legacy numpy arrays are f64; the network runs in f32.
            let floats: Vec<f32> = data
                .chunks_exact(8)
                .map(|chunk| {
                    f64::from_le_bytes([
                        chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6],
                        chunk[7],
                    ]) as f32
                })
                .collect();
            Ok(Tensor::from_slice(&floats).reshape(&shape))
        }
        other => Err(GomokuError::ModelLoad(format!(
            "unsupported dtype in bundle: {other:?}"
        ))),
    }
}
