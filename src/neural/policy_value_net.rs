//! Fixed-topology policy-value network holding the bridged weights.
//!
//! Topology (frozen, matches the legacy bundle): three 3×3 same-padding
//! convolutions 4→32→64→128 with ReLU; policy head 1×1 conv to 4 channels,
//! flatten, dense to width·height, log-softmax; value head 1×1 conv to 2
//! channels, flatten, dense to 64, dense to 1, tanh.

use tch::{nn, Device, Kind, Tensor};

use crate::game::Board;
use crate::neural::bridge::BridgedNetwork;
use crate::neural::encoding::board_to_tensor;
use crate::{GomokuError, Result};

/// Capability boundary between the network and everything that consumes
/// evaluations. The orchestrator and the search never see tch types.
///
/// `evaluate` returns `(move, probability)` pairs restricted to the board's
/// available moves (probabilities from the full policy output, not
/// renormalized) and a scalar position value in [-1, 1] from the current
/// player's perspective.
///
/// Note: tch tensors are not Sync, so concrete implementations go behind a
/// Mutex when shared across request handlers.
pub trait Evaluator: Send {
    fn evaluate(&self, board: &Board) -> Result<(Vec<(usize, f64)>, f64)>;
}

#[derive(Debug)]
pub struct PolicyValueNet {
    #[allow(dead_code)] // owns the weights the layers reference
    vs: nn::VarStore,
    conv1: nn::Conv2D,
    conv2: nn::Conv2D,
    conv3: nn::Conv2D,
    policy_conv: nn::Conv2D,
    policy_fc: nn::Linear,
    value_conv: nn::Conv2D,
    value_fc1: nn::Linear,
    value_fc2: nn::Linear,
    width: i64,
    height: i64,
}

impl PolicyValueNet {
    /// Build the layer structure with freshly initialized weights. Variable
    /// names line up with the bridge schema targets.
    pub fn new(width: usize, height: usize) -> PolicyValueNet {
        let (width, height) = (width as i64, height as i64);
        let cells = width * height;
        let vs = nn::VarStore::new(Device::Cpu);
        let p = vs.root();

        let padded = nn::ConvConfig {
            padding: 1,
            ..Default::default()
        };
        let conv1 = nn::conv2d(&p / "conv1", 4, 32, 3, padded);
        let conv2 = nn::conv2d(&p / "conv2", 32, 64, 3, padded);
        let conv3 = nn::conv2d(&p / "conv3", 64, 128, 3, padded);

        let policy_conv = nn::conv2d(&p / "policy_conv", 128, 4, 1, Default::default());
        let policy_fc = nn::linear(&p / "policy_fc", 4 * cells, cells, Default::default());

        let value_conv = nn::conv2d(&p / "value_conv", 128, 2, 1, Default::default());
        let value_fc1 = nn::linear(&p / "value_fc1", 2 * cells, 64, Default::default());
        let value_fc2 = nn::linear(&p / "value_fc2", 64, 1, Default::default());

        PolicyValueNet {
            vs,
            conv1,
            conv2,
            conv3,
            policy_conv,
            policy_fc,
            value_conv,
            value_fc1,
            value_fc2,
            width,
            height,
        }
    }

    /// Build the network and install bridged weights, overwriting every
    /// variable in the store. The bridged tensors were shape-checked against
    /// the schema already, so a miss here means the schema and the layer
    /// structure drifted apart.
    pub fn from_bridged(width: usize, height: usize, bridged: &BridgedNetwork) -> Result<PolicyValueNet> {
        let net = PolicyValueNet::new(width, height);
        for (name, mut var) in net.vs.variables() {
            let source = bridged.get(&name).ok_or_else(|| {
                GomokuError::ModelLoad(format!("bridged network lacks tensor {name}"))
            })?;
            if var.size() != source.size() {
                return Err(GomokuError::ModelLoad(format!(
                    "bridged tensor {name} has shape {:?}, layer wants {:?}",
                    source.size(),
                    var.size()
                )));
            }
            tch::no_grad(|| var.copy_(source));
        }
        Ok(net)
    }

    /// Raw forward pass: `(log-probabilities [1, cells], value [1, 1])`.
    fn forward(&self, input: &Tensor) -> (Tensor, Tensor) {
        let cells = self.width * self.height;
        let shared = input
            .apply(&self.conv1)
            .relu()
            .apply(&self.conv2)
            .relu()
            .apply(&self.conv3)
            .relu();

        let log_probs = shared
            .apply(&self.policy_conv)
            .relu()
            .view([-1, 4 * cells])
            .apply(&self.policy_fc)
            .log_softmax(-1, Kind::Float);

        let value = shared
            .apply(&self.value_conv)
            .relu()
            .view([-1, 2 * cells])
            .apply(&self.value_fc1)
            .relu()
            .apply(&self.value_fc2)
            .tanh();

        (log_probs, value)
    }
}

impl Evaluator for PolicyValueNet {
    fn evaluate(&self, board: &Board) -> Result<(Vec<(usize, f64)>, f64)> {
        let input = board_to_tensor(board);
        let (log_probs, value) = tch::no_grad(|| self.forward(&input));

        let probs = Vec::<f32>::try_from(&log_probs.exp().view([-1]))?;
        let pairs = board
            .availables()
            .iter()
            .map(|&mv| (mv, probs[mv] as f64))
            .collect();
        Ok((pairs, value.double_value(&[0, 0])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::bridge::{bridge, transpose_dense};
    use crate::neural::bundle::{bundle_schema, ParameterBundle, Transform};
    use tch::{Device, Kind};

    fn bridged_net(width: usize, height: usize) -> PolicyValueNet {
        let arrays = bundle_schema(width as i64, height as i64)
            .iter()
            .map(|row| Tensor::rand(&row.shape, (Kind::Float, Device::Cpu)) * 0.1)
            .collect();
        let bundle = ParameterBundle::from_tensors(arrays);
        let bridged = bridge(&bundle, width as i64, height as i64).unwrap();
        PolicyValueNet::from_bridged(width, height, &bridged).unwrap()
    }

    #[test]
    fn evaluation_on_empty_board_is_a_distribution() {
        let net = bridged_net(8, 8);
        let board = Board::new(8, 8, 5);
        let (pairs, value) = net.evaluate(&board).unwrap();

        assert_eq!(pairs.len(), 64);
        let total: f64 = pairs.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-4, "probs sum to {total}");
        assert!((-1.0..=1.0).contains(&value));
    }

    #[test]
    fn evaluation_is_restricted_to_availables() {
        let net = bridged_net(8, 8);
        let board = Board::replay(8, 8, 5, &[27, 36, 12]).unwrap();
        let (pairs, _) = net.evaluate(&board).unwrap();

        assert_eq!(pairs.len(), 61);
        assert!(pairs.iter().all(|&(mv, _)| board.stone_at(mv).is_none()));
        // Not renormalized: the occupied cells' mass is simply missing.
        let total: f64 = pairs.iter().map(|(_, p)| p).sum();
        assert!(total < 1.0 + 1e-6);
    }

    #[test]
    fn evaluation_is_pure() {
        let net = bridged_net(8, 8);
        let board = Board::replay(8, 8, 5, &[27]).unwrap();
        let (pairs_a, value_a) = net.evaluate(&board).unwrap();
        let (pairs_b, value_b) = net.evaluate(&board).unwrap();
        assert_eq!(pairs_a, pairs_b);
        assert_eq!(value_a, value_b);
    }

    #[test]
    fn bridged_weights_reach_the_layers() {
        // A dense weight installed through the bridge must equal the legacy
        // array transposed.
        let arrays: Vec<Tensor> = bundle_schema(8, 8)
            .iter()
            .map(|row| Tensor::rand(&row.shape, (Kind::Float, Device::Cpu)))
            .collect();
        let expected = transpose_dense(&arrays[14]);
        let bundle = ParameterBundle::from_tensors(arrays);
        let bridged = bridge(&bundle, 8, 8).unwrap();
        let net = PolicyValueNet::from_bridged(8, 8, &bridged).unwrap();

        let installed = net
            .vs
            .variables()
            .into_iter()
            .find(|(name, _)| name == "value_fc2.weight")
            .map(|(_, t)| t)
            .unwrap();
        assert_eq!(
            Vec::<f32>::try_from(&installed.contiguous().view([-1])).unwrap(),
            Vec::<f32>::try_from(&expected.view([-1])).unwrap()
        );
    }

    #[test]
    fn schema_matches_the_layer_structure() {
        let net = PolicyValueNet::new(8, 8);
        let schema = bundle_schema(8, 8);
        for row in &schema {
            let var = net
                .vs
                .variables()
                .into_iter()
                .find(|(name, _)| name == row.target);
            let (_, var) = var.unwrap_or_else(|| panic!("no variable named {}", row.target));
            let expected = match row.transform {
                Transform::TransposeDense => {
                    vec![row.shape[1], row.shape[0]]
                }
                _ => row.shape.clone(),
            };
            assert_eq!(var.size(), expected, "{}", row.target);
        }
    }
}
