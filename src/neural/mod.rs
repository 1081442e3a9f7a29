pub mod bridge;
pub mod bundle;
pub mod encoding;
pub mod policy_value_net;

pub use bridge::{bridge, BridgedNetwork};
pub use bundle::ParameterBundle;
pub use policy_value_net::{Evaluator, PolicyValueNet};
