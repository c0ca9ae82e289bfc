//! The classification network and its evaluation functions.

pub mod metrics;
pub mod net;

pub use metrics::{MetricRegistry, REQUIRED_METRICS, cross_entropy_loss, custom_loss, top1_acc};
pub use net::{MainNet, MainNetConfig};
