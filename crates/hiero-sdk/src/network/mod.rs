//! Network topology: the node registry

mod registry;

pub use registry::{NodeAddress, NodeHealth, NodeRegistry};
