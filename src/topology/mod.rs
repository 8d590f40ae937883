//! Network topology module.
//!
//! This module contains the node and link descriptors, the declarative
//! topology graph that enforces naming and reference invariants, and the
//! mobility schedule for wireless stations.

pub mod graph;
pub mod mobility;
pub mod types;

// Re-export key types for easier access
pub use graph::Topology;
pub use mobility::{Area, MobilityEntry, MobilitySchedule};
pub use types::{
    AccessPoint, Controller, Encryption, Host, LinkDescriptor, LinkParams, Nat, NodeDescriptor,
    NodeKind, NodeRole, Position, Station, Switch, TopologyError,
};
