//! # Emulation Runtime Module
//!
//! The emulation runtime (Mininet or Mininet-WiFi) owns everything that
//! happens once a lab is running: forwarding, radio propagation, controller
//! sessions and position updates. This module defines the narrow API the
//! lab builder drives it through.
//!
//! ## Backends
//!
//! - `recorder.rs`: in-memory rehearsal that enforces the lifecycle
//!   `Declaring -> Built -> Running -> Stopped` and rejects references to
//!   undeclared nodes, recording a serializable transcript.
//! - `mininet.rs`: renders the calls into a Python launcher for Mininet or
//!   Mininet-WiFi, which is what actually brings the lab up.
//!
//! Every call that names a node fails with [`RuntimeError::UnknownNode`]
//! when that node was never declared.

pub mod mininet;
pub mod recorder;

pub use mininet::MininetScript;
pub use recorder::{RecordingRuntime, RuntimeCall, RuntimeState};

use crate::config::PropagationModel;
use crate::topology::{LinkDescriptor, MobilitySchedule, NodeDescriptor};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Interference medium settings for wireless labs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WirelessMedium {
    /// Noise threshold in dBm
    pub noise_threshold: i32,
}

/// A ping issued from one node towards an address once the lab runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingCheck {
    pub from: String,
    /// Name of the target node, for display
    pub target: String,
    pub target_ip: Ipv4Addr,
    pub count: u32,
}

/// Errors reported by a runtime backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Node '{0}' has not been declared")]
    UnknownNode(String),
    #[error("Node '{0}' is declared twice")]
    DuplicateNode(String),
    #[error("Cannot {action} while the network is {state:?}")]
    InvalidState { action: &'static str, state: RuntimeState },
    #[error("Node '{node}' cannot be used as {expected}")]
    WrongRole { node: String, expected: &'static str },
}

/// Collaborator API of the external emulation runtime
pub trait EmulationRuntime {
    fn set_wireless_medium(&mut self, medium: &WirelessMedium) -> Result<(), RuntimeError>;
    fn add_node(&mut self, node: &NodeDescriptor) -> Result<(), RuntimeError>;
    fn add_link(&mut self, link: &LinkDescriptor) -> Result<(), RuntimeError>;
    fn set_propagation_model(&mut self, model: &PropagationModel) -> Result<(), RuntimeError>;
    fn configure_wifi_nodes(&mut self) -> Result<(), RuntimeError>;
    fn build(&mut self) -> Result<(), RuntimeError>;
    fn start_controller(&mut self, controller: &str) -> Result<(), RuntimeError>;
    /// Start a switch or access point against the given controllers
    fn start_switch(&mut self, switch: &str, controllers: &[String]) -> Result<(), RuntimeError>;
    /// Install the default NAT rules on a NAT node
    fn configure_nat(&mut self, nat: &str) -> Result<(), RuntimeError>;
    fn host_command(&mut self, host: &str, command: &str) -> Result<(), RuntimeError>;
    fn schedule_mobility(&mut self, schedule: &MobilitySchedule) -> Result<(), RuntimeError>;
    fn wait(&mut self, duration: Duration) -> Result<(), RuntimeError>;
    fn ping(&mut self, check: &PingCheck) -> Result<(), RuntimeError>;
    /// Show instructional text to the student
    fn announce(&mut self, text: &str) -> Result<(), RuntimeError>;
    /// Hand the running network to an interactive session
    fn interact(&mut self) -> Result<(), RuntimeError>;
    fn stop(&mut self) -> Result<(), RuntimeError>;
}
