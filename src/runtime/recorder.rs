//! In-memory rehearsal runtime.
//!
//! Every lab is deployed against this backend before a launcher is
//! rendered, so ordering mistakes and dangling references surface as
//! errors here instead of as Python tracebacks inside the emulator.

use super::{EmulationRuntime, PingCheck, RuntimeError, WirelessMedium};
use crate::config::PropagationModel;
use crate::topology::{LinkDescriptor, MobilitySchedule, NodeDescriptor, NodeKind};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Lifecycle of the emulated network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    Declaring,
    Built,
    Running,
    Stopped,
}

/// One recorded runtime call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RuntimeCall {
    SetWirelessMedium { noise_threshold: i32 },
    AddNode { name: String },
    AddLink { a: String, b: String },
    SetPropagationModel { model: String, exp: f64 },
    ConfigureWifiNodes,
    Build,
    StartController { name: String },
    StartSwitch { name: String, controllers: Vec<String> },
    ConfigureNat { name: String },
    HostCommand { host: String, command: String },
    ScheduleMobility { stations: Vec<String>, stop_time: u32 },
    Wait { seconds: f64 },
    Ping { from: String, target: String, count: u32 },
    Announce { text: String },
    Interact,
    Stop,
}

#[derive(Debug)]
pub struct RecordingRuntime {
    state: RuntimeState,
    nodes: HashMap<String, NodeKind>,
    calls: Vec<RuntimeCall>,
    waited: Duration,
}

impl Default for RecordingRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self {
            state: RuntimeState::Declaring,
            nodes: HashMap::new(),
            calls: Vec::new(),
            waited: Duration::ZERO,
        }
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    /// Total time the lifecycle spends in explicit waits
    pub fn waited(&self) -> Duration {
        self.waited
    }

    pub fn count_calls(&self, pred: impl Fn(&RuntimeCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn require(&self, action: &'static str, allowed: &[RuntimeState]) -> Result<(), RuntimeError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RuntimeError::InvalidState { action, state: self.state })
        }
    }

    fn kind_of(&self, name: &str) -> Result<NodeKind, RuntimeError> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UnknownNode(name.to_string()))
    }

    fn require_kind(
        &self,
        name: &str,
        expected: &'static str,
        accept: impl Fn(NodeKind) -> bool,
    ) -> Result<(), RuntimeError> {
        if accept(self.kind_of(name)?) {
            Ok(())
        } else {
            Err(RuntimeError::WrongRole { node: name.to_string(), expected })
        }
    }

    fn record(&mut self, call: RuntimeCall) -> Result<(), RuntimeError> {
        log::debug!("runtime call: {:?}", call);
        self.calls.push(call);
        Ok(())
    }
}

const UP: &[RuntimeState] = &[RuntimeState::Built, RuntimeState::Running];

fn is_endpoint(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Host | NodeKind::Server | NodeKind::Station | NodeKind::Nat)
}

impl EmulationRuntime for RecordingRuntime {
    fn set_wireless_medium(&mut self, medium: &WirelessMedium) -> Result<(), RuntimeError> {
        self.require("set the wireless medium", &[RuntimeState::Declaring])?;
        if !self.nodes.is_empty() {
            return Err(RuntimeError::InvalidState {
                action: "set the wireless medium after nodes were added",
                state: self.state,
            });
        }
        self.record(RuntimeCall::SetWirelessMedium { noise_threshold: medium.noise_threshold })
    }

    fn add_node(&mut self, node: &NodeDescriptor) -> Result<(), RuntimeError> {
        self.require("add a node", &[RuntimeState::Declaring])?;
        if self.nodes.contains_key(&node.name) {
            return Err(RuntimeError::DuplicateNode(node.name.clone()));
        }
        self.nodes.insert(node.name.clone(), node.kind());
        self.record(RuntimeCall::AddNode { name: node.name.clone() })
    }

    fn add_link(&mut self, link: &LinkDescriptor) -> Result<(), RuntimeError> {
        self.require("add a link", &[RuntimeState::Declaring])?;
        self.kind_of(&link.a)?;
        self.kind_of(&link.b)?;
        self.record(RuntimeCall::AddLink { a: link.a.clone(), b: link.b.clone() })
    }

    fn set_propagation_model(&mut self, model: &PropagationModel) -> Result<(), RuntimeError> {
        self.require("set the propagation model", &[RuntimeState::Declaring])?;
        self.record(RuntimeCall::SetPropagationModel { model: model.model.clone(), exp: model.exp })
    }

    fn configure_wifi_nodes(&mut self) -> Result<(), RuntimeError> {
        self.require("configure wifi nodes", &[RuntimeState::Declaring])?;
        self.record(RuntimeCall::ConfigureWifiNodes)
    }

    fn build(&mut self) -> Result<(), RuntimeError> {
        self.require("build", &[RuntimeState::Declaring])?;
        self.state = RuntimeState::Built;
        self.record(RuntimeCall::Build)
    }

    fn start_controller(&mut self, controller: &str) -> Result<(), RuntimeError> {
        self.require("start a controller", UP)?;
        self.require_kind(controller, "a controller", |k| k == NodeKind::Controller)?;
        self.state = RuntimeState::Running;
        self.record(RuntimeCall::StartController { name: controller.to_string() })
    }

    fn start_switch(&mut self, switch: &str, controllers: &[String]) -> Result<(), RuntimeError> {
        self.require("start a switch", UP)?;
        self.require_kind(switch, "a switch or access point", |k| {
            matches!(k, NodeKind::Switch | NodeKind::AccessPoint)
        })?;
        for controller in controllers {
            self.require_kind(controller, "a controller", |k| k == NodeKind::Controller)?;
        }
        self.state = RuntimeState::Running;
        self.record(RuntimeCall::StartSwitch {
            name: switch.to_string(),
            controllers: controllers.to_vec(),
        })
    }

    fn configure_nat(&mut self, nat: &str) -> Result<(), RuntimeError> {
        self.require("configure NAT", UP)?;
        self.require_kind(nat, "a NAT gateway", |k| k == NodeKind::Nat)?;
        self.record(RuntimeCall::ConfigureNat { name: nat.to_string() })
    }

    fn host_command(&mut self, host: &str, command: &str) -> Result<(), RuntimeError> {
        self.require("run a host command", UP)?;
        self.require_kind(host, "a host", is_endpoint)?;
        self.record(RuntimeCall::HostCommand { host: host.to_string(), command: command.to_string() })
    }

    fn schedule_mobility(&mut self, schedule: &MobilitySchedule) -> Result<(), RuntimeError> {
        self.require("schedule mobility", UP)?;
        for entry in &schedule.entries {
            self.require_kind(&entry.node, "a station", |k| k == NodeKind::Station)?;
        }
        self.record(RuntimeCall::ScheduleMobility {
            stations: schedule.entries.iter().map(|e| e.node.clone()).collect(),
            stop_time: schedule.stop_time,
        })
    }

    fn wait(&mut self, duration: Duration) -> Result<(), RuntimeError> {
        self.require("wait", UP)?;
        self.waited += duration;
        self.record(RuntimeCall::Wait { seconds: duration.as_secs_f64() })
    }

    fn ping(&mut self, check: &PingCheck) -> Result<(), RuntimeError> {
        self.require("ping", &[RuntimeState::Running])?;
        self.require_kind(&check.from, "a ping source", is_endpoint)?;
        self.kind_of(&check.target)?;
        self.record(RuntimeCall::Ping {
            from: check.from.clone(),
            target: check.target.clone(),
            count: check.count,
        })
    }

    fn announce(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Announce { text: text.to_string() })
    }

    fn interact(&mut self) -> Result<(), RuntimeError> {
        self.require("start an interactive session", &[RuntimeState::Running])?;
        self.record(RuntimeCall::Interact)
    }

    fn stop(&mut self) -> Result<(), RuntimeError> {
        self.require("stop", UP)?;
        self.state = RuntimeState::Stopped;
        self.record(RuntimeCall::Stop)
    }
}
