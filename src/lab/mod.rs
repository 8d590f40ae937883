//! Lab construction.
//!
//! A [`Lab`] is the declarative result of translating the configuration
//! record for one task: the node/link graph plus everything the fixed
//! lifecycle needs (mobility, NAT, host commands, waits, connectivity
//! checks and the text shown to the student). [`Lab::deploy`] replays that
//! lifecycle against any [`EmulationRuntime`].

pub mod cloud;
pub mod sdn;
pub mod wifi;

use crate::config::{Config, PropagationModel};
use crate::runtime::{EmulationRuntime, PingCheck, RuntimeError, WirelessMedium};
use crate::topology::{MobilitySchedule, NodeKind, Topology, TopologyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Width of the separator lines in instructional text
pub(crate) const RULE_WIDTH: usize = 70;

pub(crate) fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Lab variant to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// WiFi access points with mobile stations
    Wifi,
    /// Wired hosts reaching a cloud website through NAT
    Cloud,
    /// Linear OpenFlow switch chain under an external controller
    Sdn,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Wifi => "wifi",
            Task::Cloud => "cloud",
            Task::Sdn => "sdn",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Task::Wifi => "WiFi Network Emulation with Mobility",
            Task::Cloud => "Cloud Services Emulation",
            Task::Sdn => "Software Defined Networking with an External Controller",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command run inside a host's namespace once the network is up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostCommand {
    pub host: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lab {
    pub task: Task,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<WirelessMedium>,
    pub topology: Topology,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation: Option<PropagationModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobility: Option<MobilitySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat: Option<String>,
    pub host_commands: Vec<HostCommand>,
    /// Pause before the summary (controller discovery, association)
    #[serde(with = "humantime_serde")]
    pub settle: Duration,
    #[serde(skip)]
    pub settle_note: String,
    pub checks: Vec<PingCheck>,
    #[serde(skip)]
    pub banner: String,
    #[serde(skip)]
    pub summary: String,
    #[serde(skip)]
    pub briefing: String,
}

impl Lab {
    pub fn new(task: Task, student_id: &str) -> Self {
        Self {
            task,
            student_id: student_id.to_string(),
            medium: None,
            topology: Topology::new(),
            propagation: None,
            mobility: None,
            nat: None,
            host_commands: Vec::new(),
            settle: Duration::ZERO,
            settle_note: String::new(),
            checks: Vec::new(),
            banner: String::new(),
            summary: String::new(),
            briefing: String::new(),
        }
    }

    /// Translate a validated configuration record into the lab for `task`
    pub fn build(config: &Config, task: Task) -> Result<Lab, TopologyError> {
        let lab = match task {
            Task::Wifi => wifi::build(config)?,
            Task::Cloud => cloud::build(config)?,
            Task::Sdn => sdn::build(config)?,
        };
        lab.check_references()?;

        log::info!(
            "Built {} lab: {} nodes ({} switches, {} access points), {} links",
            task,
            lab.topology.nodes().len(),
            lab.topology.count(NodeKind::Switch),
            lab.topology.count(NodeKind::AccessPoint),
            lab.topology.links().len()
        );
        Ok(lab)
    }

    /// Every name the lifecycle refers to must be a declared node of the right kind
    fn check_references(&self) -> Result<(), TopologyError> {
        let topo = &self.topology;
        let missing = |name: &str| TopologyError::UnknownNode(name.to_string());

        if let Some(schedule) = &self.mobility {
            for entry in &schedule.entries {
                match topo.node(&entry.node).map(|n| n.kind()) {
                    Some(NodeKind::Station) => {}
                    Some(_) => {
                        return Err(TopologyError::InvalidMobility(format!(
                            "'{}' is not a station",
                            entry.node
                        )))
                    }
                    None => return Err(missing(&entry.node)),
                }
            }
        }
        if let Some(nat) = &self.nat {
            if !topo.contains(nat) {
                return Err(missing(nat));
            }
        }
        for cmd in &self.host_commands {
            if !topo.contains(&cmd.host) {
                return Err(missing(&cmd.host));
            }
        }
        for check in &self.checks {
            for name in [&check.from, &check.target] {
                if !topo.contains(name) {
                    return Err(missing(name));
                }
            }
        }
        Ok(())
    }

    /// Replay the lab lifecycle against a runtime:
    /// declare, build, start, configure, wait, check, brief, interact, stop.
    pub fn deploy<R: EmulationRuntime + ?Sized>(&self, runtime: &mut R) -> Result<(), RuntimeError> {
        let topo = &self.topology;

        runtime.announce(&self.banner)?;
        if let Some(medium) = &self.medium {
            runtime.set_wireless_medium(medium)?;
        }

        runtime.announce("*** Creating nodes\n")?;
        for node in topo.nodes() {
            runtime.add_node(node)?;
        }
        if let Some(model) = &self.propagation {
            runtime.set_propagation_model(model)?;
        }
        if topo.is_wireless() {
            runtime.configure_wifi_nodes()?;
        }

        runtime.announce(&format!("*** Creating links (total: {})\n", topo.links().len()))?;
        for link in topo.links() {
            runtime.add_link(link)?;
        }

        runtime.build()?;
        let controllers = topo.names_with(NodeKind::Controller);
        for controller in &controllers {
            runtime.start_controller(controller)?;
        }
        for node in topo.nodes().iter().filter(|n| n.is_switching()) {
            runtime.start_switch(&node.name, &controllers)?;
        }

        if let Some(nat) = &self.nat {
            runtime.configure_nat(nat)?;
        }
        for cmd in &self.host_commands {
            runtime.host_command(&cmd.host, &cmd.command)?;
        }
        if let Some(schedule) = &self.mobility {
            runtime.schedule_mobility(schedule)?;
        }

        if !self.settle.is_zero() {
            runtime.announce(&self.settle_note)?;
            runtime.wait(self.settle)?;
        }
        runtime.announce(&self.summary)?;

        if !self.checks.is_empty() {
            runtime.announce("*** Testing connectivity\n")?;
            for check in &self.checks {
                runtime.ping(check)?;
            }
        }

        runtime.announce(&self.briefing)?;
        runtime.interact()?;
        runtime.stop()
    }
}

/// `600` -> `600 seconds (10 minutes)`
pub(crate) fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        format!("{} seconds ({} minute{})", secs, minutes, if minutes == 1 { "" } else { "s" })
    } else {
        format!("{} seconds", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{RecordingRuntime, RuntimeCall, RuntimeState};

    fn config() -> Config {
        let mut config = Config::template();
        config.student_id = "21012345".to_string();
        config
    }

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(Duration::from_secs(600)), "600 seconds (10 minutes)");
        assert_eq!(describe_duration(Duration::from_secs(60)), "60 seconds (1 minute)");
        assert_eq!(describe_duration(Duration::from_secs(45)), "45 seconds");
    }

    #[test]
    fn test_every_task_deploys_on_recorder() {
        for task in [Task::Wifi, Task::Cloud, Task::Sdn] {
            let lab = Lab::build(&config(), task).unwrap();
            let mut rt = RecordingRuntime::new();
            lab.deploy(&mut rt).unwrap();
            assert_eq!(rt.state(), RuntimeState::Stopped, "{} did not stop", task);

            let nodes = rt.count_calls(|c| matches!(c, RuntimeCall::AddNode { .. }));
            let links = rt.count_calls(|c| matches!(c, RuntimeCall::AddLink { .. }));
            assert_eq!(nodes, lab.topology.nodes().len());
            assert_eq!(links, lab.topology.links().len());
            assert_eq!(rt.waited(), lab.settle);
        }
    }

    #[test]
    fn test_build_happens_after_all_declarations() {
        let lab = Lab::build(&config(), Task::Sdn).unwrap();
        let mut rt = RecordingRuntime::new();
        lab.deploy(&mut rt).unwrap();

        let calls = rt.calls();
        let build_at = calls.iter().position(|c| *c == RuntimeCall::Build).unwrap();
        let last_decl = calls
            .iter()
            .rposition(|c| matches!(c, RuntimeCall::AddNode { .. } | RuntimeCall::AddLink { .. }))
            .unwrap();
        assert!(last_decl < build_at);
        assert_eq!(calls.last(), Some(&RuntimeCall::Stop));
    }

    #[test]
    fn test_task_names() {
        assert_eq!(Task::Sdn.to_string(), "sdn");
        assert_eq!(serde_json::to_string(&Task::Wifi).unwrap(), "\"wifi\"");
    }
}
