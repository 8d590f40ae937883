//! Mininet / Mininet-WiFi launcher rendering.
//!
//! Each runtime call becomes one or more lines of a Python `run()`
//! function. The constructor and imports are chosen when the script is
//! finished, once it is known whether the lab is wireless and which kind
//! of controller it uses.

use super::{EmulationRuntime, PingCheck, RuntimeError, WirelessMedium};
use crate::config::PropagationModel;
use crate::topology::{Controller, LinkDescriptor, MobilitySchedule, NodeDescriptor, NodeRole};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct MininetScript {
    title: String,
    medium: Option<WirelessMedium>,
    wireless: bool,
    remote_controller: bool,
    uses_sleep: bool,
    vars: HashMap<String, String>,
    taken: HashSet<String>,
    body: Vec<String>,
}

/// Python string literal for `value`
fn py_str(value: &str) -> String {
    // JSON string escapes are a subset of Python's
    serde_json::to_string(value).unwrap_or_else(|_| format!("'{}'", value.replace('\'', "\\'")))
}

/// Python number literal without a trailing `.0` for whole values
fn py_num(value: f64) -> String {
    if !value.is_finite() {
        // bare `inf`/`NaN` are not Python literals
        format!("float({})", py_str(&value.to_string().to_lowercase()))
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn py_secs(duration: Duration) -> String {
    py_num(duration.as_secs_f64())
}

impl MininetScript {
    /// Start a new launcher; `title` ends up in the module docstring
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Python variable for a node name, made unique and identifier safe
    fn bind(&mut self, name: &str) -> String {
        let mut base: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
            base.insert(0, '_');
        }
        // avoid shadowing the handles the script itself uses
        if matches!(base.as_str(), "net" | "info" | "time" | "run" | "cli") {
            base.push('_');
        }

        let mut var = base.clone();
        let mut n = 2;
        while self.taken.contains(&var) {
            var = format!("{}_{}", base, n);
            n += 1;
        }
        self.taken.insert(var.clone());
        self.vars.insert(name.to_string(), var.clone());
        var
    }

    fn var(&self, name: &str) -> Result<&str, RuntimeError> {
        self.vars
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RuntimeError::UnknownNode(name.to_string()))
    }

    fn line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    fn info(&mut self, text: &str) {
        let line = format!("info({})", py_str(text));
        self.line(line);
    }

    fn node_line(&self, var: &str, node: &NodeDescriptor) -> String {
        let name = py_str(&node.name);
        match &node.role {
            NodeRole::AccessPoint(ap) => format!(
                "{} = net.addAccessPoint({}, ssid={}, mode={}, channel={}, passwd={}, encrypt={}, \
                 failMode='standalone', datapath='user', position={}, range={})",
                var,
                name,
                py_str(&ap.ssid),
                py_str(&ap.mode),
                py_str(&ap.channel.to_string()),
                py_str(&ap.password),
                py_str(ap.encryption.as_str()),
                py_str(&ap.position.to_string()),
                py_num(ap.range),
            ),
            NodeRole::Station(sta) => format!(
                "{} = net.addStation({}, ip={}, position={}, passwd={}, encrypt={})",
                var,
                name,
                py_str(&sta.ip.to_string()),
                py_str(&sta.position.to_string()),
                py_str(&sta.password),
                py_str(sta.encryption.as_str()),
            ),
            NodeRole::Host(host) | NodeRole::Server(host) => {
                let mut line = format!("{} = net.addHost({}, ip={}", var, name, py_str(&host.ip.to_string()));
                if let Some(mac) = &host.mac {
                    line.push_str(&format!(", mac={}", py_str(mac)));
                }
                line.push(')');
                line
            }
            NodeRole::Switch(sw) => match &sw.protocols {
                Some(protocols) => format!("{} = net.addSwitch({}, protocols={})", var, name, py_str(protocols)),
                None => format!("{} = net.addSwitch({})", var, name),
            },
            NodeRole::Controller(Controller::Local) => format!("{} = net.addController({})", var, name),
            NodeRole::Controller(Controller::Remote { ip, port }) => format!(
                "{} = net.addController({}, controller=RemoteController, ip={}, port={})",
                var,
                name,
                py_str(&ip.to_string()),
                port
            ),
            NodeRole::Nat(nat) => format!(
                "{} = net.addNAT({}, ip={}, connect=False)",
                var,
                name,
                py_str(&nat.ip.to_string())
            ),
        }
    }

    fn header(&self) -> String {
        let mut out = String::new();
        out.push_str("#!/usr/bin/env python3\n");
        out.push_str(&format!("\"\"\"{}\n\nGenerated by labtopo. Run as root.\n\"\"\"\n\n", self.title.replace("\"\"\"", "'''")));
        if self.uses_sleep {
            out.push_str("import time\n\n");
        }
        out.push_str("from mininet.log import setLogLevel, info\n");
        if self.wireless {
            out.push_str("from mininet.node import Controller\n");
            out.push_str("from mn_wifi.net import Mininet_wifi\n");
            out.push_str("from mn_wifi.cli import CLI\n");
            if self.medium.is_some() {
                out.push_str("from mn_wifi.link import wmediumd\n");
                out.push_str("from mn_wifi.wmediumdConnector import interference\n");
            }
        } else {
            out.push_str("from mininet.net import Mininet\n");
            out.push_str("from mininet.node import Controller, RemoteController, OVSSwitch\n");
            out.push_str("from mininet.link import TCLink\n");
            out.push_str("from mininet.cli import CLI\n");
        }
        out
    }

    fn constructor(&self) -> String {
        if self.wireless {
            match &self.medium {
                Some(medium) => format!(
                    "net = Mininet_wifi(controller=Controller, link=wmediumd, \
                     wmediumd_mode=interference, noise_th={})",
                    medium.noise_threshold
                ),
                None => "net = Mininet_wifi(controller=Controller)".to_string(),
            }
        } else {
            let controller = if self.remote_controller { "RemoteController" } else { "Controller" };
            format!("net = Mininet(controller={}, link=TCLink, switch=OVSSwitch)", controller)
        }
    }

    /// Assemble the complete launcher
    pub fn finish(&self) -> String {
        let mut out = self.header();
        out.push_str("\n\ndef run():\n");
        out.push_str(&format!("{}{}\n", INDENT, self.constructor()));
        for line in &self.body {
            out.push_str(&format!("{}{}\n", INDENT, line));
        }
        out.push_str("\n\nif __name__ == '__main__':\n");
        out.push_str(&format!("{}setLogLevel('info')\n", INDENT));
        out.push_str(&format!("{}run()\n", INDENT));
        out
    }
}

impl EmulationRuntime for MininetScript {
    fn set_wireless_medium(&mut self, medium: &WirelessMedium) -> Result<(), RuntimeError> {
        self.medium = Some(medium.clone());
        self.wireless = true;
        Ok(())
    }

    fn add_node(&mut self, node: &NodeDescriptor) -> Result<(), RuntimeError> {
        if self.vars.contains_key(&node.name) {
            return Err(RuntimeError::DuplicateNode(node.name.clone()));
        }
        match &node.role {
            NodeRole::AccessPoint(_) | NodeRole::Station(_) => self.wireless = true,
            NodeRole::Controller(Controller::Remote { .. }) => self.remote_controller = true,
            _ => {}
        }
        let var = self.bind(&node.name);
        let line = self.node_line(&var, node);
        self.line(line);
        Ok(())
    }

    fn add_link(&mut self, link: &LinkDescriptor) -> Result<(), RuntimeError> {
        let mut line = format!("net.addLink({}, {}", self.var(&link.a)?, self.var(&link.b)?);
        if let Some(bw) = link.params.bandwidth {
            line.push_str(&format!(", bw={}", py_num(bw)));
        }
        if let Some(delay) = link.params.delay {
            let millis = py_num(delay.as_micros() as f64 / 1000.0);
            line.push_str(&format!(", delay={}", py_str(&format!("{}ms", millis))));
        }
        line.push(')');
        self.line(line);
        Ok(())
    }

    fn set_propagation_model(&mut self, model: &PropagationModel) -> Result<(), RuntimeError> {
        let line = format!("net.setPropagationModel(model={}, exp={})", py_str(&model.model), py_num(model.exp));
        self.line(line);
        Ok(())
    }

    fn configure_wifi_nodes(&mut self) -> Result<(), RuntimeError> {
        self.info("*** Configuring WiFi nodes\n");
        self.line("net.configureWifiNodes()");
        Ok(())
    }

    fn build(&mut self) -> Result<(), RuntimeError> {
        self.info("*** Starting network\n");
        self.line("net.build()");
        Ok(())
    }

    fn start_controller(&mut self, controller: &str) -> Result<(), RuntimeError> {
        let line = format!("{}.start()", self.var(controller)?);
        self.line(line);
        Ok(())
    }

    fn start_switch(&mut self, switch: &str, controllers: &[String]) -> Result<(), RuntimeError> {
        let ctrl = controllers
            .iter()
            .map(|c| self.var(c).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        let line = format!("{}.start([{}])", self.var(switch)?, ctrl.join(", "));
        self.line(line);
        Ok(())
    }

    fn configure_nat(&mut self, nat: &str) -> Result<(), RuntimeError> {
        let var = self.var(nat)?.to_string();
        self.info("*** Configuring NAT for internet access\n");
        self.line(format!("{}.configDefault()", var));
        Ok(())
    }

    fn host_command(&mut self, host: &str, command: &str) -> Result<(), RuntimeError> {
        let line = format!("{}.cmd({})", self.var(host)?, py_str(command));
        self.line(line);
        Ok(())
    }

    fn schedule_mobility(&mut self, schedule: &MobilitySchedule) -> Result<(), RuntimeError> {
        let mut lines = vec![format!(
            "net.startMobility(time={}, model={}, max_x={}, max_y={}, min_v={}, max_v={})",
            schedule.start_time,
            py_str(&schedule.model),
            py_num(schedule.area.max_x),
            py_num(schedule.area.max_y),
            py_num(schedule.min_speed),
            py_num(schedule.max_speed),
        )];
        for entry in &schedule.entries {
            let var = self.var(&entry.node)?;
            lines.push(format!(
                "net.mobility({}, 'start', time={}, position={})",
                var,
                entry.start_time,
                py_str(&entry.start_position.to_string())
            ));
            lines.push(format!(
                "net.mobility({}, 'stop', time={}, position={})",
                var,
                entry.end_time,
                py_str(&entry.end_position.to_string())
            ));
        }
        lines.push(format!("net.stopMobility(time={})", schedule.stop_time));

        self.info("*** Configuring mobility\n");
        self.body.extend(lines);
        Ok(())
    }

    fn wait(&mut self, duration: Duration) -> Result<(), RuntimeError> {
        self.uses_sleep = true;
        self.line(format!("time.sleep({})", py_secs(duration)));
        Ok(())
    }

    fn ping(&mut self, check: &PingCheck) -> Result<(), RuntimeError> {
        let from = self.var(&check.from)?.to_string();
        self.var(&check.target)?;
        self.info(&format!("Ping {} -> {} ({})...\n", check.from, check.target, check.target_ip));
        self.line(format!(
            "info({}.cmd({}) + '\\n')",
            from,
            py_str(&format!("ping -c {} {}", check.count, check.target_ip))
        ));
        Ok(())
    }

    fn announce(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.info(text);
        Ok(())
    }

    fn interact(&mut self) -> Result<(), RuntimeError> {
        self.line("CLI(net)");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RuntimeError> {
        self.info("*** Stopping network\n");
        self.line("net.stop()");
        Ok(())
    }
}
