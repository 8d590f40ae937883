//! SDN lab: linear OpenFlow switch chain under an external controller.
//!
//! Host `hI` hangs off switch `sI`; server `J` hangs off switch
//! `s(H+J)` where `H` is the host count. The remaining switches only
//! extend the chain.

use super::{describe_duration, rule, Lab, Task};
use crate::config::Config;
use crate::runtime::PingCheck;
use crate::topology::{Controller, Host, NodeDescriptor, NodeRole, Switch, TopologyError};
use crate::utils::ip_utils::mac_from_value;

const CONTROLLER: &str = "c0";
const SERVER_MAC_BASE: u64 = 0x100;

pub fn build(config: &Config) -> Result<Lab, TopologyError> {
    let sdn = &config.sdn;
    let mut lab = Lab::new(Task::Sdn, &config.student_id);
    let topo = &mut lab.topology;

    topo.add_node(NodeDescriptor::new(
        CONTROLLER,
        NodeRole::Controller(Controller::Remote { ip: sdn.controller.ip, port: sdn.controller.port }),
    ))?;

    let switches: Vec<String> = (1..=sdn.switch_count).map(|i| format!("s{}", i)).collect();
    for name in &switches {
        topo.add_node(NodeDescriptor::new(
            name,
            NodeRole::Switch(Switch { protocols: Some(sdn.protocol.clone()) }),
        ))?;
    }

    let mut hosts = Vec::with_capacity(sdn.host_count);
    for i in 1..=sdn.host_count {
        let ip = sdn
            .host_network
            .nth_host(i as u32)
            .map_err(TopologyError::InvalidAddress)?;
        let name = format!("h{}", i);
        topo.add_node(NodeDescriptor::new(
            &name,
            NodeRole::Host(Host { ip, mac: Some(mac_from_value(i as u64)) }),
        ))?;
        hosts.push(name);
    }
    for (j, server) in sdn.servers.iter().enumerate() {
        topo.add_node(NodeDescriptor::new(
            &server.name,
            NodeRole::Server(Host {
                ip: server.ip,
                mac: Some(mac_from_value(SERVER_MAC_BASE + j as u64 + 1)),
            }),
        ))?;
    }

    if sdn.switch_count < sdn.host_count + sdn.servers.len() {
        return Err(TopologyError::InvalidAddress(format!(
            "only {} switches for {} edge nodes",
            sdn.switch_count,
            sdn.host_count + sdn.servers.len()
        )));
    }
    let edge_nodes = hosts.iter().chain(sdn.servers.iter().map(|s| &s.name));
    for (edge, switch) in edge_nodes.zip(switches.iter()) {
        topo.add_link(edge, switch, sdn.link)?;
    }
    topo.add_chain(&switches, sdn.link)?;

    for server in &sdn.servers {
        lab.checks.push(PingCheck {
            from: sdn.assigned_host.clone(),
            target: server.name.clone(),
            target_ip: server.ip.addr,
            count: config.testing.ping_count,
        });
    }

    lab.settle = sdn.convergence_delay;
    lab.settle_note = format!(
        "\n*** Waiting for the controller to discover the topology ({} seconds)...\n\
         *** IMPORTANT: Ensure the controller is running at {}:{}\n\
         *** Controller GUI: http://{}:{}/onos/ui\n\n",
        sdn.convergence_delay.as_secs(),
        sdn.controller.ip,
        sdn.controller.port,
        sdn.controller.ip,
        sdn.controller.gui_port
    );
    lab.banner = format!(
        "\n*** Starting SDN lab ***\n*** Student ID: {}\n*** Assigned Host: {}\n\
         *** Assigned Server: {}\n*** Assigned Port: {}\n\n",
        config.student_id, sdn.assigned_host, sdn.assigned_server, sdn.assigned_port
    );
    lab.summary = summary(config, &lab);
    lab.briefing = briefing(config);
    Ok(lab)
}

fn summary(config: &Config, lab: &Lab) -> String {
    let sdn = &config.sdn;
    let mut out = String::new();
    out.push_str(&format!("\n{}\n*** NETWORK CONFIGURATION COMPLETE ***\n{}\n\n", rule(), rule()));

    out.push_str(&format!("HOSTS ({}):\n", sdn.host_network));
    for node in lab.topology.nodes() {
        if let NodeRole::Host(h) = &node.role {
            out.push_str(&format!("  {:>4}: {}  MAC: {}\n", node.name, h.ip, h.mac.as_deref().unwrap_or("-")));
        }
    }
    out.push_str("\nSERVERS:\n");
    for node in lab.topology.nodes() {
        if let NodeRole::Server(h) = &node.role {
            out.push_str(&format!("  {}: {}  MAC: {}\n", node.name, h.ip, h.mac.as_deref().unwrap_or("-")));
        }
    }
    out.push_str("\nYOUR ASSIGNMENT:\n");
    out.push_str(&format!("  Host: {}\n", sdn.assigned_host));
    out.push_str(&format!("  Server: {} ({})\n", sdn.assigned_server, server_ip(config)));
    out.push_str(&format!("  Port: {}\n", sdn.assigned_port));
    out.push_str(&format!("{}\n\n", rule()));
    out
}

fn server_ip(config: &Config) -> String {
    config
        .server_ip(&config.sdn.assigned_server)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn briefing(config: &Config) -> String {
    let sdn = &config.sdn;
    let testing = &config.testing;
    let host = &sdn.assigned_host;
    let server = &sdn.assigned_server;
    let ip = server_ip(config);

    let mut out = String::new();
    out.push_str(&format!("\n{}\n*** UDP PERFORMANCE TEST INSTRUCTIONS ***\n{}\n\n", rule(), rule()));
    out.push_str("YOUR TEST CONFIGURATION:\n");
    out.push_str(&format!("  Duration: {}\n", describe_duration(testing.udp_test_duration)));
    out.push_str(&format!("  Bandwidth: {}\n", testing.udp_bandwidth));
    out.push_str(&format!("  Host: {}\n", host));
    out.push_str(&format!("  Server: {} ({})\n", server, ip));
    out.push_str(&format!("  Port: {}\n\n", sdn.assigned_port));

    out.push_str("STEP-BY-STEP PROCEDURE:\n\n");
    out.push_str(&format!("1. Open xterm windows:\n   xterm {} {} &\n\n", host, server));
    out.push_str(&format!("2. In {} xterm, start iperf server:\n   iperf -s -u -p {}\n\n", server, sdn.assigned_port));
    out.push_str(&format!(
        "3. In {} xterm, start iperf client:\n   iperf -c {} -u -p {} -b {} -t {}\n\n",
        host,
        ip,
        sdn.assigned_port,
        testing.udp_bandwidth,
        testing.udp_test_duration.as_secs()
    ));
    out.push_str(&format!("4. Wait for test to complete ({})\n\n", describe_duration(testing.udp_test_duration)));
    out.push_str("5. Take screenshots of BOTH terminals\n\n");

    out.push_str(&format!("{}\n*** USEFUL CLI COMMANDS ***\n{}\n", rule(), rule()));
    out.push_str(&format!("  {:<27}# Test all connectivity\n", "pingall"));
    out.push_str(&format!("  {:<27}# Quick ping\n", format!("{} ping -c 10 {}", host, ip)));
    out.push_str(&format!("  {:<27}# Open terminals\n", format!("xterm {} {}", host, server)));
    out.push_str(&format!("  {:<27}# Show topology\n", "net"));
    out.push_str(&format!("  {:<27}# Show links\n", "links"));
    out.push_str(&format!("  {:<27}# Show node info\n", "dump"));
    out.push_str(&format!("  {:<27}# Exit\n", "exit"));
    out.push_str(&format!("{}\n\n", rule()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeKind;

    fn config() -> Config {
        let mut config = Config::template();
        config.student_id = "21012345".to_string();
        config.sdn.assigned_host = "h7".to_string();
        config.sdn.assigned_server = "server2".to_string();
        config.sdn.assigned_port = 6001;
        config
    }

    #[test]
    fn test_reference_topology_counts() {
        let lab = build(&config()).unwrap();
        let topo = &lab.topology;
        assert_eq!(topo.count(NodeKind::Switch), 13);
        assert_eq!(topo.count(NodeKind::Host), 10);
        assert_eq!(topo.count(NodeKind::Server), 3);
        assert_eq!(topo.links_between(NodeKind::Host, NodeKind::Switch), 10);
        assert_eq!(topo.links_between(NodeKind::Server, NodeKind::Switch), 3);
        assert_eq!(topo.links_between(NodeKind::Switch, NodeKind::Switch), 12);
        assert_eq!(topo.links().len(), 25);
    }

    #[test]
    fn test_edge_attachment() {
        let lab = build(&config()).unwrap();
        let links = lab.topology.links();
        assert_eq!(links[0].key(), ("h1", "s1"));
        assert_eq!(links[9].key(), ("h10", "s10"));
        assert_eq!(links[10].key(), ("s11", "server1"));
        assert_eq!(links[12].key(), ("s13", "server3"));
    }

    #[test]
    fn test_addresses_and_macs() {
        let lab = build(&config()).unwrap();
        match &lab.topology.node("h10").unwrap().role {
            NodeRole::Host(h) => {
                assert_eq!(h.ip.to_string(), "172.16.0.10/16");
                assert_eq!(h.mac.as_deref(), Some("00:00:00:00:00:0a"));
            }
            other => panic!("unexpected role {:?}", other),
        }
        match &lab.topology.node("server3").unwrap().role {
            NodeRole::Server(h) => {
                assert_eq!(h.ip.to_string(), "60.0.0.2/8");
                assert_eq!(h.mac.as_deref(), Some("00:00:00:00:01:03"));
            }
            other => panic!("unexpected role {:?}", other),
        }
        match &lab.topology.node("s4").unwrap().role {
            NodeRole::Switch(sw) => assert_eq!(sw.protocols.as_deref(), Some("OpenFlow13")),
            other => panic!("unexpected role {:?}", other),
        }
    }

    #[test]
    fn test_pings_cover_every_server_from_assigned_host() {
        let lab = build(&config()).unwrap();
        assert_eq!(lab.checks.len(), 3);
        assert!(lab.checks.iter().all(|c| c.from == "h7" && c.count == 4));
        assert_eq!(lab.checks[1].target_ip.to_string(), "40.0.0.2");
    }

    #[test]
    fn test_extra_switches_only_extend_the_chain() {
        let mut config = config();
        config.sdn.switch_count = 16;
        let lab = build(&config).unwrap();
        assert_eq!(lab.topology.links_between(NodeKind::Switch, NodeKind::Switch), 15);
        assert_eq!(lab.topology.links().len(), 13 + 15);
    }

    #[test]
    fn test_too_few_switches() {
        let mut config = config();
        config.sdn.switch_count = 5;
        assert!(build(&config).is_err());
    }

    #[test]
    fn test_instruction_text() {
        let lab = build(&config()).unwrap();
        assert!(lab.briefing.contains("iperf -s -u -p 6001"));
        assert!(lab.briefing.contains("iperf -c 40.0.0.2 -u -p 6001 -b 100M -t 600"));
        assert!(lab.briefing.contains("600 seconds (10 minutes)"));
        assert!(lab.summary.contains("Server: server2 (40.0.0.2)"));
        assert!(lab.summary.contains("172.16.0.10/16  MAC: 00:00:00:00:00:0a"));
        let hosts_at = lab.summary.find("HOSTS").unwrap();
        let servers_at = lab.summary.find("SERVERS").unwrap();
        assert!(hosts_at < servers_at);
        assert!(lab.settle_note.contains("15 seconds"));
    }
}
