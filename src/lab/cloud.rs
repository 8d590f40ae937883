//! Cloud access lab: wired hosts reach a public website through a NAT gateway.

use super::{rule, HostCommand, Lab, Task};
use crate::config::Config;
use crate::topology::{Controller, Host, Nat, NodeDescriptor, NodeRole, Switch, TopologyError};
use crate::utils::validation::url_host;

const CONTROLLER: &str = "c0";
const NAT: &str = "nat0";

pub fn build(config: &Config) -> Result<Lab, TopologyError> {
    let cloud = &config.cloud;
    let mut lab = Lab::new(Task::Cloud, &config.student_id);
    let topo = &mut lab.topology;

    topo.add_node(NodeDescriptor::new(CONTROLLER, NodeRole::Controller(Controller::Local)))?;

    let switches: Vec<String> = (1..=cloud.switch_count).map(|i| format!("s{}", i)).collect();
    for name in &switches {
        topo.add_node(NodeDescriptor::new(name, NodeRole::Switch(Switch::default())))?;
    }
    for host in &cloud.hosts {
        topo.add_node(NodeDescriptor::new(&host.name, NodeRole::Host(Host { ip: host.ip, mac: None })))?;
    }
    topo.add_node(NodeDescriptor::new(NAT, NodeRole::Nat(Nat { ip: cloud.gateway })))?;

    let switch_name = |index: usize| -> Result<&String, TopologyError> {
        index
            .checked_sub(1)
            .and_then(|i| switches.get(i))
            .ok_or_else(|| TopologyError::UnknownNode(format!("s{}", index)))
    };
    for host in &cloud.hosts {
        topo.add_link(&host.name, switch_name(host.switch)?, cloud.link)?;
    }
    topo.add_link(NAT, switch_name(cloud.nat_switch)?, cloud.link)?;
    topo.add_chain(&switches, cloud.link)?;

    lab.nat = Some(NAT.to_string());
    for host in &cloud.hosts {
        lab.host_commands.push(HostCommand {
            host: host.name.clone(),
            command: format!("ip route add default via {}", cloud.gateway),
        });
        lab.host_commands.push(HostCommand {
            host: host.name.clone(),
            command: format!("echo \"nameserver {}\" > /etc/resolv.conf", cloud.dns),
        });
    }

    lab.banner = format!(
        "\n*** Starting Cloud Services lab ***\n*** Student ID: {}\n*** Target URL: {}\n\n",
        config.student_id, cloud.render_url
    );
    lab.summary = format!("\n{}\n*** Network Configuration Complete!\n{}\n\n", rule(), rule());
    lab.briefing = briefing(config);
    Ok(lab)
}

fn briefing(config: &Config) -> String {
    let cloud = &config.cloud;
    let url = &cloud.render_url;
    let first = cloud.hosts.first().map(|h| h.name.as_str()).unwrap_or("h1");

    let mut out = String::new();
    out.push_str("*** STEP-BY-STEP INSTRUCTIONS:\n\n");
    out.push_str(&format!("STEP 1: Open xterm for {}\n   Command in the CLI: xterm {} &\n\n", first, first));
    out.push_str(&format!("STEP 2: In {} xterm, test internet connectivity:\n", first));
    out.push_str(&format!("   ping -c {} {}\n   (Take screenshot)\n\n", config.testing.ping_count, cloud.dns));
    out.push_str(&format!("STEP 3: Test DNS resolution:\n   nslookup {}\n   (Take screenshot)\n\n", url_host(url)));
    out.push_str(&format!("STEP 4: Access your website using curl:\n   curl {}\n   (Take screenshot showing HTML)\n\n", url));
    out.push_str(&format!("STEP 5: Download and view webpage:\n   wget {} -O index.html\n   cat index.html\n   (Take screenshot)\n\n", url));
    out.push_str(&format!("OPTIONAL: Use text browser (if lynx installed):\n   lynx {}\n\n", url));

    out.push_str(&format!("{}\n", rule()));
    out.push_str("*** Configuration Summary:\n");
    out.push_str(&format!("   Student ID: {}\n", config.student_id));
    out.push_str(&format!("   Website URL: {}\n", url));
    out.push_str(&format!("   GitHub Repo: {}\n", cloud.github_repo));
    for host in &cloud.hosts {
        out.push_str(&format!("   {} IP: {}\n", host.name.to_uppercase(), host.ip));
    }
    out.push_str(&format!("   Gateway: {}\n", cloud.gateway));
    out.push_str(&format!("   DNS: {}\n", cloud.dns));
    out.push_str(&format!("{}\n\n", rule()));
    out
}
