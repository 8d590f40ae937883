//! WiFi lab: linear chain of access points and mobile stations.

use super::{rule, Lab, Task};
use crate::config::Config;
use crate::runtime::WirelessMedium;
use crate::topology::{
    AccessPoint, Controller, Encryption, LinkParams, MobilityEntry, MobilitySchedule,
    NodeDescriptor, NodeRole, Station, TopologyError,
};

const CONTROLLER: &str = "c0";
const MODE: &str = "g";

pub fn build(config: &Config) -> Result<Lab, TopologyError> {
    let wifi = &config.wifi;
    let mut lab = Lab::new(Task::Wifi, &config.student_id);
    lab.medium = Some(WirelessMedium { noise_threshold: wifi.noise_threshold });

    for ap in &wifi.access_points {
        lab.topology.add_node(NodeDescriptor::new(
            &ap.name,
            NodeRole::AccessPoint(AccessPoint {
                ssid: config.ssid().to_string(),
                password: config.password().to_string(),
                encryption: Encryption::Wpa2,
                mode: MODE.to_string(),
                channel: ap.channel,
                position: ap.position,
                range: ap.range,
            }),
        ))?;
    }
    for sta in &wifi.stations {
        lab.topology.add_node(NodeDescriptor::new(
            &sta.name,
            NodeRole::Station(Station {
                ip: sta.ip,
                position: sta.start_position,
                password: config.password().to_string(),
                encryption: Encryption::Wpa2,
            }),
        ))?;
    }
    lab.topology.add_node(NodeDescriptor::new(CONTROLLER, NodeRole::Controller(Controller::Local)))?;

    let ap_names: Vec<String> = wifi.access_points.iter().map(|ap| ap.name.clone()).collect();
    lab.topology.add_chain(&ap_names, LinkParams::default())?;

    lab.propagation = Some(wifi.propagation.clone());

    if !wifi.stations.is_empty() {
        let entries = wifi
            .stations
            .iter()
            .map(|sta| MobilityEntry {
                node: sta.name.clone(),
                start_position: sta.start_position,
                end_position: sta.end_position,
                start_time: sta.start_time,
                end_time: sta.end_time,
                min_speed: sta.min_speed,
                max_speed: sta.max_speed,
            })
            .collect();
        lab.mobility = Some(MobilitySchedule::new(wifi.area, entries)?);
    }

    lab.settle = wifi.settle_time;
    lab.settle_note = format!(
        "\n*** Waiting for initial setup ({} seconds)...\n",
        wifi.settle_time.as_secs()
    );
    lab.banner = format!("\n*** Starting WiFi lab with Student ID: {} ***\n\n", config.student_id);
    lab.summary = summary(config, &ap_names);
    lab.briefing = briefing(config, &lab);
    Ok(lab)
}

fn summary(config: &Config, ap_names: &[String]) -> String {
    let mut out = String::new();
    out.push_str("\n*** Configuration Summary:\n");
    out.push_str(&format!("{}\n", rule()));
    out.push_str(&format!("Student ID: {}\n", config.student_id));
    out.push_str(&format!("SSID: {}\n", config.ssid()));
    out.push_str("Encryption: WPA2\n");
    out.push_str(&format!("Noise Threshold: {}dBm\n", config.wifi.noise_threshold));
    out.push_str(&format!("Topology: Linear ({})\n", ap_names.join(" -- ")));
    out.push_str(&format!("{}\n", rule()));
    out
}

fn briefing(config: &Config, lab: &Lab) -> String {
    let area = config.wifi.area;
    let plot = format!("py net.plotGraph(max_x={}, max_y={})", area.max_x, area.max_y);
    let stations: Vec<&str> = config.wifi.stations.iter().map(|s| s.name.as_str()).collect();

    let mut out = String::new();
    let mut step = 0;
    let mut next = || {
        step += 1;
        step
    };

    out.push_str("\n*** IMPORTANT COMMANDS FOR SCREENSHOTS:\n");
    out.push_str(&format!("{}\n", rule()));
    out.push_str(&format!("{}. Show GUI (before mobility):\n   {}\n\n", next(), plot));
    if let Some(schedule) = &lab.mobility {
        out.push_str(&format!("{}. Wait {} seconds for mobility to complete\n\n", next(), schedule.stop_time));
        out.push_str(&format!("{}. Show GUI (after mobility):\n   {}\n\n", next(), plot));
    }
    for sta in &stations {
        out.push_str(&format!("{}. Check {} connection:\n   sta {} iw dev {}-wlan0 link\n\n", next(), sta, sta, sta));
    }
    if let [first, second, ..] = stations.as_slice() {
        out.push_str(&format!("{}. Ping test:\n   {} ping -c {} {}\n\n", next(), first, config.testing.ping_count, second));
    }
    out.push_str(&format!("{}. Exit:\n   exit\n", next()));
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
        config
    }

    #[test]
    fn test_default_wifi_lab() {
        let lab = build(&config()).unwrap();
        let topo = &lab.topology;
        assert_eq!(topo.count(NodeKind::AccessPoint), 3);
        assert_eq!(topo.count(NodeKind::Station), 2);
        assert_eq!(topo.count(NodeKind::Controller), 1);
        // AP1 -- AP2 -- AP3
        assert_eq!(topo.links().len(), 2);
        assert_eq!(topo.links()[0].key(), ("AP1", "AP2"));
        assert_eq!(topo.links()[1].key(), ("AP2", "AP3"));

        match &topo.node("AP2").unwrap().role {
            NodeRole::AccessPoint(ap) => {
                assert_eq!(ap.ssid, "21012345");
                assert_eq!(ap.channel, 6);
                assert_eq!(ap.mode, "g");
            }
            other => panic!("unexpected role {:?}", other),
        }
    }

    #[test]
    fn test_mobility_follows_stations() {
        let lab = build(&config()).unwrap();
        let schedule = lab.mobility.unwrap();
        assert_eq!(schedule.entries.len(), 2);
        assert_eq!(schedule.stop_time, 61);
        assert_eq!(schedule.entries[1].node, "UE2");
        for entry in &schedule.entries {
            assert!(entry.start_time < entry.end_time);
            assert!(entry.min_speed <= entry.max_speed);
        }
    }

    #[test]
    fn test_no_stations_means_no_mobility() {
        let mut config = config();
        config.wifi.stations.clear();
        let lab = build(&config).unwrap();
        assert!(lab.mobility.is_none());
        assert!(!lab.briefing.contains("after mobility"));
    }

    #[test]
    fn test_custom_credentials_are_used() {
        let mut config = config();
        config.wifi.ssid = Some("labnet".to_string());
        config.wifi.password = Some("correct-horse".to_string());
        let lab = build(&config).unwrap();
        match &lab.topology.node("UE1").unwrap().role {
            NodeRole::Station(sta) => assert_eq!(sta.password, "correct-horse"),
            other => panic!("unexpected role {:?}", other),
        }
        assert!(lab.summary.contains("SSID: labnet"));
    }

    #[test]
    fn test_briefing_lists_station_checks() {
        let lab = build(&config()).unwrap();
        assert!(lab.briefing.contains("sta UE1 iw dev UE1-wlan0 link"));
        assert!(lab.briefing.contains("UE1 ping -c 4 UE2"));
        assert!(lab.briefing.contains("Wait 61 seconds"));
        assert!(lab.summary.contains("Topology: Linear (AP1 -- AP2 -- AP3)"));
    }

    #[test]
    fn test_controller_name_clash_is_rejected() {
        let mut config = config();
        config.wifi.access_points[0].name = "c0".to_string();
        assert_eq!(build(&config).unwrap_err(), TopologyError::DuplicateNode("c0".to_string()));
    }
}
