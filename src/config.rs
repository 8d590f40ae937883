use crate::lab::Task;
use crate::topology::{Area, LinkParams, Position};
use crate::utils::ip_utils::Ipv4Cidr;
use crate::utils::validation::{find_duplicate, is_valid_bandwidth};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Student identifier shipped in the template; must be replaced before the WiFi lab
pub const PLACEHOLDER_STUDENT_ID: &str = "YOUR_STUDENT_ID_HERE";
/// Website URL shipped in the template
pub const PLACEHOLDER_RENDER_URL: &str = "https://your-site.onrender.com";
/// Repository URL shipped in the template
pub const PLACEHOLDER_GITHUB_REPO: &str = "https://github.com/yourusername/your-repo";
/// Default SDN assignment shipped in the template
pub const DEFAULT_ASSIGNED_HOST: &str = "h1";
pub const DEFAULT_ASSIGNED_SERVER: &str = "server1";
pub const DEFAULT_ASSIGNED_PORT: u16 = 5566;

/// Top-level configuration record, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identifies the student and the run
    pub student_id: String,
    #[serde(default)]
    pub wifi: WifiConfig,
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub sdn: SdnConfig,
    #[serde(default)]
    pub testing: TestingConfig,
}

/// WiFi lab with mobile stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// Network name; defaults to the student id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    /// WPA2 passphrase; defaults to the student id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Noise threshold in dBm for the interference medium
    pub noise_threshold: i32,
    pub propagation: PropagationModel,
    pub area: Area,
    /// Pause after mobility is scheduled, before the summary is shown
    #[serde(with = "humantime_serde")]
    pub settle_time: Duration,
    pub access_points: Vec<AccessPointConfig>,
    pub stations: Vec<StationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationModel {
    pub model: String,
    /// Path loss exponent
    pub exp: f64,
}

impl Default for PropagationModel {
    fn default() -> Self {
        Self { model: "logDistance".to_string(), exp: 4.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPointConfig {
    pub name: String,
    pub position: Position,
    pub channel: u8,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    pub ip: Ipv4Cidr,
    pub start_position: Position,
    pub end_position: Position,
    /// Seconds
    pub start_time: u32,
    pub end_time: u32,
    pub min_speed: f64,
    pub max_speed: f64,
}

/// Wired lab with NAT access to a cloud-hosted website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub render_url: String,
    pub github_repo: String,
    pub switch_count: usize,
    pub hosts: Vec<CloudHostConfig>,
    pub gateway: Ipv4Addr,
    pub dns: Ipv4Addr,
    /// 1-based index of the switch the NAT gateway attaches to
    pub nat_switch: usize,
    pub link: LinkParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudHostConfig {
    pub name: String,
    pub ip: Ipv4Cidr,
    /// 1-based switch index
    pub switch: usize,
}

/// SDN lab with a linear switch chain and an external controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdnConfig {
    pub assigned_host: String,
    pub assigned_server: String,
    pub assigned_port: u16,
    pub switch_count: usize,
    pub host_count: usize,
    /// Hosts h1..hN receive consecutive addresses from this network
    pub host_network: Ipv4Cidr,
    pub servers: Vec<ServerConfig>,
    pub controller: ControllerConfig,
    /// OpenFlow version spoken by the switches
    pub protocol: String,
    /// Time given to the controller to discover the topology
    #[serde(with = "humantime_serde")]
    pub convergence_delay: Duration,
    pub link: LinkParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub ip: Ipv4Cidr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub gui_port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    pub ping_count: u32,
    #[serde(with = "humantime_serde")]
    pub udp_test_duration: Duration,
    /// iperf bandwidth, e.g. `100M`
    pub udp_bandwidth: String,
}

impl Config {
    /// The record shipped to students, with every placeholder in place
    pub fn template() -> Self {
        Self {
            student_id: PLACEHOLDER_STUDENT_ID.to_string(),
            wifi: WifiConfig::default(),
            cloud: CloudConfig::default(),
            sdn: SdnConfig::default(),
            testing: TestingConfig::default(),
        }
    }

    /// Effective SSID
    pub fn ssid(&self) -> &str {
        self.wifi.ssid.as_deref().unwrap_or(&self.student_id)
    }

    /// Effective WPA2 passphrase
    pub fn password(&self) -> &str {
        self.wifi.password.as_deref().unwrap_or(&self.student_id)
    }

    /// Validate the settings shared by every lab
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.student_id.trim().is_empty() {
            return Err(ValidationError::InvalidGeneral("student_id cannot be empty".to_string()));
        }
        self.validate_testing()
    }

    /// Validate the shared settings plus the section `task` is built from.
    ///
    /// Sections of other labs are not looked at, so a student id that is too
    /// short for a WPA2 passphrase does not block the wired labs.
    pub fn validate_for(&self, task: Task) -> Result<(), ValidationError> {
        self.validate()?;
        match task {
            Task::Wifi => self.validate_wifi(),
            Task::Cloud => self.validate_cloud(),
            Task::Sdn => self.validate_sdn(),
        }
    }

    fn validate_wifi(&self) -> Result<(), ValidationError> {
        let wifi = &self.wifi;
        let err = |msg: String| Err(ValidationError::InvalidWifi(msg));

        if self.ssid().is_empty() || self.ssid().len() > 32 {
            return err(format!("SSID '{}' must be 1-32 characters", self.ssid()));
        }
        // WPA2 passphrases are 8-63 characters
        if !(8..=63).contains(&self.password().len()) {
            return err(format!(
                "WPA2 password must be 8-63 characters (got {})",
                self.password().len()
            ));
        }
        if wifi.access_points.is_empty() {
            return err("at least one access point is required".to_string());
        }
        let names = wifi
            .access_points
            .iter()
            .map(|ap| ap.name.as_str())
            .chain(wifi.stations.iter().map(|s| s.name.as_str()));
        if let Some(dup) = find_duplicate(names) {
            return err(format!("node name '{}' is used more than once", dup));
        }
        for ap in &wifi.access_points {
            if !(1..=14).contains(&ap.channel) {
                return err(format!("{}: channel {} is outside 1-14", ap.name, ap.channel));
            }
            if !(ap.range > 0.0 && ap.range.is_finite()) {
                return err(format!("{}: range must be a positive finite number", ap.name));
            }
        }
        for sta in &wifi.stations {
            if sta.start_time >= sta.end_time {
                return err(format!(
                    "{}: start_time {}s must be before end_time {}s",
                    sta.name, sta.start_time, sta.end_time
                ));
            }
            // the schedule stops one second after the last move ends
            if sta.end_time == u32::MAX {
                return err(format!("{}: end_time {}s is too late", sta.name, sta.end_time));
            }
            if !(sta.min_speed >= 0.0) || !sta.max_speed.is_finite() || sta.min_speed > sta.max_speed {
                return err(format!(
                    "{}: speed bounds {}..{} are invalid",
                    sta.name, sta.min_speed, sta.max_speed
                ));
            }
        }
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !(positive(wifi.area.max_x) && positive(wifi.area.max_y)) {
            return err("mobility area must have positive finite dimensions".to_string());
        }
        if !positive(wifi.propagation.exp) {
            return err(format!("propagation exponent {} must be positive and finite", wifi.propagation.exp));
        }
        Ok(())
    }

    fn validate_cloud(&self) -> Result<(), ValidationError> {
        let cloud = &self.cloud;
        let err = |msg: String| Err(ValidationError::InvalidCloud(msg));

        if cloud.switch_count == 0 {
            return err("switch_count must be at least 1".to_string());
        }
        if cloud.hosts.is_empty() {
            return err("at least one host is required".to_string());
        }
        if let Some(dup) = find_duplicate(cloud.hosts.iter().map(|h| h.name.as_str())) {
            return err(format!("host name '{}' is used more than once", dup));
        }
        for host in &cloud.hosts {
            if !(1..=cloud.switch_count).contains(&host.switch) {
                return err(format!(
                    "{} attaches to switch {} but only s1-s{} exist",
                    host.name, host.switch, cloud.switch_count
                ));
            }
            if !host.ip.contains(cloud.gateway) {
                return err(format!(
                    "gateway {} is not inside {}'s network {}",
                    cloud.gateway, host.name, host.ip
                ));
            }
        }
        if !(1..=cloud.switch_count).contains(&cloud.nat_switch) {
            return err(format!(
                "nat_switch {} is outside s1-s{}",
                cloud.nat_switch, cloud.switch_count
            ));
        }
        if !cloud.render_url.starts_with("http://") && !cloud.render_url.starts_with("https://") {
            return err(format!("render_url '{}' must start with http:// or https://", cloud.render_url));
        }
        validate_link(&cloud.link).map_err(ValidationError::InvalidCloud)
    }

    fn validate_sdn(&self) -> Result<(), ValidationError> {
        let sdn = &self.sdn;
        let err = |msg: String| Err(ValidationError::InvalidSdn(msg));

        if !(1..=255).contains(&sdn.host_count) {
            return err(format!("host_count {} must be between 1 and 255", sdn.host_count));
        }
        if sdn.servers.is_empty() || sdn.servers.len() > 255 {
            return err("between 1 and 255 servers are required".to_string());
        }
        let edge_nodes = sdn.host_count + sdn.servers.len();
        if sdn.switch_count < edge_nodes {
            return err(format!(
                "{} switches cannot give {} hosts and {} servers a switch each",
                sdn.switch_count,
                sdn.host_count,
                sdn.servers.len()
            ));
        }
        if sdn.host_network.nth_host(sdn.host_count as u32).is_err() {
            return err(format!(
                "host_network {} cannot address {} hosts",
                sdn.host_network, sdn.host_count
            ));
        }
        let host_names = (1..=sdn.host_count).map(|i| format!("h{}", i)).collect::<Vec<_>>();
        let all_names = host_names
            .iter()
            .map(String::as_str)
            .chain(sdn.servers.iter().map(|s| s.name.as_str()));
        if let Some(dup) = find_duplicate(all_names) {
            return err(format!("node name '{}' is used more than once", dup));
        }
        if !host_names.contains(&sdn.assigned_host) {
            return err(format!(
                "assigned_host '{}' is not one of h1-h{}",
                sdn.assigned_host, sdn.host_count
            ));
        }
        if !sdn.servers.iter().any(|s| s.name == sdn.assigned_server) {
            return err(format!("assigned_server '{}' is not a configured server", sdn.assigned_server));
        }
        if sdn.assigned_port == 0 {
            return err("assigned_port cannot be 0".to_string());
        }
        if sdn.controller.port == 0 {
            return err("controller port cannot be 0".to_string());
        }
        if sdn.protocol.trim().is_empty() {
            return err("protocol cannot be empty".to_string());
        }
        validate_link(&sdn.link).map_err(ValidationError::InvalidSdn)
    }

    fn validate_testing(&self) -> Result<(), ValidationError> {
        let testing = &self.testing;
        if testing.ping_count == 0 {
            return Err(ValidationError::InvalidTesting("ping_count must be at least 1".to_string()));
        }
        if testing.udp_test_duration.is_zero() {
            return Err(ValidationError::InvalidTesting("udp_test_duration cannot be zero".to_string()));
        }
        if !is_valid_bandwidth(&testing.udp_bandwidth) {
            return Err(ValidationError::InvalidTesting(format!(
                "udp_bandwidth '{}' is not an iperf bandwidth such as 100M",
                testing.udp_bandwidth
            )));
        }
        Ok(())
    }

    /// IP of the configured server with the given name
    pub fn server_ip(&self, name: &str) -> Option<Ipv4Addr> {
        self.sdn.servers.iter().find(|s| s.name == name).map(|s| s.ip.addr)
    }
}

fn validate_link(link: &LinkParams) -> Result<(), String> {
    match link.bandwidth {
        Some(bw) if !(bw > 0.0 && bw.is_finite()) => {
            Err(format!("link bandwidth {} must be a positive finite number of Mbit/s", bw))
        }
        _ => Ok(()),
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid wifi configuration: {0}")]
    InvalidWifi(String),
    #[error("Invalid cloud configuration: {0}")]
    InvalidCloud(String),
    #[error("Invalid sdn configuration: {0}")]
    InvalidSdn(String),
    #[error("Invalid testing configuration: {0}")]
    InvalidTesting(String),
    #[error("Placeholder value must be replaced: {0}")]
    Placeholder(String),
}

/// Default implementations
impl Default for Config {
    fn default() -> Self {
        Self::template()
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        let ap = |name: &str, x: f64, channel: u8| AccessPointConfig {
            name: name.to_string(),
            position: Position::new(x, 50.0, 0.0),
            channel,
            range: 50.0,
        };
        Self {
            ssid: None,
            password: None,
            noise_threshold: -91,
            propagation: PropagationModel::default(),
            area: Area::default(),
            settle_time: Duration::from_secs(5),
            access_points: vec![ap("AP1", 30.0, 1), ap("AP2", 60.0, 6), ap("AP3", 90.0, 11)],
            stations: vec![
                StationConfig {
                    name: "UE1".to_string(),
                    ip: Ipv4Cidr { addr: Ipv4Addr::new(192, 168, 1, 1), prefix: 24 },
                    start_position: Position::new(10.0, 30.0, 0.0),
                    end_position: Position::new(60.0, 50.0, 0.0),
                    start_time: 10,
                    end_time: 20,
                    min_speed: 1.0,
                    max_speed: 5.0,
                },
                StationConfig {
                    name: "UE2".to_string(),
                    ip: Ipv4Cidr { addr: Ipv4Addr::new(192, 168, 1, 2), prefix: 24 },
                    start_position: Position::new(10.0, 30.0, 0.0),
                    end_position: Position::new(90.0, 50.0, 0.0),
                    start_time: 30,
                    end_time: 60,
                    min_speed: 5.0,
                    max_speed: 10.0,
                },
            ],
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            render_url: PLACEHOLDER_RENDER_URL.to_string(),
            github_repo: PLACEHOLDER_GITHUB_REPO.to_string(),
            switch_count: 3,
            hosts: vec![
                CloudHostConfig {
                    name: "h1".to_string(),
                    ip: Ipv4Cidr { addr: Ipv4Addr::new(10, 0, 0, 1), prefix: 24 },
                    switch: 1,
                },
                CloudHostConfig {
                    name: "h2".to_string(),
                    ip: Ipv4Cidr { addr: Ipv4Addr::new(10, 0, 0, 2), prefix: 24 },
                    switch: 3,
                },
            ],
            gateway: Ipv4Addr::new(10, 0, 0, 254),
            dns: Ipv4Addr::new(8, 8, 8, 8),
            nat_switch: 1,
            link: LinkParams::default(),
        }
    }
}

impl Default for SdnConfig {
    fn default() -> Self {
        let server = |name: &str, first_octet: u8| ServerConfig {
            name: name.to_string(),
            ip: Ipv4Cidr { addr: Ipv4Addr::new(first_octet, 0, 0, 2), prefix: 8 },
        };
        Self {
            assigned_host: DEFAULT_ASSIGNED_HOST.to_string(),
            assigned_server: DEFAULT_ASSIGNED_SERVER.to_string(),
            assigned_port: DEFAULT_ASSIGNED_PORT,
            switch_count: 13,
            host_count: 10,
            host_network: Ipv4Cidr { addr: Ipv4Addr::new(172, 16, 0, 0), prefix: 16 },
            servers: vec![server("server1", 20), server("server2", 40), server("server3", 60)],
            controller: ControllerConfig::default(),
            protocol: "OpenFlow13".to_string(),
            convergence_delay: Duration::from_secs(15),
            link: LinkParams::default(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { ip: Ipv4Addr::LOCALHOST, port: 6653, gui_port: 8181 }
    }
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            ping_count: 4,
            udp_test_duration: Duration::from_secs(600),
            udp_bandwidth: "100M".to_string(),
        }
    }
}
