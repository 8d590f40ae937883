//! Node and link descriptor types.
//!
//! Descriptors are created once while a lab is being built and are not
//! mutated afterwards. Position updates during mobility belong to the
//! emulation runtime, not to these values.

use crate::utils::ip_utils::Ipv4Cidr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

/// Errors raised while assembling a topology graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("Duplicate node name '{0}'")]
    DuplicateNode(String),
    #[error("Link references undeclared node '{0}'")]
    UnknownNode(String),
    #[error("Node '{0}' cannot be linked to itself")]
    SelfLink(String),
    #[error("Duplicate link between '{0}' and '{1}'")]
    DuplicateLink(String, String),
    #[error("Invalid mobility schedule: {0}")]
    InvalidMobility(String),
    #[error("Invalid addressing: {0}")]
    InvalidAddress(String),
}

/// Cartesian position in metres, written as `x,y,z`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("Position '{}' must have three comma-separated coordinates", s));
        }
        let mut coords = [0.0f64; 3];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|e| format!("Invalid coordinate '{}' in position '{}': {}", part, s, e))?;
            if !slot.is_finite() {
                return Err(format!("Coordinate '{}' in position '{}' is not finite", part, s));
            }
        }
        Ok(Position::new(coords[0], coords[1], coords[2]))
    }
}

impl TryFrom<String> for Position {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(value: Position) -> Self {
        value.to_string()
    }
}

/// Wireless security applied to APs and stations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    Wpa2,
}

impl Encryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encryption::Wpa2 => "wpa2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub password: String,
    pub encryption: Encryption,
    /// 802.11 mode, e.g. `g`
    pub mode: String,
    pub channel: u8,
    pub position: Position,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub ip: Ipv4Cidr,
    pub position: Position,
    pub password: String,
    pub encryption: Encryption,
}

/// Wired end host; also used for servers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub ip: Ipv4Cidr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Switch {
    /// OpenFlow protocol version, e.g. `OpenFlow13`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Controller {
    /// Reference controller started by the runtime itself
    Local,
    /// External controller reached over OpenFlow
    Remote { ip: Ipv4Addr, port: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nat {
    pub ip: Ipv4Addr,
}

/// Role of a node together with its role specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum NodeRole {
    AccessPoint(AccessPoint),
    Station(Station),
    Host(Host),
    Server(Host),
    Switch(Switch),
    Controller(Controller),
    Nat(Nat),
}

/// Role discriminant used for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    AccessPoint,
    Station,
    Host,
    Server,
    Switch,
    Controller,
    Nat,
}

impl NodeRole {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRole::AccessPoint(_) => NodeKind::AccessPoint,
            NodeRole::Station(_) => NodeKind::Station,
            NodeRole::Host(_) => NodeKind::Host,
            NodeRole::Server(_) => NodeKind::Server,
            NodeRole::Switch(_) => NodeKind::Switch,
            NodeRole::Controller(_) => NodeKind::Controller,
            NodeRole::Nat(_) => NodeKind::Nat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub role: NodeRole,
}

impl NodeDescriptor {
    pub fn new(name: impl Into<String>, role: NodeRole) -> Self {
        Self { name: name.into(), role }
    }

    pub fn kind(&self) -> NodeKind {
        self.role.kind()
    }

    /// Whether the runtime starts this node against a controller
    pub fn is_switching(&self) -> bool {
        matches!(self.kind(), NodeKind::Switch | NodeKind::AccessPoint)
    }

    /// Primary IPv4 address, if the role carries one
    pub fn ip(&self) -> Option<Ipv4Addr> {
        match &self.role {
            NodeRole::Station(s) => Some(s.ip.addr),
            NodeRole::Host(h) | NodeRole::Server(h) => Some(h.ip.addr),
            NodeRole::Nat(n) => Some(n.ip),
            _ => None,
        }
    }
}

/// Optional traffic-control parameters for wired links
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkParams {
    /// Bandwidth in Mbit/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
}

impl LinkParams {
    pub fn is_empty(&self) -> bool {
        self.bandwidth.is_none() && self.delay.is_none()
    }
}

/// Undirected link between two declared nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub a: String,
    pub b: String,
    #[serde(default, skip_serializing_if = "LinkParams::is_empty")]
    pub params: LinkParams,
}

impl LinkDescriptor {
    /// Endpoints in a canonical order so `(a, b)` and `(b, a)` compare equal
    pub fn key(&self) -> (&str, &str) {
        if self.a <= self.b {
            (&self.a, &self.b)
        } else {
            (&self.b, &self.a)
        }
    }

    pub fn touches(&self, name: &str) -> bool {
        self.a == name || self.b == name
    }
}
