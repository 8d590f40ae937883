use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// IP utility types for node addressing

/// An IPv4 address together with its prefix length, written as `a.b.c.d/p`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    pub addr: Ipv4Addr,
    pub prefix: u8,
}

impl Ipv4Cidr {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, String> {
        if prefix > 32 {
            return Err(format!("Prefix length {} exceeds 32", prefix));
        }
        Ok(Self { addr, prefix })
    }

    /// Network mask for this prefix length
    pub fn netmask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - self.prefix)
        }
    }

    /// Network address (host bits cleared)
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.netmask())
    }

    /// Check whether `ip` lies inside this network
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.netmask() == u32::from(self.network())
    }

    /// Number of usable host addresses (network and broadcast excluded)
    pub fn host_capacity(&self) -> u64 {
        match self.prefix {
            32 => 1,
            31 => 2,
            p => (1u64 << (32 - p)) - 2,
        }
    }

    /// The `index`-th host address of this network, keeping the prefix length.
    ///
    /// Index 1 is the first usable address, so `172.16.0.0/16` with index 3
    /// yields `172.16.0.3/16`. Point-to-point /31 networks use both
    /// addresses and a /32 only holds its own address.
    pub fn nth_host(&self, index: u32) -> Result<Ipv4Cidr, String> {
        let out_of_range = || {
            format!(
                "Host index {} does not fit in {} ({} usable addresses)",
                index,
                self,
                self.host_capacity()
            )
        };
        if index == 0 || u64::from(index) > self.host_capacity() {
            return Err(out_of_range());
        }
        let offset = match self.prefix {
            32 | 31 => index - 1,
            _ => index,
        };
        let addr = u32::from(self.network())
            .checked_add(offset)
            .map(Ipv4Addr::from)
            .filter(|addr| self.contains(*addr))
            .ok_or_else(out_of_range)?;
        Ok(Ipv4Cidr { addr, prefix: self.prefix })
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("'{}' is missing a prefix length (expected a.b.c.d/p)", s))?;
        let addr = addr
            .parse::<Ipv4Addr>()
            .map_err(|e| format!("Invalid IPv4 address in '{}': {}", s, e))?;
        let prefix = prefix
            .parse::<u8>()
            .map_err(|e| format!("Invalid prefix length in '{}': {}", s, e))?;
        Ipv4Cidr::new(addr, prefix)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv4Cidr> for String {
    fn from(value: Ipv4Cidr) -> Self {
        value.to_string()
    }
}

/// Format a locally administered style MAC address from a 48-bit value.
///
/// Hosts use `index`, servers use `0x100 + index`, giving
/// `00:00:00:00:00:01` and `00:00:00:00:01:01` respectively.
pub fn mac_from_value(value: u64) -> String {
    let bytes = value.to_be_bytes();
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]
    )
}
