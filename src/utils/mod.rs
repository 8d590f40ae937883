//! Shared utilities: IP addressing, value validation, launcher scripts.

pub mod ip_utils;
pub mod script;
pub mod validation;

pub use ip_utils::{mac_from_value, Ipv4Cidr};
pub use script::{run_launcher, write_launcher_script};
pub use validation::{find_duplicate, is_valid_bandwidth, url_host};
