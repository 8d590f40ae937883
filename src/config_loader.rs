use crate::config::Config;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use log::info;
use std::fs;
use std::path::Path;

const TEMPLATE_HEADER: &str = "\
# Lab configuration
#
# Replace every placeholder with the values from your assignment sheet:
#   student_id        your student number (also the WiFi SSID and passphrase)
#   cloud.render_url  URL of your deployed website
#   cloud.github_repo repository holding the website source
#   sdn.assigned_*    host, server and port from your SDN assignment
#
# Durations accept humantime values such as 15s, 10m or 2ms.
";

/// Load and parse configuration from a YAML file.
///
/// Only the settings shared by every lab are validated here; the section
/// of the selected lab is checked when the run starts.
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let content = fs::read_to_string(config_path).wrap_err_with(|| {
        format!(
            "Configuration file {:?} could not be read; create one with --init",
            config_path
        )
    })?;

    let config: Config = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("Configuration file {:?} is not valid YAML for this tool", config_path))?;

    config
        .validate()
        .wrap_err_with(|| format!("Configuration file {:?} failed validation", config_path))?;

    Ok(config)
}

/// Write the placeholder template to `path`, never replacing an existing file
pub fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Refusing to overwrite existing file {:?}", path);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create directory {:?}", parent))?;
    }

    let body = serde_yaml::to_string(&Config::template()).wrap_err("Failed to serialize the template")?;
    fs::write(path, format!("{}\n{}", TEMPLATE_HEADER, body))
        .wrap_err_with(|| format!("Failed to write template to {:?}", path))?;

    info!("Wrote configuration template to {:?}", path);
    Ok(())
}
