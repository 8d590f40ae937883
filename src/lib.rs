//! # Labtopo - Configuration utility for coursework network emulation labs in Mininet
//!
//! This library turns a per-student YAML record into ready-to-run network
//! emulation labs for Mininet and Mininet-WiFi.
//!
//! ## Overview
//!
//! Each lab is a small, fully deterministic node/link graph plus a fixed
//! lifecycle: declare, build, start, configure, wait, check, brief the
//! student, hand over the interactive CLI, stop. The graph is rehearsed
//! against an in-memory runtime that enforces that lifecycle, then rendered
//! into a Python launcher the emulation runtime executes.
//!
//! ## Lab Variants
//!
//! - **WiFi**: three access points in a linear chain with WPA2, a
//!   log-distance propagation model and stations moving on a schedule
//! - **Cloud**: wired hosts behind a switch chain reaching a public website
//!   through a NAT gateway
//! - **SDN**: a linear chain of OpenFlow 1.3 switches, one host or server per
//!   switch, under an external (ONOS) controller
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Configuration record, documented defaults and validation
//! - `config_loader`: Configuration file loading and template generation
//! - `confirm`: Placeholder detection and interactive confirmation
//! - `topology`: Node/link descriptors, graph and mobility schedule
//! - `lab`: Per-task lab builders and the lifecycle driver
//! - `runtime`: Emulation runtime API, rehearsal recorder and Mininet launcher renderer
//! - `utils`: Addressing, validation and launcher script helpers
//! - `orchestrator`: High-level flow of a single run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use labtopo::lab::Task;
//! use labtopo::orchestrator::{run, RunOptions};
//! use labtopo::config_loader;
//! use std::path::{Path, PathBuf};
//!
//! let config = config_loader::load_config(Path::new("lab.yaml"))?;
//! let options = RunOptions {
//!     task: Task::Sdn,
//!     output_dir: PathBuf::from("lab_output"),
//!     assume_yes: false,
//!     launch: false,
//! };
//!
//! let stdin = std::io::stdin();
//! let stdout = std::io::stdout();
//! run(&config, &options, &mut stdin.lock(), &mut stdout.lock())?;
//!
//! // lab_output now contains:
//! // - sdn_plan.json: the lab graph and lifecycle data
//! // - sdn_topology.py: executable Mininet launcher
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Configuration Format
//!
//! Every section is optional except `student_id`:
//!
//! ```yaml
//! student_id: "21012345"
//!
//! cloud:
//!   render_url: "https://lab-21012345.onrender.com"
//!   github_repo: "https://github.com/student/lab"
//!
//! sdn:
//!   assigned_host: h4
//!   assigned_server: server2
//!   assigned_port: 6001
//!   convergence_delay: 15s
//!
//! testing:
//!   udp_test_duration: 10m
//!   udp_bandwidth: 100M
//! ```
//!
//! ## Lab Execution
//!
//! ```bash
//! sudo python3 lab_output/sdn_topology.py
//! ```
//!
//! ## Error Handling
//!
//! Module-level failures are typed (`ValidationError`, `TopologyError`,
//! `RuntimeError`); the loader, orchestrator and binary wrap them with
//! `color_eyre` context.

pub mod config;
pub mod config_loader;
pub mod confirm;
pub mod lab;
pub mod orchestrator;
pub mod runtime;
pub mod topology;
pub mod utils;
