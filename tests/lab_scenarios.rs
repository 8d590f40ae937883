use labtopo::config::Config;
use labtopo::config_loader::{load_config, write_template};
use labtopo::lab::{Lab, Task};
use labtopo::orchestrator::{run, RunOptions, RunOutcome};
use labtopo::runtime::{RecordingRuntime, RuntimeCall, RuntimeState};
use labtopo::topology::NodeKind;
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, NamedTempFile};

const STUDENT_CONFIG: &str = r#"
student_id: "21012345"
cloud:
  render_url: "https://lab-21012345.onrender.com"
  github_repo: "https://github.com/student/lab"
sdn:
  assigned_host: h4
  assigned_server: server2
  assigned_port: 6001
  link:
    bandwidth: 10
    delay: 2ms
"#;

fn student_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", STUDENT_CONFIG).unwrap();
    file
}

fn generate(config: &Config, task: Task, dir: &Path, answer: &str) -> RunOutcome {
    let options = RunOptions { task, output_dir: dir.to_path_buf(), assume_yes: false, launch: false };
    let mut input = Cursor::new(answer.as_bytes().to_vec());
    let mut output = Vec::new();
    run(config, &options, &mut input, &mut output).unwrap()
}

/// Ten hosts, three servers and thirteen switches give 13 edge links and a 12 link chain
#[test]
fn test_sdn_reference_lab_end_to_end() {
    let file = student_config();
    let config = load_config(file.path()).unwrap();
    let dir = tempdir().unwrap();

    let script = match generate(&config, Task::Sdn, dir.path(), "") {
        RunOutcome::Generated { script, .. } => script,
        RunOutcome::Aborted => panic!("configured lab must not prompt"),
    };
    let text = std::fs::read_to_string(&script).unwrap();

    assert_eq!(text.matches("net.addSwitch(").count(), 13);
    assert_eq!(text.matches("net.addHost(").count(), 13);
    assert_eq!(text.matches("net.addLink(").count(), 25);
    assert!(text.contains("net.addLink(h1, s1, bw=10, delay=\"2ms\")"));
    assert!(text.contains("net.addLink(server3, s13, bw=10, delay=\"2ms\")"));
    assert!(text.contains("net.addLink(s12, s13, bw=10, delay=\"2ms\")"));
    assert!(text.contains("controller=RemoteController, ip=\"127.0.0.1\", port=6653"));
    assert!(text.contains("protocols=\"OpenFlow13\""));
    assert!(text.contains("time.sleep(15)"));
    assert!(text.contains("h4.cmd(\"ping -c 4 40.0.0.2\")"));

    // the launcher builds once every node and link is declared
    let build_at = text.find("net.build()").unwrap();
    assert!(text.rfind("net.addLink(").unwrap() < build_at);
    assert!(text.find("CLI(net)").unwrap() < text.find("net.stop()").unwrap());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn test_rehearsal_matches_graph() {
    let file = student_config();
    let config = load_config(file.path()).unwrap();

    for task in [Task::Wifi, Task::Cloud, Task::Sdn] {
        let lab = Lab::build(&config, task).unwrap();
        let mut rt = RecordingRuntime::new();
        lab.deploy(&mut rt).unwrap();
        assert_eq!(rt.state(), RuntimeState::Stopped);

        let switching = lab.topology.count(NodeKind::Switch) + lab.topology.count(NodeKind::AccessPoint);
        let started = rt.count_calls(|c| matches!(c, RuntimeCall::StartSwitch { .. }));
        assert_eq!(started, switching, "{}", task);
    }
}

#[test]
fn test_wifi_launcher_uses_wireless_runtime() {
    let file = student_config();
    let config = load_config(file.path()).unwrap();
    let dir = tempdir().unwrap();
    generate(&config, Task::Wifi, dir.path(), "");

    let text = std::fs::read_to_string(dir.path().join("wifi_topology.py")).unwrap();
    assert!(text.contains("Mininet_wifi("));
    assert!(text.contains("noise_th=-91"));
    assert!(text.contains("ssid=\"21012345\""));
    assert!(text.contains("encrypt=\"wpa2\""));
    assert!(text.contains("net.setPropagationModel(model=\"logDistance\", exp=4)"));
    assert!(text.contains("net.configureWifiNodes()"));
    assert!(text.contains("net.stopMobility(time=61)"));
}

#[test]
fn test_cloud_launcher_configures_nat() {
    let file = student_config();
    let config = load_config(file.path()).unwrap();
    let dir = tempdir().unwrap();
    generate(&config, Task::Cloud, dir.path(), "");

    let text = std::fs::read_to_string(dir.path().join("cloud_topology.py")).unwrap();
    assert!(text.contains("net.addNAT(\"nat0\", ip=\"10.0.0.254\", connect=False)"));
    assert!(text.contains("nat0.configDefault()"));
    assert!(text.contains("ip route add default via 10.0.0.254"));
    assert!(text.find("net.build()").unwrap() < text.find("nat0.configDefault()").unwrap());
}

#[test]
fn test_template_values_need_confirmation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lab.yaml");
    write_template(&path).unwrap();
    let config = load_config(&path).unwrap();
    let out = dir.path().join("out");

    assert_eq!(generate(&config, Task::Cloud, &out, "no\n"), RunOutcome::Aborted);
    assert!(!out.exists());

    assert!(matches!(generate(&config, Task::Cloud, &out, "y\n"), RunOutcome::Generated { .. }));
    assert!(out.join("cloud_topology.py").exists());
    assert!(out.join("cloud_plan.json").exists());
}

#[test]
fn test_missing_config_exits_with_status_one() {
    let dir = tempdir().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_labtopo"))
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .env("RUST_LOG", "off")
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!dir.path().join("out").exists());
}
