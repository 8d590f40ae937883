//! Lab orchestrator.
//!
//! This module coordinates one run of the tool, managing the flow from a
//! validated configuration through placeholder confirmation, lab
//! construction, an in-memory rehearsal of the lifecycle, and finally the
//! plan and launcher files handed to the emulation runtime.

use crate::config::Config;
use crate::confirm::{confirm_placeholders, find_placeholders, Decision};
use crate::lab::{Lab, Task};
use crate::runtime::{MininetScript, RecordingRuntime};
use crate::utils::script::{run_launcher, write_launcher_script};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Interpreter used to execute the rendered launcher
pub const LAUNCH_INTERPRETER: &str = "python3";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub task: Task,
    pub output_dir: PathBuf,
    /// Accept template values without prompting
    pub assume_yes: bool,
    /// Execute the launcher after writing it
    pub launch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The user declined to continue with template values
    Aborted,
    Generated { script: PathBuf, plan: PathBuf },
}

pub fn plan_file_name(task: Task) -> String {
    format!("{}_plan.json", task)
}

pub fn script_file_name(task: Task) -> String {
    format!("{}_topology.py", task)
}

/// Validate the configuration for the selected lab and run it
pub fn run<R: BufRead, W: Write>(
    config: &Config,
    options: &RunOptions,
    input: &mut R,
    output: &mut W,
) -> Result<RunOutcome> {
    let task = options.task;
    info!("Preparing {} lab ({})", task, task.title());

    config
        .validate_for(task)
        .wrap_err_with(|| format!("Configuration is not usable for the {} lab", task))?;

    let placeholders = find_placeholders(config, task);
    if confirm_placeholders(&placeholders, options.assume_yes, input, output)? == Decision::Abort {
        return Ok(RunOutcome::Aborted);
    }

    let lab = Lab::build(config, task).wrap_err_with(|| format!("Failed to build the {} topology", task))?;

    // Rehearse the whole lifecycle before anything is written
    let mut rehearsal = RecordingRuntime::new();
    lab.deploy(&mut rehearsal)
        .map_err(|e| eyre!("Lifecycle rehearsal for the {} lab failed: {}", task, e))?;
    info!("Rehearsal completed with {} runtime calls", rehearsal.calls().len());

    let plan = write_plan(&lab, options)?;

    let mut launcher = MininetScript::new(format!("{} (student {})", task.title(), config.student_id));
    lab.deploy(&mut launcher)
        .map_err(|e| eyre!("Failed to render the {} launcher: {}", task, e))?;
    let script = write_launcher_script(&options.output_dir, &script_file_name(task), &launcher.finish())?;
    info!("Generated launcher: {:?}", script);

    if options.launch {
        run_launcher(LAUNCH_INTERPRETER, &script)?;
    }

    Ok(RunOutcome::Generated { script, plan })
}

fn write_plan(lab: &Lab, options: &RunOptions) -> Result<PathBuf> {
    std::fs::create_dir_all(&options.output_dir)
        .wrap_err_with(|| format!("Failed to create output directory {:?}", options.output_dir))?;

    let path = options.output_dir.join(plan_file_name(lab.task));
    let json = serde_json::to_string_pretty(lab).wrap_err("Failed to serialize the lab plan")?;
    std::fs::write(&path, json).wrap_err_with(|| format!("Failed to write plan {:?}", path))?;
    info!("Generated plan: {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn configured() -> Config {
        let mut config = Config::template();
        config.student_id = "21012345".to_string();
        config.cloud.render_url = "https://lab-21012345.onrender.com".to_string();
        config.cloud.github_repo = "https://github.com/student/lab".to_string();
        config.sdn.assigned_host = "h2".to_string();
        config
    }

    fn options(task: Task, dir: &std::path::Path) -> RunOptions {
        RunOptions { task, output_dir: dir.to_path_buf(), assume_yes: false, launch: false }
    }

    #[test]
    fn test_generates_plan_and_launcher_for_each_task() {
        let dir = tempdir().unwrap();
        for task in [Task::Wifi, Task::Cloud, Task::Sdn] {
            let mut input = Cursor::new(Vec::new());
            let mut output = Vec::new();
            let outcome = run(&configured(), &options(task, dir.path()), &mut input, &mut output).unwrap();

            match outcome {
                RunOutcome::Generated { script, plan } => {
                    assert_eq!(script, dir.path().join(script_file_name(task)));
                    assert!(std::fs::read_to_string(&script).unwrap().contains("def run():"));
                    let plan: serde_json::Value =
                        serde_json::from_str(&std::fs::read_to_string(plan).unwrap()).unwrap();
                    assert_eq!(plan["task"], task.as_str());
                }
                RunOutcome::Aborted => panic!("{} aborted without placeholders", task),
            }
            assert!(output.is_empty());
        }
    }

    #[test]
    fn test_declined_confirmation_writes_nothing() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let mut config = configured();
        config.sdn.assigned_host = "h1".to_string();

        let mut input = Cursor::new(b"n\n".to_vec());
        let mut output = Vec::new();
        let outcome = run(&config, &options(Task::Sdn, &out_dir), &mut input, &mut output).unwrap();
        assert_eq!(outcome, RunOutcome::Aborted);
        assert!(!out_dir.exists());
        assert!(String::from_utf8(output).unwrap().contains("(y/n)"));
    }

    #[test]
    fn test_fatal_placeholder_is_an_error() {
        let dir = tempdir().unwrap();
        let mut input = Cursor::new(b"y\n".to_vec());
        let mut output = Vec::new();
        let result = run(&Config::template(), &options(Task::Wifi, dir.path()), &mut input, &mut output);
        assert!(result.is_err());
    }

    #[test]
    fn test_assume_yes_accepts_template() {
        let dir = tempdir().unwrap();
        let mut opts = options(Task::Sdn, dir.path());
        opts.assume_yes = true;
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let outcome = run(&Config::template(), &opts, &mut input, &mut output).unwrap();
        assert!(matches!(outcome, RunOutcome::Generated { .. }));
    }

    #[test]
    fn test_short_student_id_only_blocks_wifi() {
        let dir = tempdir().unwrap();
        let mut config = configured();
        config.student_id = "S12345".to_string();

        for task in [Task::Cloud, Task::Sdn] {
            let mut input = Cursor::new(Vec::new());
            let mut output = Vec::new();
            let outcome = run(&config, &options(task, dir.path()), &mut input, &mut output).unwrap();
            assert!(matches!(outcome, RunOutcome::Generated { .. }), "{}", task);
        }

        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let result = run(&config, &options(Task::Wifi, dir.path()), &mut input, &mut output);
        assert!(result.is_err());
        assert!(!dir.path().join("wifi_topology.py").exists());
    }

    #[test]
    fn test_plan_records_sdn_graph() {
        let dir = tempdir().unwrap();
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        run(&configured(), &options(Task::Sdn, dir.path()), &mut input, &mut output).unwrap();

        let plan: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("sdn_plan.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(plan["topology"]["links"].as_array().unwrap().len(), 25);
        assert_eq!(plan["checks"].as_array().unwrap().len(), 3);
        assert_eq!(plan["settle"], "15s");
    }
}
