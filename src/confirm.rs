//! Placeholder detection and interactive confirmation.
//!
//! The shipped template carries placeholder values. A lab whose
//! credentials derive from a placeholder is refused outright; other
//! placeholders only need the student to confirm before the lab is built.

use crate::config::{
    Config, ValidationError, DEFAULT_ASSIGNED_HOST, DEFAULT_ASSIGNED_PORT, DEFAULT_ASSIGNED_SERVER,
    PLACEHOLDER_GITHUB_REPO, PLACEHOLDER_RENDER_URL, PLACEHOLDER_STUDENT_ID,
};
use crate::lab::Task;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Cannot proceed at all
    Fatal,
    /// May proceed once the user says so
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub field: &'static str,
    pub value: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// List the fields of `config` relevant to `task` that still hold template values
pub fn find_placeholders(config: &Config, task: Task) -> Vec<Placeholder> {
    let mut found = Vec::new();

    if config.student_id == PLACEHOLDER_STUDENT_ID {
        // the WiFi SSID and passphrase default to the student id
        let severity = match task {
            Task::Wifi if config.wifi.ssid.is_none() || config.wifi.password.is_none() => Severity::Fatal,
            _ => Severity::Confirm,
        };
        found.push(Placeholder {
            field: "student_id",
            value: config.student_id.clone(),
            severity,
        });
    }

    match task {
        Task::Wifi => {}
        Task::Cloud => {
            if config.cloud.render_url == PLACEHOLDER_RENDER_URL {
                found.push(Placeholder {
                    field: "cloud.render_url",
                    value: config.cloud.render_url.clone(),
                    severity: Severity::Confirm,
                });
            }
            if config.cloud.github_repo == PLACEHOLDER_GITHUB_REPO {
                found.push(Placeholder {
                    field: "cloud.github_repo",
                    value: config.cloud.github_repo.clone(),
                    severity: Severity::Confirm,
                });
            }
        }
        Task::Sdn => {
            let sdn = &config.sdn;
            // a real assignment may share one or two values with the example
            if sdn.assigned_host == DEFAULT_ASSIGNED_HOST
                && sdn.assigned_server == DEFAULT_ASSIGNED_SERVER
                && sdn.assigned_port == DEFAULT_ASSIGNED_PORT
            {
                for (field, value) in [
                    ("sdn.assigned_host", sdn.assigned_host.clone()),
                    ("sdn.assigned_server", sdn.assigned_server.clone()),
                    ("sdn.assigned_port", sdn.assigned_port.to_string()),
                ] {
                    found.push(Placeholder { field, value, severity: Severity::Confirm });
                }
            }
        }
    }

    found
}

/// Refuse fatal placeholders and ask before proceeding with the rest.
///
/// `assume_yes` skips the prompt. Anything other than `y`/`yes` on the
/// input, including end of input, aborts.
pub fn confirm_placeholders<R: BufRead, W: Write>(
    placeholders: &[Placeholder],
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
) -> Result<Decision, ValidationError> {
    if let Some(fatal) = placeholders.iter().find(|p| p.severity == Severity::Fatal) {
        return Err(ValidationError::Placeholder(format!(
            "{} is still '{}'; edit the configuration file and set your own value",
            fatal.field, fatal.value
        )));
    }
    if placeholders.is_empty() {
        return Ok(Decision::Proceed);
    }
    if assume_yes {
        for p in placeholders {
            log::warn!("Proceeding with template value for {}: {}", p.field, p.value);
        }
        return Ok(Decision::Proceed);
    }

    let rule = "=".repeat(70);
    let mut warning = format!("\n{}\nWARNING: Using template values!\n", rule);
    warning.push_str("Please check your assignment sheet and update:\n");
    for p in placeholders {
        warning.push_str(&format!("  - {} (currently '{}')\n", p.field, p.value));
    }
    warning.push_str("\nContinue with these values? (y/n): ");
    write_prompt(output, &warning)?;

    let mut answer = String::new();
    let read = input
        .read_line(&mut answer)
        .map_err(|e| ValidationError::Placeholder(format!("cannot read confirmation: {}", e)))?;
    let accepted = read > 0 && matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");

    write_prompt(output, &format!("{}\n\n", rule))?;
    if accepted {
        Ok(Decision::Proceed)
    } else {
        log::warn!("Aborted: template values were not confirmed");
        Ok(Decision::Abort)
    }
}

fn write_prompt<W: Write>(output: &mut W, text: &str) -> Result<(), ValidationError> {
    output
        .write_all(text.as_bytes())
        .and_then(|_| output.flush())
        .map_err(|e| ValidationError::Placeholder(format!("cannot prompt for confirmation: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn configured() -> Config {
        let mut config = Config::template();
        config.student_id = "21012345".to_string();
        config.cloud.render_url = "https://lab.onrender.com".to_string();
        config.cloud.github_repo = "https://github.com/student/lab".to_string();
        config.sdn.assigned_host = "h4".to_string();
        config
    }

    fn ask(placeholders: &[Placeholder], input: &str) -> (Result<Decision, ValidationError>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = confirm_placeholders(placeholders, false, &mut reader, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_configured_record_has_no_placeholders() {
        for task in [Task::Wifi, Task::Cloud, Task::Sdn] {
            assert!(find_placeholders(&configured(), task).is_empty(), "{}", task);
        }
    }

    #[test]
    fn test_template_student_id_is_fatal_for_wifi() {
        let config = Config::template();
        let found = find_placeholders(&config, Task::Wifi);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Fatal);
        let (result, _) = ask(&found, "y\n");
        assert!(matches!(result, Err(ValidationError::Placeholder(_))));
    }

    #[test]
    fn test_explicit_credentials_downgrade_wifi_student_id() {
        let mut config = Config::template();
        config.wifi.ssid = Some("labnet".to_string());
        config.wifi.password = Some("correct-horse".to_string());
        let found = find_placeholders(&config, Task::Wifi);
        assert_eq!(found[0].severity, Severity::Confirm);
    }

    #[test]
    fn test_sdn_default_assignment_requires_confirmation() {
        let mut config = configured();
        config.sdn.assigned_host = DEFAULT_ASSIGNED_HOST.to_string();
        let found = find_placeholders(&config, Task::Sdn);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| p.severity == Severity::Confirm));

        let (result, prompt) = ask(&found, "n\n");
        assert_eq!(result.unwrap(), Decision::Abort);
        assert!(prompt.contains("sdn.assigned_port (currently '5566')"));
        assert!(prompt.contains("Continue with these values? (y/n): "));

        let (result, _) = ask(&found, "Y\n");
        assert_eq!(result.unwrap(), Decision::Proceed);
        let (result, _) = ask(&found, "yes\n");
        assert_eq!(result.unwrap(), Decision::Proceed);
    }

    #[test]
    fn test_partial_default_assignment_is_accepted() {
        let mut config = configured();
        config.sdn.assigned_host = DEFAULT_ASSIGNED_HOST.to_string();
        config.sdn.assigned_port = 7001;
        assert!(find_placeholders(&config, Task::Sdn).is_empty());
    }

    #[test]
    fn test_cloud_placeholders() {
        let mut config = configured();
        config.cloud.render_url = PLACEHOLDER_RENDER_URL.to_string();
        let found = find_placeholders(&config, Task::Cloud);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, "cloud.render_url");
    }

    #[test]
    fn test_end_of_input_aborts() {
        let found = find_placeholders(&Config::template(), Task::Cloud);
        let (result, _) = ask(&found, "");
        assert_eq!(result.unwrap(), Decision::Abort);
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        let found = find_placeholders(&Config::template(), Task::Sdn);
        let mut reader = Cursor::new(Vec::new());
        let mut out = Vec::new();
        let result = confirm_placeholders(&found, true, &mut reader, &mut out).unwrap();
        assert_eq!(result, Decision::Proceed);
        assert!(out.is_empty());
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unwritable_prompt_is_an_error() {
        let found = find_placeholders(&Config::template(), Task::Cloud);
        let mut reader = Cursor::new(b"y\n".to_vec());
        let result = confirm_placeholders(&found, false, &mut reader, &mut ClosedOutput);
        match result {
            Err(ValidationError::Placeholder(msg)) => assert!(msg.contains("cannot prompt"), "{}", msg),
            other => panic!("expected a prompt error, got {:?}", other),
        }
    }

    #[test]
    fn test_no_placeholders_proceeds_silently() {
        let (result, prompt) = ask(&[], "");
        assert_eq!(result.unwrap(), Decision::Proceed);
        assert!(prompt.is_empty());
    }
}
