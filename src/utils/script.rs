//! Launcher script utilities.
//!
//! Writes a rendered launcher to disk, marks it executable and runs it in
//! the foreground so the emulation runtime's interactive CLI takes over the
//! terminal.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Write a launcher script into `dir` and make it executable.
///
/// # Parameters
/// - `dir`: Output directory (created if missing)
/// - `script_name`: Filename for the script (e.g., "sdn_topology.py")
/// - `content`: The script content
pub fn write_launcher_script(dir: &Path, script_name: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", dir.display()))?;

    let script_path = dir.join(script_name);
    std::fs::write(&script_path, content)
        .wrap_err_with(|| format!("Failed to write script {:?}", script_path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&script_path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script_path, perms)?;
    }

    Ok(script_path)
}

/// Run a launcher with `interpreter`, inheriting stdio, and fail on a non-zero exit
pub fn run_launcher(interpreter: &str, script_path: &Path) -> Result<()> {
    log::info!("Launching {} {:?}", interpreter, script_path);
    let status = Command::new(interpreter)
        .arg(script_path)
        .status()
        .wrap_err_with(|| format!("Failed to start '{}'", interpreter))?;

    if !status.success() {
        return Err(eyre!("Launcher {:?} exited with {}", script_path, status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_launcher_script() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let path = write_launcher_script(&out, "lab.py", "print('hi')\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print('hi')\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_launcher_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_launcher_script(dir.path(), "ok.sh", "exit 0\n").unwrap();
        let bad = write_launcher_script(dir.path(), "bad.sh", "exit 3\n").unwrap();
        assert!(run_launcher("sh", &ok).is_ok());
        assert!(run_launcher("sh", &bad).is_err());
    }
}
