//! Shell-backed system delegate.
//!
//! Every operation maps to one invocation of the device's command-line
//! tooling. Commands run under `sh -c` with piped output and a hard
//! timeout; a child that overruns the timeout is killed and the call fails
//! with [`DelegateError::Timeout`] — a wedged tool must never wedge the
//! calling session thread forever.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use displayd_core::{OutputId, SettingsNamespace};
use tracing::debug;

use super::{DelegateError, SystemDelegate};

/// Default per-command timeout, in seconds.
pub const DEFAULT_SHELL_TIMEOUT_SECS: u64 = 30;

/// Intent flags for app launches: new task + clear task.
const LAUNCH_INTENT_FLAGS: &str = "0x10008000";

/// Poll interval while waiting for a child to exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Output of one completed shell command.
#[derive(Debug)]
struct ShellOutput {
    success: bool,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

/// [`SystemDelegate`] implementation over the device's shell tooling.
pub struct ShellDelegate {
    timeout_secs: u64,
}

impl ShellDelegate {
    /// Creates a delegate with the given per-command timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Runs `command` under `sh -c`, enforcing the timeout.
    fn run(&self, command: &str) -> Result<ShellOutput, DelegateError> {
        debug!(command, "executing shell command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on their own threads so a chatty child can never
        // fill a pipe buffer and deadlock against our wait loop.
        let stdout_pipe = child.stdout.take().expect("stdout piped");
        let stderr_pipe = child.stderr.take().expect("stderr piped");
        let stdout_reader = thread::spawn(move || read_to_string_lossy(stdout_pipe));
        let stderr_reader = thread::spawn(move || read_to_string_lossy(stderr_pipe));

        let deadline = Instant::now() + Duration::from_secs(self.timeout_secs);
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    child.kill().ok();
                    child.wait().ok();
                    // The readers finish once the pipes close after the kill.
                    stdout_reader.join().ok();
                    stderr_reader.join().ok();
                    return Err(DelegateError::Timeout {
                        command: command.to_string(),
                        timeout_secs: self.timeout_secs,
                    });
                }
                None => thread::sleep(WAIT_POLL_INTERVAL),
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        Ok(ShellOutput {
            success: status.success(),
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }

    /// Runs a command and maps a non-zero exit to [`DelegateError::Failed`].
    fn run_checked(&self, command: &str) -> Result<ShellOutput, DelegateError> {
        let output = self.run(command)?;
        if !output.success {
            return Err(DelegateError::Failed(format!(
                "`{command}` exited {}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }
        Ok(output)
    }
}

impl SystemDelegate for ShellDelegate {
    fn launch_app(&self, output: OutputId, package: &str) -> Result<(), DelegateError> {
        // Resolve the package's launcher component first; `am start` needs a
        // concrete component to target a specific display.
        let resolved = self.run_checked(&format!(
            "cmd package resolve-activity --brief {}",
            quote(package)
        ))?;
        let component = resolved
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .unwrap_or_default()
            .to_string();
        if !component.contains('/') {
            return Err(DelegateError::PackageNotFound(package.to_string()));
        }

        self.start_component(output, &component, &[])
    }

    fn launch_activity(
        &self,
        output: OutputId,
        package: &str,
        activity: &str,
        extras: &[(String, String)],
    ) -> Result<(), DelegateError> {
        let component = format!("{package}/{activity}");
        self.start_component(output, &component, extras)
    }

    fn foreground_app(&self, output: OutputId) -> Result<String, DelegateError> {
        let dump = self.run_checked("dumpsys activity activities")?;
        Ok(parse_resumed_package(&dump.stdout, output).unwrap_or_default())
    }

    fn force_stop(&self, package: &str) -> Result<(), DelegateError> {
        self.run_checked(&format!("am force-stop {}", quote(package)))?;
        Ok(())
    }

    fn install_package(&self, path: &str) -> Result<bool, DelegateError> {
        let output = self.run(&format!("pm install -r {}", quote(path)))?;
        Ok(output.success && output.stdout.contains("Success"))
    }

    fn uninstall_package(&self, package: &str) -> Result<bool, DelegateError> {
        let output = self.run(&format!("pm uninstall {}", quote(package)))?;
        Ok(output.success && output.stdout.contains("Success"))
    }

    fn grant_permission(&self, package: &str, permission: &str) -> Result<(), DelegateError> {
        self.run_checked(&format!(
            "pm grant {} {}",
            quote(package),
            quote(permission)
        ))?;
        Ok(())
    }

    fn revoke_permission(&self, package: &str, permission: &str) -> Result<(), DelegateError> {
        self.run_checked(&format!(
            "pm revoke {} {}",
            quote(package),
            quote(permission)
        ))?;
        Ok(())
    }

    fn put_setting(
        &self,
        namespace: SettingsNamespace,
        key: &str,
        value: &str,
    ) -> Result<(), DelegateError> {
        self.run_checked(&format!(
            "settings put {} {} {}",
            namespace.as_str(),
            quote(key),
            quote(value)
        ))?;
        Ok(())
    }

    fn get_setting(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> Result<Option<String>, DelegateError> {
        let output = self.run_checked(&format!(
            "settings get {} {}",
            namespace.as_str(),
            quote(key)
        ))?;
        let value = output.stdout.trim();
        // The settings tool prints the literal string "null" for unset keys.
        if value.is_empty() || value == "null" {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }

    fn installed_packages(&self) -> Result<Vec<String>, DelegateError> {
        let output = self.run_checked("pm list packages")?;
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.trim().strip_prefix("package:"))
            .map(str::to_string)
            .collect())
    }

    fn execute_shell(&self, command: &str) -> Result<String, DelegateError> {
        let output = self.run(command)?;
        // Mirror interactive shell behavior: callers get everything the
        // command printed, with a marker when it failed.
        if !output.success && !output.stderr.is_empty() {
            Ok(format!(
                "ERROR (exit {}): {}\n{}",
                output.exit_code, output.stderr, output.stdout
            ))
        } else {
            Ok(format!("{}{}", output.stdout, output.stderr))
        }
    }
}

impl ShellDelegate {
    fn start_component(
        &self,
        output: OutputId,
        component: &str,
        extras: &[(String, String)],
    ) -> Result<(), DelegateError> {
        let mut command = format!(
            "am start --display {output} -n {} -f {LAUNCH_INTENT_FLAGS}",
            quote(component)
        );
        for (key, value) in extras {
            command.push_str(&format!(" -e {} {}", quote(key), quote(value)));
        }
        let result = self.run_checked(&command)?;
        // `am` reports some failures on stdout with a zero exit.
        if result.stdout.contains("Error:") {
            return Err(DelegateError::Failed(result.stdout.trim().to_string()));
        }
        Ok(())
    }
}

/// Extracts the resumed activity's package name from `dumpsys` output.
///
/// Looks for the `mResumedActivity` record, e.g.
/// `mResumedActivity: ActivityRecord{1234abc u0 com.example.app/.MainActivity t42}`,
/// and returns the token before the `/`.
fn parse_resumed_package(dump: &str, _output: OutputId) -> Option<String> {
    for line in dump.lines() {
        if !line.contains("mResumedActivity") {
            continue;
        }
        for token in line.split_whitespace() {
            if let Some(idx) = token.find('/') {
                let package = token[..idx].trim_start_matches('{');
                if !package.is_empty() {
                    return Some(package.to_string());
                }
            }
        }
    }
    None
}

/// Single-quotes a string for `sh -c`, escaping embedded quotes.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn read_to_string_lossy(mut pipe: impl Read) -> String {
    let mut bytes = Vec::new();
    pipe.read_to_end(&mut bytes).ok();
    String::from_utf8_lossy(&bytes).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
