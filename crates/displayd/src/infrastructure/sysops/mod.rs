//! System operations delegate: package, permission, settings, and process
//! primitives.
//!
//! The session engine treats these as an external collaborator behind the
//! [`SystemDelegate`] trait. [`shell::ShellDelegate`] implements it against
//! the device's command-line tooling (`pm`, `am`, `cmd package`, `dumpsys`,
//! `settings`); [`mock::MockSystemDelegate`] is the always-compiled
//! in-memory implementation used by tests and loopback deployments.

pub mod mock;
pub mod shell;

use displayd_core::{OutputId, SettingsNamespace};
use thiserror::Error;

/// Error type for delegated system operations.
#[derive(Debug, Error)]
pub enum DelegateError {
    /// The underlying command exceeded the configured timeout and was
    /// killed.
    #[error("command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    /// The named package does not exist or has no launchable activity.
    #[error("package not found: {0}")]
    PackageNotFound(String),

    /// The underlying operation failed; carries the tool's own message.
    #[error("{0}")]
    Failed(String),

    /// The shell process could not be spawned or waited on.
    #[error("shell process error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pass-through interface to OS-level package/permission/settings/process
/// primitives.
///
/// Every method is synchronous and bounded: implementations must not hang
/// indefinitely (the shell implementation kills its child on timeout).
pub trait SystemDelegate: Send + Sync {
    /// Launches the package's default activity on the given output.
    fn launch_app(&self, output: OutputId, package: &str) -> Result<(), DelegateError>;

    /// Launches a specific component on the given output, with string
    /// extras.
    fn launch_activity(
        &self,
        output: OutputId,
        package: &str,
        activity: &str,
        extras: &[(String, String)],
    ) -> Result<(), DelegateError>;

    /// Package name of the foreground app on the given output.
    fn foreground_app(&self, output: OutputId) -> Result<String, DelegateError>;

    /// Force-stops every process of the package.
    fn force_stop(&self, package: &str) -> Result<(), DelegateError>;

    /// Installs a package archive; `true` when the installer reported
    /// success.
    fn install_package(&self, path: &str) -> Result<bool, DelegateError>;

    /// Uninstalls a package; `true` when the installer reported success.
    fn uninstall_package(&self, package: &str) -> Result<bool, DelegateError>;

    /// Grants a runtime permission.
    fn grant_permission(&self, package: &str, permission: &str) -> Result<(), DelegateError>;

    /// Revokes a runtime permission.
    fn revoke_permission(&self, package: &str, permission: &str) -> Result<(), DelegateError>;

    /// Writes a settings value.
    fn put_setting(
        &self,
        namespace: SettingsNamespace,
        key: &str,
        value: &str,
    ) -> Result<(), DelegateError>;

    /// Reads a settings value; `None` when the key is unset.
    fn get_setting(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> Result<Option<String>, DelegateError>;

    /// Names of all installed packages.
    fn installed_packages(&self) -> Result<Vec<String>, DelegateError>;

    /// Runs an arbitrary shell command, returning its combined output.
    fn execute_shell(&self, command: &str) -> Result<String, DelegateError>;
}
