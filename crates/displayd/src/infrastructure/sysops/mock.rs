//! In-memory system delegate for tests and loopback deployments.
//!
//! Behaves like a tiny device: it keeps a settings store, an installed
//! package list, and a per-run notion of the foreground app, and records
//! every call so tests can assert on exactly what the session engine asked
//! the OS to do — without shelling out to anything.

use std::sync::Mutex;

use displayd_core::{OutputId, SettingsNamespace};

use super::{DelegateError, SystemDelegate};

/// A recording, in-memory [`SystemDelegate`].
#[derive(Default)]
pub struct MockSystemDelegate {
    /// Settings store backing `put_setting` / `get_setting`.
    settings: Mutex<Vec<((SettingsNamespace, String), String)>>,
    /// Installed package names; `launch_app` requires membership.
    installed: Mutex<Vec<String>>,
    /// Last package launched on any output; returned by `foreground_app`.
    foreground: Mutex<Option<String>>,
    /// Recorded `(output, package)` launches.
    pub launches: Mutex<Vec<(OutputId, String)>>,
    /// Recorded `(output, component)` activity launches.
    pub activity_launches: Mutex<Vec<(OutputId, String)>>,
    /// Recorded force-stops.
    pub stops: Mutex<Vec<String>>,
    /// Recorded `(package, permission)` grants.
    pub grants: Mutex<Vec<(String, String)>>,
    /// Recorded `(package, permission)` revocations.
    pub revocations: Mutex<Vec<(String, String)>>,
    /// Recorded raw shell commands.
    pub shell_commands: Mutex<Vec<String>>,
    /// When `true`, every call fails with [`DelegateError::Failed`].
    pub should_fail: bool,
}

impl MockSystemDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A delegate whose every call fails, for error-path tests.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Marks a package as installed so `launch_app` accepts it.
    pub fn add_installed(&self, package: &str) {
        self.installed
            .lock()
            .expect("installed list poisoned")
            .push(package.to_string());
    }

    fn fail_if_configured(&self) -> Result<(), DelegateError> {
        if self.should_fail {
            return Err(DelegateError::Failed("mock delegate failure".to_string()));
        }
        Ok(())
    }
}

impl SystemDelegate for MockSystemDelegate {
    fn launch_app(&self, output: OutputId, package: &str) -> Result<(), DelegateError> {
        self.fail_if_configured()?;
        if !self
            .installed
            .lock()
            .expect("installed list poisoned")
            .iter()
            .any(|p| p == package)
        {
            return Err(DelegateError::PackageNotFound(package.to_string()));
        }
        self.launches
            .lock()
            .expect("launch log poisoned")
            .push((output, package.to_string()));
        *self.foreground.lock().expect("foreground poisoned") = Some(package.to_string());
        Ok(())
    }

    fn launch_activity(
        &self,
        output: OutputId,
        package: &str,
        activity: &str,
        _extras: &[(String, String)],
    ) -> Result<(), DelegateError> {
        self.fail_if_configured()?;
        self.activity_launches
            .lock()
            .expect("activity log poisoned")
            .push((output, format!("{package}/{activity}")));
        *self.foreground.lock().expect("foreground poisoned") = Some(package.to_string());
        Ok(())
    }

    fn foreground_app(&self, _output: OutputId) -> Result<String, DelegateError> {
        self.fail_if_configured()?;
        Ok(self
            .foreground
            .lock()
            .expect("foreground poisoned")
            .clone()
            .unwrap_or_default())
    }

    fn force_stop(&self, package: &str) -> Result<(), DelegateError> {
        self.fail_if_configured()?;
        self.stops
            .lock()
            .expect("stop log poisoned")
            .push(package.to_string());
        let mut foreground = self.foreground.lock().expect("foreground poisoned");
        if foreground.as_deref() == Some(package) {
            *foreground = None;
        }
        Ok(())
    }

    fn install_package(&self, path: &str) -> Result<bool, DelegateError> {
        self.fail_if_configured()?;
        // Derive a package-ish name from the archive path, as an installer
        // would after parsing the manifest.
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or(path)
            .trim_end_matches(".apk")
            .to_string();
        self.installed
            .lock()
            .expect("installed list poisoned")
            .push(name);
        Ok(true)
    }

    fn uninstall_package(&self, package: &str) -> Result<bool, DelegateError> {
        self.fail_if_configured()?;
        let mut installed = self.installed.lock().expect("installed list poisoned");
        let before = installed.len();
        installed.retain(|p| p != package);
        Ok(installed.len() < before)
    }

    fn grant_permission(&self, package: &str, permission: &str) -> Result<(), DelegateError> {
        self.fail_if_configured()?;
        self.grants
            .lock()
            .expect("grant log poisoned")
            .push((package.to_string(), permission.to_string()));
        Ok(())
    }

    fn revoke_permission(&self, package: &str, permission: &str) -> Result<(), DelegateError> {
        self.fail_if_configured()?;
        self.revocations
            .lock()
            .expect("revocation log poisoned")
            .push((package.to_string(), permission.to_string()));
        Ok(())
    }

    fn put_setting(
        &self,
        namespace: SettingsNamespace,
        key: &str,
        value: &str,
    ) -> Result<(), DelegateError> {
        self.fail_if_configured()?;
        let mut settings = self.settings.lock().expect("settings store poisoned");
        let entry_key = (namespace, key.to_string());
        if let Some(entry) = settings.iter_mut().find(|(k, _)| *k == entry_key) {
            entry.1 = value.to_string();
        } else {
            settings.push((entry_key, value.to_string()));
        }
        Ok(())
    }

    fn get_setting(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> Result<Option<String>, DelegateError> {
        self.fail_if_configured()?;
        let settings = self.settings.lock().expect("settings store poisoned");
        Ok(settings
            .iter()
            .find(|((ns, k), _)| *ns == namespace && k == key)
            .map(|(_, v)| v.clone()))
    }

    fn installed_packages(&self) -> Result<Vec<String>, DelegateError> {
        self.fail_if_configured()?;
        Ok(self.installed.lock().expect("installed list poisoned").clone())
    }

    fn execute_shell(&self, command: &str) -> Result<String, DelegateError> {
        self.fail_if_configured()?;
        self.shell_commands
            .lock()
            .expect("shell log poisoned")
            .push(command.to_string());
        Ok(String::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip_per_namespace() {
        let delegate = MockSystemDelegate::new();
        for namespace in [
            SettingsNamespace::System,
            SettingsNamespace::Secure,
            SettingsNamespace::Global,
        ] {
            delegate
                .put_setting(namespace, "brightness", "200")
                .unwrap();
            assert_eq!(
                delegate.get_setting(namespace, "brightness").unwrap(),
                Some("200".to_string())
            );
        }
    }

    #[test]
    fn test_namespaces_do_not_share_keys() {
        let delegate = MockSystemDelegate::new();
        delegate
            .put_setting(SettingsNamespace::System, "k", "system-value")
            .unwrap();
        assert_eq!(
            delegate.get_setting(SettingsNamespace::Global, "k").unwrap(),
            None
        );
    }

    #[test]
    fn test_put_setting_overwrites_existing_value() {
        let delegate = MockSystemDelegate::new();
        delegate
            .put_setting(SettingsNamespace::Global, "k", "1")
            .unwrap();
        delegate
            .put_setting(SettingsNamespace::Global, "k", "2")
            .unwrap();
        assert_eq!(
            delegate.get_setting(SettingsNamespace::Global, "k").unwrap(),
            Some("2".to_string())
        );
    }

    #[test]
    fn test_launch_app_requires_installed_package() {
        let delegate = MockSystemDelegate::new();
        let result = delegate.launch_app(0, "com.missing.app");
        assert!(matches!(result, Err(DelegateError::PackageNotFound(_))));

        delegate.add_installed("com.example.app");
        delegate.launch_app(0, "com.example.app").unwrap();
        assert_eq!(delegate.foreground_app(0).unwrap(), "com.example.app");
    }

    #[test]
    fn test_force_stop_clears_foreground() {
        let delegate = MockSystemDelegate::new();
        delegate.add_installed("com.example.app");
        delegate.launch_app(0, "com.example.app").unwrap();

        delegate.force_stop("com.example.app").unwrap();

        assert_eq!(delegate.foreground_app(0).unwrap(), "");
    }

    #[test]
    fn test_install_then_uninstall_round_trips() {
        let delegate = MockSystemDelegate::new();
        assert!(delegate.install_package("/data/tmp/com.example.app.apk").unwrap());
        assert!(delegate
            .installed_packages()
            .unwrap()
            .contains(&"com.example.app".to_string()));

        assert!(delegate.uninstall_package("com.example.app").unwrap());
        assert!(!delegate.uninstall_package("com.example.app").unwrap());
    }

    #[test]
    fn test_failing_delegate_rejects_every_call() {
        let delegate = MockSystemDelegate::failing();
        assert!(delegate.execute_shell("ls").is_err());
        assert!(delegate
            .get_setting(SettingsNamespace::System, "k")
            .is_err());
    }
}
