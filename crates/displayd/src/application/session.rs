//! Session: a stateful handle bound to one display output.
//!
//! A session composes the gesture synthesizer, frame capture, and the
//! system delegate behind one API. Headless sessions exclusively own their
//! surface allocation; the physical session owns nothing beyond its slot in
//! the manager.
//!
//! The lifecycle is `Active → Destroyed`, one way, with no intermediate
//! states. Every operation except `destroy` checks the flag first and fails
//! with [`SessionError::SessionDestroyed`] once it is set. `destroy` is
//! idempotent and safe to race with in-flight operations: an operation that
//! started before the destroy either completes against resources it already
//! holds or observes the emptied surface slot and fails cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use displayd_core::{KeyCode, OutputInfo, SessionConfig, SessionId, SettingsNamespace};
use tracing::{debug, info};

use crate::application::error::SessionError;
use crate::application::gestures::{
    GestureSynthesizer, DEFAULT_DRAG_DURATION_MS, DEFAULT_LONG_PRESS_MS,
};
use crate::infrastructure::capture::{self, CaptureError};
use crate::infrastructure::surface::{DisplayBackend, SurfaceAllocation};
use crate::infrastructure::sysops::{DelegateError, SystemDelegate};

/// An active automation session bound to one output.
pub struct Session {
    id: SessionId,
    output: OutputInfo,
    config: SessionConfig,
    created_at: SystemTime,
    destroyed: AtomicBool,
    /// `Some` for headless sessions until destroy takes it; always `None`
    /// for the physical session.
    surface: Mutex<Option<SurfaceAllocation>>,
    gestures: GestureSynthesizer,
    backend: Arc<dyn DisplayBackend>,
    delegate: Arc<dyn SystemDelegate>,
}

impl Session {
    /// Creates a session owning a freshly allocated virtual surface.
    pub(crate) fn headless(
        id: SessionId,
        config: SessionConfig,
        allocation: SurfaceAllocation,
        gestures: GestureSynthesizer,
        backend: Arc<dyn DisplayBackend>,
        delegate: Arc<dyn SystemDelegate>,
    ) -> Self {
        let output = allocation.info().clone();
        Self {
            id,
            output,
            config,
            created_at: SystemTime::now(),
            destroyed: AtomicBool::new(false),
            surface: Mutex::new(Some(allocation)),
            gestures,
            backend,
            delegate,
        }
    }

    /// Creates the session bound to the physical display.
    pub(crate) fn physical(
        id: SessionId,
        gestures: GestureSynthesizer,
        backend: Arc<dyn DisplayBackend>,
        delegate: Arc<dyn SystemDelegate>,
    ) -> Self {
        let output = backend.primary_output();
        let config = SessionConfig {
            width: output.width,
            height: output.height,
            density: output.density,
            headless: false,
        };
        Self {
            id,
            output,
            config,
            created_at: SystemTime::now(),
            destroyed: AtomicBool::new(false),
            surface: Mutex::new(None),
            gestures,
            backend,
            delegate,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn output(&self) -> &OutputInfo {
        &self.output
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_headless(&self) -> bool {
        self.output.is_virtual
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_destroyed() {
            return Err(SessionError::SessionDestroyed(self.id.clone()));
        }
        Ok(())
    }

    // ── Screen operations ─────────────────────────────────────────────────────

    /// Captures the current frame as PNG bytes.
    pub fn capture_screen(&self) -> Result<Vec<u8>, SessionError> {
        self.ensure_active()?;
        if self.is_headless() {
            let sink = self.surface_sink()?;
            Ok(capture::capture_png(sink.as_ref())?)
        } else {
            let frame = self
                .backend
                .acquire_primary_frame()
                .ok_or(CaptureError::NoFrameAvailable)?;
            Ok(capture::encode_png(&frame)?)
        }
    }

    /// Captures the current frame as raw RGBA bytes (`width * height * 4`).
    pub fn capture_screen_raw(&self) -> Result<Vec<u8>, SessionError> {
        self.ensure_active()?;
        if self.is_headless() {
            let sink = self.surface_sink()?;
            Ok(capture::capture_raw(sink.as_ref())?)
        } else {
            let frame = self
                .backend
                .acquire_primary_frame()
                .ok_or(CaptureError::NoFrameAvailable)?;
            Ok(capture::strip_row_padding(&frame))
        }
    }

    /// The session's surface dimensions in pixels.
    pub fn screen_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    // ── Input operations ──────────────────────────────────────────────────────

    /// Taps at the given coordinates.
    pub fn click(&self, x: f32, y: f32) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.gestures.tap(self.output.id, x, y)?)
    }

    /// Presses and holds for `duration_ms` (default 500). Blocks the
    /// calling thread for the hold.
    pub fn long_press(
        &self,
        x: f32,
        y: f32,
        duration_ms: Option<u64>,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        let duration = duration_ms.unwrap_or(DEFAULT_LONG_PRESS_MS);
        Ok(self.gestures.long_press(self.output.id, x, y, duration)?)
    }

    /// Two quick taps at the given coordinates.
    pub fn double_click(&self, x: f32, y: f32) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.gestures.double_tap(self.output.id, x, y)?)
    }

    /// Drags from start to end over `duration_ms` (default 300). Blocks the
    /// calling thread for the gesture.
    pub fn drag(
        &self,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        duration_ms: Option<u64>,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        let duration = duration_ms.unwrap_or(DEFAULT_DRAG_DURATION_MS);
        Ok(self
            .gestures
            .drag(self.output.id, start_x, start_y, end_x, end_y, duration)?)
    }

    /// Types text as per-character key events; unmapped characters are
    /// skipped.
    pub fn type_text(&self, text: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.gestures.type_text(self.output.id, text)?)
    }

    /// Presses and releases a key.
    pub fn press_key(&self, code: KeyCode) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.gestures.key_press(self.output.id, code)?)
    }

    pub fn press_home(&self) -> Result<(), SessionError> {
        self.press_key(KeyCode::Home)
    }

    pub fn press_back(&self) -> Result<(), SessionError> {
        self.press_key(KeyCode::Back)
    }

    pub fn press_recents(&self) -> Result<(), SessionError> {
        self.press_key(KeyCode::AppSwitch)
    }

    pub fn press_power(&self) -> Result<(), SessionError> {
        self.press_key(KeyCode::Power)
    }

    pub fn press_volume_up(&self) -> Result<(), SessionError> {
        self.press_key(KeyCode::VolumeUp)
    }

    pub fn press_volume_down(&self) -> Result<(), SessionError> {
        self.press_key(KeyCode::VolumeDown)
    }

    // ── App operations ────────────────────────────────────────────────────────

    /// Launches a package's default activity on this session's output.
    pub fn launch_app(&self, package: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.delegate
            .launch_app(self.output.id, package)
            .map_err(map_package_error)
    }

    /// Launches a specific component on this session's output.
    pub fn launch_activity(
        &self,
        package: &str,
        activity: &str,
        extras: &[(String, String)],
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.delegate
            .launch_activity(self.output.id, package, activity, extras)
            .map_err(map_package_error)
    }

    /// Package name of the app in the foreground on this output.
    pub fn current_app(&self) -> Result<String, SessionError> {
        self.ensure_active()?;
        Ok(self.delegate.foreground_app(self.output.id)?)
    }

    /// Force-stops every process of the package.
    pub fn kill_app(&self, package: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.delegate.force_stop(package)?)
    }

    // ── System operations ─────────────────────────────────────────────────────

    /// Installs a package archive; `true` when the installer reported
    /// success.
    pub fn install_apk(&self, path: &str) -> Result<bool, SessionError> {
        self.ensure_active()?;
        Ok(self.delegate.install_package(path)?)
    }

    /// Uninstalls a package; `true` when the installer reported success.
    pub fn uninstall_app(&self, package: &str) -> Result<bool, SessionError> {
        self.ensure_active()?;
        Ok(self.delegate.uninstall_package(package)?)
    }

    pub fn grant_permission(&self, package: &str, permission: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.delegate.grant_permission(package, permission)?)
    }

    pub fn revoke_permission(&self, package: &str, permission: &str) -> Result<(), SessionError> {
        self.ensure_active()?;
        Ok(self.delegate.revoke_permission(package, permission)?)
    }

    /// Writes a settings value. The namespace must be one of
    /// `system | secure | global`.
    pub fn set_system_setting(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        let namespace: SettingsNamespace = namespace.parse()?;
        Ok(self.delegate.put_setting(namespace, key, value)?)
    }

    /// Reads a settings value; `None` when the key is unset.
    pub fn get_system_setting(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<String>, SessionError> {
        self.ensure_active()?;
        let namespace: SettingsNamespace = namespace.parse()?;
        Ok(self.delegate.get_setting(namespace, key)?)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Destroys the session, releasing its surface if headless.
    ///
    /// Idempotent: repeat calls are no-ops. Does not interrupt gestures
    /// already in flight; it only prevents new operations from starting.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            debug!(session = %self.id, "destroy called on already-destroyed session");
            return;
        }
        // Taking the allocation out drops the output handle exactly once;
        // a capture racing this sees the emptied slot and fails cleanly.
        let released = self
            .surface
            .lock()
            .expect("surface slot poisoned")
            .take()
            .is_some();
        info!(session = %self.id, released_surface = released, "session destroyed");
    }

    /// Clones the frame sink out of the surface slot.
    fn surface_sink(
        &self,
    ) -> Result<Arc<dyn crate::infrastructure::surface::FrameSink>, SessionError> {
        self.surface
            .lock()
            .expect("surface slot poisoned")
            .as_ref()
            .map(|allocation| Arc::clone(&allocation.sink))
            .ok_or_else(|| SessionError::SessionDestroyed(self.id.clone()))
    }
}

/// Maps a delegate's missing-package report to the caller-facing invalid
/// argument, leaving other delegate failures wrapped as delegate errors.
fn map_package_error(err: DelegateError) -> SessionError {
    match err {
        DelegateError::PackageNotFound(package) => {
            SessionError::InvalidArgument(format!("package not found: {package}"))
        }
        other => SessionError::Delegate(other),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
