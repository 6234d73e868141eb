//! SessionManager: the orchestration core.
//!
//! Tracks every active session, enforces the capacity ceiling, and owns the
//! single physical-display slot. Thread-safe: it is called concurrently
//! from however many transport threads the embedder runs.
//!
//! # Locking
//!
//! One mutex guards both the session map and the physical slot. That makes
//! the two invariants that matter here single critical sections:
//!
//! - Registration is atomic with respect to lookups — a session is either
//!   fully created and in the map, or absent.
//! - Slot acquisition and release are atomic — two racing
//!   `create_session(headless=false)` calls resolve to exactly one winner,
//!   and a racing `control_primary_display` either sees the winner or
//!   becomes it.
//!
//! Operations on a session that is already registered never take this lock,
//! so work on two different sessions cannot contend here.
//!
//! # The two physical-display contracts
//!
//! `create_session(headless=false)` fails fast with `PhysicalDisplayBusy`
//! when the slot is held; `control_primary_display` returns the holder
//! instead. Both are kept deliberately: the first serves "give me a fresh
//! exclusive session or tell me I'm blocked", the second "hand me the
//! shared physical-control handle whoever has it".

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use displayd_core::{OutputInfo, SessionConfig, SessionId, PHYSICAL_SESSION_ID};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::SessionError;
use crate::application::gestures::{GestureSynthesizer, InputEventSink};
use crate::application::session::Session;
use crate::infrastructure::surface::DisplayBackend;
use crate::infrastructure::sysops::SystemDelegate;

/// Default ceiling on concurrent sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10;

/// Map plus slot, guarded together (see module docs).
struct ManagerState {
    sessions: HashMap<SessionId, Arc<Session>>,
    /// Id of the session currently holding the physical display, if any.
    /// Invariant: always names an entry of `sessions` bound to the primary
    /// output.
    physical: Option<SessionId>,
}

/// The session orchestration engine.
///
/// Constructed once per process and handed to whatever serves the RPC
/// boundary; there is no global accessor.
pub struct SessionManager {
    state: Mutex<ManagerState>,
    max_sessions: usize,
    backend: Arc<dyn DisplayBackend>,
    gestures: GestureSynthesizer,
    delegate: Arc<dyn SystemDelegate>,
}

impl SessionManager {
    /// Creates a manager over the given backend, input sink, and delegate.
    pub fn new(
        max_sessions: usize,
        backend: Arc<dyn DisplayBackend>,
        input: Arc<dyn InputEventSink>,
        delegate: Arc<dyn SystemDelegate>,
    ) -> Self {
        Self {
            state: Mutex::new(ManagerState {
                sessions: HashMap::new(),
                physical: None,
            }),
            max_sessions,
            backend,
            gestures: GestureSynthesizer::new(input),
            delegate,
        }
    }

    /// Creates a new session.
    ///
    /// Headless: allocates a fresh virtual surface under a generated id.
    /// Non-headless: takes the physical-display slot, failing fast if held.
    ///
    /// # Errors
    ///
    /// [`SessionError::CapacityExceeded`] when a headless session would
    /// exceed the ceiling, [`SessionError::PhysicalDisplayBusy`] when the
    /// slot is held, [`SessionError::Allocation`] when the backend refuses
    /// the surface. On any error nothing is registered.
    pub fn create_session(&self, config: SessionConfig) -> Result<Arc<Session>, SessionError> {
        let mut state = self.state.lock().expect("manager state poisoned");
        Self::sweep_destroyed(&mut state);

        let session = if config.headless {
            if state.sessions.len() >= self.max_sessions {
                return Err(SessionError::CapacityExceeded(self.max_sessions));
            }
            let id = Uuid::new_v4().to_string();
            let allocation = self.backend.allocate(
                &format!("session-{id}"),
                config.width,
                config.height,
                config.density,
            )?;
            Arc::new(Session::headless(
                id,
                config,
                allocation,
                self.gestures.clone(),
                Arc::clone(&self.backend),
                Arc::clone(&self.delegate),
            ))
        } else {
            if state.physical.is_some() {
                return Err(SessionError::PhysicalDisplayBusy);
            }
            let session = self.new_physical_session();
            state.physical = Some(session.id().clone());
            session
        };

        info!(
            session = %session.id(),
            headless = session.is_headless(),
            output = session.output().id,
            "created session"
        );
        state
            .sessions
            .insert(session.id().clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Looks up a session by id.
    pub fn get_session(&self, id: &str) -> Option<Arc<Session>> {
        self.state
            .lock()
            .expect("manager state poisoned")
            .sessions
            .get(id)
            .cloned()
    }

    /// Snapshot of all session ids.
    pub fn list_session_ids(&self) -> Vec<SessionId> {
        self.state
            .lock()
            .expect("manager state poisoned")
            .sessions
            .keys()
            .cloned()
            .collect()
    }

    /// Destroys a session. No-op for an unknown id; idempotent.
    pub fn destroy_session(&self, id: &str) {
        let session = {
            let mut state = self.state.lock().expect("manager state poisoned");
            let Some(session) = state.sessions.remove(id) else {
                return;
            };
            if state.physical.as_deref() == Some(id) {
                state.physical = None;
            }
            session
        };
        // Release outside the lock; surface teardown needs no manager state.
        session.destroy();
        info!(session = id, "destroyed session");
    }

    /// Takes (or joins) control of the physical display.
    ///
    /// Idempotent-acquire: returns the session already holding the slot if
    /// any, otherwise creates it. Contrast with `create_session`'s
    /// fail-fast contract.
    pub fn control_primary_display(&self) -> Arc<Session> {
        let mut state = self.state.lock().expect("manager state poisoned");
        Self::sweep_destroyed(&mut state);

        if let Some(id) = &state.physical {
            let session = state
                .sessions
                .get(id)
                .expect("physical slot names a tracked session");
            return Arc::clone(session);
        }

        let session = self.new_physical_session();
        state.physical = Some(session.id().clone());
        state
            .sessions
            .insert(session.id().clone(), Arc::clone(&session));
        info!("took control of the physical display");
        session
    }

    /// Releases the physical display, destroying its session. No-op when
    /// the slot is free.
    pub fn release_primary_display(&self) {
        let session = {
            let mut state = self.state.lock().expect("manager state poisoned");
            let Some(id) = state.physical.take() else {
                return;
            };
            state.sessions.remove(&id)
        };
        if let Some(session) = session {
            session.destroy();
            info!("released physical display control");
        } else {
            // The slot should always name a tracked session; a bare slot
            // means the invariant was broken elsewhere.
            error!("physical slot was set but no session was tracked for it");
        }
    }

    /// Destroys every tracked session. Best-effort: each destruction is
    /// logged and one session's problems never block the rest.
    pub fn shutdown(&self) {
        let (sessions, had_physical) = {
            let mut state = self.state.lock().expect("manager state poisoned");
            let sessions: Vec<(SessionId, Arc<Session>)> = state.sessions.drain().collect();
            let had_physical = state.physical.take().is_some();
            (sessions, had_physical)
        };

        let count = sessions.len();
        for (id, session) in sessions {
            session.destroy();
            info!(session = %id, "destroyed session during shutdown");
        }
        if had_physical {
            warn!("physical display was still held at shutdown");
        }
        info!(count, "session manager shut down");
    }

    /// Enumerates all outputs, physical and virtual.
    pub fn list_outputs(&self) -> Vec<OutputInfo> {
        self.backend.list_outputs()
    }

    /// Names of all installed packages, via the system delegate.
    pub fn installed_packages(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.delegate.installed_packages()?)
    }

    /// Runs a shell command via the system delegate.
    pub fn execute_shell(&self, command: &str) -> Result<String, SessionError> {
        Ok(self.delegate.execute_shell(command)?)
    }

    /// Drops sessions that were destroyed directly through their own
    /// handle (the per-session `destroy()` entry point) so they stop
    /// counting against capacity and stop holding the physical slot.
    fn sweep_destroyed(state: &mut ManagerState) {
        state.sessions.retain(|_, session| !session.is_destroyed());
        let stale_slot = state
            .physical
            .as_ref()
            .is_some_and(|id| !state.sessions.contains_key(id));
        if stale_slot {
            state.physical = None;
        }
    }

    fn new_physical_session(&self) -> Arc<Session> {
        Arc::new(Session::physical(
            PHYSICAL_SESSION_ID.to_string(),
            self.gestures.clone(),
            Arc::clone(&self.backend),
            Arc::clone(&self.delegate),
        ))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
