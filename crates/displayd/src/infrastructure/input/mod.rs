//! Input sink implementations.
//!
//! The [`InputEventSink`] trait is defined next to the gesture synthesizer
//! in the application layer; this module holds the implementations the
//! service ships with.
//!
//! # Why a recording sink?
//!
//! A real injection pipeline hands events to the device's input stack,
//! which:
//!
//! - Requires the platform input facility to be present.
//! - Actually delivers touches and keys to whatever is focused.
//! - Cannot be observed from test code.
//!
//! [`RecordingInputSink`] replaces delivery with in-memory recording, keyed
//! by output id, so tests (and loopback deployments that consume events out
//! of process) can inspect exactly what was dispatched and in what order.
//! A platform integration implements [`InputEventSink`] against the real
//! pipeline and is wired in at construction time; nothing else changes.

use std::collections::HashMap;
use std::sync::Mutex;

use displayd_core::{KeyEvent, OutputId, PointerEvent};

use crate::application::gestures::{InjectionError, InputEventSink};

/// An input sink that records every dispatched event, keyed by output.
///
/// Event logs live behind `Mutex`es so the sink can be shared across
/// threads via `Arc`, matching how the synthesizer is used in production.
pub struct RecordingInputSink {
    pointer: Mutex<HashMap<OutputId, Vec<PointerEvent>>>,
    keys: Mutex<HashMap<OutputId, Vec<KeyEvent>>>,
    /// When `true`, every dispatch is rejected. Exercises error paths.
    should_fail: bool,
}

impl RecordingInputSink {
    /// Creates an empty recording sink that accepts every event.
    pub fn new() -> Self {
        Self {
            pointer: Mutex::new(HashMap::new()),
            keys: Mutex::new(HashMap::new()),
            should_fail: false,
        }
    }

    /// Creates a sink that rejects every dispatch.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// Pointer events dispatched to `output`, in dispatch order.
    pub fn pointer_events(&self, output: OutputId) -> Vec<PointerEvent> {
        self.pointer
            .lock()
            .expect("pointer log poisoned")
            .get(&output)
            .cloned()
            .unwrap_or_default()
    }

    /// Key events dispatched to `output`, in dispatch order.
    pub fn key_events(&self, output: OutputId) -> Vec<KeyEvent> {
        self.keys
            .lock()
            .expect("key log poisoned")
            .get(&output)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for RecordingInputSink {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEventSink for RecordingInputSink {
    fn dispatch_pointer(
        &self,
        output: OutputId,
        event: PointerEvent,
    ) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Rejected {
                output,
                reason: "recording sink configured to fail".to_string(),
            });
        }
        self.pointer
            .lock()
            .expect("pointer log poisoned")
            .entry(output)
            .or_default()
            .push(event);
        Ok(())
    }

    fn dispatch_key(&self, output: OutputId, event: KeyEvent) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Rejected {
                output,
                reason: "recording sink configured to fail".to_string(),
            });
        }
        self.keys
            .lock()
            .expect("key log poisoned")
            .entry(output)
            .or_default()
            .push(event);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use displayd_core::{KeyAction, KeyCode, PointerAction};

    fn pointer_event(x: f32) -> PointerEvent {
        PointerEvent {
            action: PointerAction::Down,
            x,
            y: 0.0,
            down_at_ms: 0,
            at_ms: 0,
        }
    }

    #[test]
    fn test_events_are_recorded_per_output() {
        let sink = RecordingInputSink::new();
        sink.dispatch_pointer(1, pointer_event(1.0)).unwrap();
        sink.dispatch_pointer(2, pointer_event(2.0)).unwrap();
        sink.dispatch_pointer(1, pointer_event(3.0)).unwrap();

        assert_eq!(sink.pointer_events(1).len(), 2);
        assert_eq!(sink.pointer_events(2).len(), 1);
        assert!(sink.pointer_events(3).is_empty());
    }

    #[test]
    fn test_recording_preserves_dispatch_order() {
        let sink = RecordingInputSink::new();
        for x in 0..5 {
            sink.dispatch_pointer(1, pointer_event(x as f32)).unwrap();
        }
        let xs: Vec<f32> = sink.pointer_events(1).iter().map(|e| e.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_failing_sink_rejects_and_records_nothing() {
        let sink = RecordingInputSink::failing();
        let result = sink.dispatch_key(
            1,
            KeyEvent {
                action: KeyAction::Down,
                code: KeyCode::Back,
                down_at_ms: 0,
                at_ms: 0,
            },
        );
        assert!(matches!(result, Err(InjectionError::Rejected { .. })));
        assert!(sink.key_events(1).is_empty());
    }
}
