//! Synthetic input event value types.
//!
//! These are the events the gesture synthesizer hands to an input sink.
//! Timestamps are milliseconds on the service's monotonic clock, stamped at
//! the moment each event is dispatched — downstream consumers use the
//! inter-event timing to classify gestures (tap vs. long-press vs. drag), so
//! precomputed timestamps would misclassify.

use serde::{Deserialize, Serialize};

use crate::keymap::KeyCode;

/// Pointer event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    Down,
    Move,
    Up,
}

/// A single synthetic pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub x: f32,
    pub y: f32,
    /// Monotonic time of the initiating down event, in ms.
    pub down_at_ms: u64,
    /// Monotonic time of this event, in ms.
    pub at_ms: u64,
}

/// Key event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
}

/// A single synthetic key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub action: KeyAction,
    pub code: KeyCode,
    /// Monotonic time of the initiating down event, in ms.
    pub down_at_ms: u64,
    /// Monotonic time of this event, in ms.
    pub at_ms: u64,
}
