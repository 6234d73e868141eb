//! GestureSynthesizer: builds and dispatches timed input event sequences.
//!
//! The synthesizer is a stateless service: it holds no per-session state and
//! every dispatch names an explicit output id, so one instance serves all
//! sessions. Event timestamps are read from the monotonic clock at the
//! moment each event is dispatched — never precomputed — because consumers
//! classify gestures (tap vs. long-press vs. drag) from inter-event timing.
//!
//! Long-press and drag block the calling thread for the gesture duration.
//! Callers must not run them on a thread that other session work is queued
//! behind; the service dispatches them on per-call worker threads at the
//! transport boundary.

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use displayd_core::{
    char_to_keystroke, KeyAction, KeyCode, KeyEvent, OutputId, PointerAction, PointerEvent,
};
use thiserror::Error;
use tracing::trace;

/// Default long-press hold, in ms.
pub const DEFAULT_LONG_PRESS_MS: u64 = 500;
/// Gap between the two taps of a double-tap, in ms.
pub const DOUBLE_TAP_DELAY_MS: u64 = 100;
/// Interval between interpolated drag move events, in ms.
pub const DRAG_STEP_INTERVAL_MS: u64 = 15;
/// Default drag duration, in ms.
pub const DEFAULT_DRAG_DURATION_MS: u64 = 300;

/// Error type for input injection.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The input pipeline refused the event.
    #[error("input pipeline rejected event for output {output}: {reason}")]
    Rejected { output: OutputId, reason: String },
}

/// Input dispatch capability interface.
///
/// Platform input pipelines implement this against the device's injection
/// facility; [`RecordingInputSink`](crate::infrastructure::input::RecordingInputSink)
/// is the always-compiled software implementation.
pub trait InputEventSink: Send + Sync {
    /// Dispatches one pointer event to the named output.
    fn dispatch_pointer(&self, output: OutputId, event: PointerEvent)
        -> Result<(), InjectionError>;

    /// Dispatches one key event to the named output.
    fn dispatch_key(&self, output: OutputId, event: KeyEvent) -> Result<(), InjectionError>;
}

/// Milliseconds elapsed on the service's monotonic clock.
fn monotonic_ms() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_millis() as u64
}

/// The gesture synthesis service.
#[derive(Clone)]
pub struct GestureSynthesizer {
    sink: Arc<dyn InputEventSink>,
}

impl GestureSynthesizer {
    /// Creates a synthesizer dispatching through the given sink.
    pub fn new(sink: Arc<dyn InputEventSink>) -> Self {
        Self { sink }
    }

    /// Down then up at the same point, with no artificial delay.
    pub fn tap(&self, output: OutputId, x: f32, y: f32) -> Result<(), InjectionError> {
        let down_at = monotonic_ms();
        self.pointer(output, PointerAction::Down, x, y, down_at)?;
        self.pointer(output, PointerAction::Up, x, y, down_at)
    }

    /// Down, a blocking hold of `duration_ms`, then up.
    ///
    /// Suspends the calling thread for the full hold.
    pub fn long_press(
        &self,
        output: OutputId,
        x: f32,
        y: f32,
        duration_ms: u64,
    ) -> Result<(), InjectionError> {
        let down_at = monotonic_ms();
        self.pointer(output, PointerAction::Down, x, y, down_at)?;
        thread::sleep(Duration::from_millis(duration_ms));
        self.pointer(output, PointerAction::Up, x, y, down_at)
    }

    /// Two taps separated by [`DOUBLE_TAP_DELAY_MS`].
    pub fn double_tap(&self, output: OutputId, x: f32, y: f32) -> Result<(), InjectionError> {
        self.tap(output, x, y)?;
        thread::sleep(Duration::from_millis(DOUBLE_TAP_DELAY_MS));
        self.tap(output, x, y)
    }

    /// Down at the start point, linearly interpolated moves every
    /// [`DRAG_STEP_INTERVAL_MS`], up at the end point.
    ///
    /// `duration_ms / 15` steps (minimum 1); the final move is pinned to the
    /// exact end coordinates so rounding in intermediate steps can never
    /// leave the pointer short of the target. Blocks for roughly
    /// `duration_ms`.
    pub fn drag(
        &self,
        output: OutputId,
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        duration_ms: u64,
    ) -> Result<(), InjectionError> {
        let steps = (duration_ms / DRAG_STEP_INTERVAL_MS).max(1);
        let step_delay = Duration::from_millis(duration_ms / steps);

        let down_at = monotonic_ms();
        self.pointer(output, PointerAction::Down, start_x, start_y, down_at)?;

        for step in 1..=steps {
            let (x, y) = if step == steps {
                (end_x, end_y)
            } else {
                let progress = step as f32 / steps as f32;
                (
                    start_x + (end_x - start_x) * progress,
                    start_y + (end_y - start_y) * progress,
                )
            };
            self.pointer(output, PointerAction::Move, x, y, down_at)?;
            if step < steps {
                thread::sleep(step_delay);
            }
        }

        self.pointer(output, PointerAction::Up, end_x, end_y, down_at)
    }

    /// Down/up pair for a symbolic key code.
    pub fn key_press(&self, output: OutputId, code: KeyCode) -> Result<(), InjectionError> {
        let down_at = monotonic_ms();
        self.key(output, KeyAction::Down, code, down_at)?;
        self.key(output, KeyAction::Up, code, down_at)
    }

    /// Decomposes `text` into per-character key strokes.
    ///
    /// Shifted strokes are wrapped in shift down/up. Characters with no
    /// keymap entry are skipped silently — key-event typing cannot produce
    /// them, and partial delivery of the rest beats rejecting the whole
    /// string.
    pub fn type_text(&self, output: OutputId, text: &str) -> Result<(), InjectionError> {
        for c in text.chars() {
            let Some(stroke) = char_to_keystroke(c) else {
                trace!(output, character = ?c, "skipping unmapped character");
                continue;
            };
            if stroke.shifted {
                let down_at = monotonic_ms();
                self.key(output, KeyAction::Down, KeyCode::ShiftLeft, down_at)?;
                self.key_press(output, stroke.code)?;
                self.key(output, KeyAction::Up, KeyCode::ShiftLeft, down_at)?;
            } else {
                self.key_press(output, stroke.code)?;
            }
        }
        Ok(())
    }

    fn pointer(
        &self,
        output: OutputId,
        action: PointerAction,
        x: f32,
        y: f32,
        down_at_ms: u64,
    ) -> Result<(), InjectionError> {
        self.sink.dispatch_pointer(
            output,
            PointerEvent {
                action,
                x,
                y,
                down_at_ms,
                at_ms: monotonic_ms(),
            },
        )
    }

    fn key(
        &self,
        output: OutputId,
        action: KeyAction,
        code: KeyCode,
        down_at_ms: u64,
    ) -> Result<(), InjectionError> {
        self.sink.dispatch_key(
            output,
            KeyEvent {
                action,
                code,
                down_at_ms,
                at_ms: monotonic_ms(),
            },
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input::RecordingInputSink;

    fn make_synthesizer() -> (GestureSynthesizer, Arc<RecordingInputSink>) {
        let sink = Arc::new(RecordingInputSink::new());
        let synth = GestureSynthesizer::new(Arc::clone(&sink) as Arc<dyn InputEventSink>);
        (synth, sink)
    }

    // ── Taps ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_tap_dispatches_down_then_up_at_same_point() {
        let (synth, sink) = make_synthesizer();

        synth.tap(7, 120.0, 340.0).unwrap();

        let events = sink.pointer_events(7);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, PointerAction::Down);
        assert_eq!(events[1].action, PointerAction::Up);
        assert_eq!((events[0].x, events[0].y), (120.0, 340.0));
        assert_eq!((events[1].x, events[1].y), (120.0, 340.0));
    }

    #[test]
    fn test_tap_events_share_the_down_timestamp() {
        let (synth, sink) = make_synthesizer();

        synth.tap(1, 0.0, 0.0).unwrap();

        let events = sink.pointer_events(1);
        assert_eq!(events[0].down_at_ms, events[1].down_at_ms);
        assert!(events[1].at_ms >= events[0].at_ms);
    }

    #[test]
    fn test_double_tap_dispatches_two_tap_pairs() {
        let (synth, sink) = make_synthesizer();

        synth.double_tap(1, 50.0, 60.0).unwrap();

        let events = sink.pointer_events(1);
        assert_eq!(events.len(), 4);
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                PointerAction::Down,
                PointerAction::Up,
                PointerAction::Down,
                PointerAction::Up
            ]
        );
        // The second pair starts a fresh down-time after the inter-tap gap.
        assert!(events[2].down_at_ms >= events[1].down_at_ms + DOUBLE_TAP_DELAY_MS);
    }

    // ── Long press ────────────────────────────────────────────────────────────

    #[test]
    fn test_long_press_holds_for_requested_duration() {
        let (synth, sink) = make_synthesizer();

        synth.long_press(1, 10.0, 10.0, 40).unwrap();

        let events = sink.pointer_events(1);
        assert_eq!(events.len(), 2);
        assert!(
            events[1].at_ms >= events[0].at_ms + 40,
            "up must come at least the hold duration after down"
        );
    }

    // ── Drag ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_drag_interpolates_duration_over_15ms_steps() {
        let (synth, sink) = make_synthesizer();

        synth.drag(1, 0.0, 0.0, 100.0, 0.0, 300).unwrap();

        let events = sink.pointer_events(1);
        let moves: Vec<_> = events
            .iter()
            .filter(|e| e.action == PointerAction::Move)
            .collect();
        assert_eq!(moves.len(), 20, "300ms / 15ms per step = 20 moves");
        assert_eq!(events.first().unwrap().action, PointerAction::Down);
        assert_eq!(events.last().unwrap().action, PointerAction::Up);
    }

    #[test]
    fn test_drag_final_move_lands_exactly_on_end_point() {
        let (synth, sink) = make_synthesizer();

        synth.drag(1, 0.3, 7.7, 99.9, 13.1, 100).unwrap();

        let events = sink.pointer_events(1);
        let last_move = events
            .iter()
            .rev()
            .find(|e| e.action == PointerAction::Move)
            .expect("at least one move");
        assert_eq!((last_move.x, last_move.y), (99.9, 13.1));
    }

    #[test]
    fn test_drag_moves_are_monotonic_along_the_axis() {
        let (synth, sink) = make_synthesizer();

        synth.drag(1, 0.0, 0.0, 100.0, 50.0, 150).unwrap();

        let events = sink.pointer_events(1);
        let moves: Vec<_> = events
            .iter()
            .filter(|e| e.action == PointerAction::Move)
            .collect();
        assert!(moves.windows(2).all(|w| w[0].x <= w[1].x && w[0].y <= w[1].y));
    }

    #[test]
    fn test_zero_duration_drag_still_emits_one_move() {
        let (synth, sink) = make_synthesizer();

        synth.drag(1, 0.0, 0.0, 10.0, 10.0, 0).unwrap();

        let events = sink.pointer_events(1);
        let moves: Vec<_> = events
            .iter()
            .filter(|e| e.action == PointerAction::Move)
            .collect();
        assert_eq!(moves.len(), 1);
        assert_eq!((moves[0].x, moves[0].y), (10.0, 10.0));
    }

    // ── Keys and text ─────────────────────────────────────────────────────────

    #[test]
    fn test_key_press_dispatches_down_up_pair() {
        let (synth, sink) = make_synthesizer();

        synth.key_press(1, KeyCode::Home).unwrap();

        let events = sink.key_events(1);
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].action, events[0].code), (KeyAction::Down, KeyCode::Home));
        assert_eq!((events[1].action, events[1].code), (KeyAction::Up, KeyCode::Home));
    }

    #[test]
    fn test_type_text_emits_pair_per_character() {
        let (synth, sink) = make_synthesizer();

        synth.type_text(1, "hi").unwrap();

        let events = sink.key_events(1);
        let codes: Vec<_> = events.iter().map(|e| (e.action, e.code)).collect();
        assert_eq!(
            codes,
            vec![
                (KeyAction::Down, KeyCode::KeyH),
                (KeyAction::Up, KeyCode::KeyH),
                (KeyAction::Down, KeyCode::KeyI),
                (KeyAction::Up, KeyCode::KeyI),
            ]
        );
    }

    #[test]
    fn test_type_text_wraps_shifted_characters_in_shift() {
        let (synth, sink) = make_synthesizer();

        synth.type_text(1, "Hi").unwrap();

        let events = sink.key_events(1);
        let codes: Vec<_> = events.iter().map(|e| (e.action, e.code)).collect();
        assert_eq!(
            codes,
            vec![
                (KeyAction::Down, KeyCode::ShiftLeft),
                (KeyAction::Down, KeyCode::KeyH),
                (KeyAction::Up, KeyCode::KeyH),
                (KeyAction::Up, KeyCode::ShiftLeft),
                (KeyAction::Down, KeyCode::KeyI),
                (KeyAction::Up, KeyCode::KeyI),
            ]
        );
    }

    #[test]
    fn test_type_text_silently_skips_unmapped_characters() {
        let (synth, sink) = make_synthesizer();

        synth.type_text(1, "aéb").unwrap();

        let events = sink.key_events(1);
        let codes: Vec<_> = events.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![KeyCode::KeyA, KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyB]
        );
    }

    #[test]
    fn test_events_target_only_the_named_output() {
        let (synth, sink) = make_synthesizer();

        synth.tap(3, 1.0, 1.0).unwrap();
        synth.tap(9, 2.0, 2.0).unwrap();

        assert_eq!(sink.pointer_events(3).len(), 2);
        assert_eq!(sink.pointer_events(9).len(), 2);
        assert!(sink.pointer_events(4).is_empty());
    }

    #[test]
    fn test_failing_sink_propagates_rejection() {
        let sink = Arc::new(RecordingInputSink::failing());
        let synth = GestureSynthesizer::new(Arc::clone(&sink) as Arc<dyn InputEventSink>);

        let result = synth.tap(1, 0.0, 0.0);
        assert!(matches!(result, Err(InjectionError::Rejected { .. })));
    }
}
