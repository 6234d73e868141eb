//! Key code definitions and character translation for text synthesis.
//!
//! The canonical representation is the device key code space (the numeric
//! values injected events carry on the wire). Text input is decomposed into
//! per-character key strokes via [`char_to_keystroke`]; characters with no
//! entry in the table are skipped by the synthesizer — a documented
//! limitation of key-event-based typing, not an error.

mod chars;

pub use chars::char_to_keystroke;

use serde::{Deserialize, Serialize};

/// Device key codes used for synthetic key events.
///
/// The numeric value of each variant is the code carried by the injected
/// event. Only the keys the service actually synthesizes are listed; this is
/// not an exhaustive keyboard map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyCode {
    // Navigation and hardware keys
    Home = 3,
    Back = 4,
    VolumeUp = 24,
    VolumeDown = 25,
    Power = 26,
    AppSwitch = 187,
    Escape = 111,

    // Digits (device codes 7–16, in 0..9 order)
    Digit0 = 7,
    Digit1 = 8,
    Digit2 = 9,
    Digit3 = 10,
    Digit4 = 11,
    Digit5 = 12,
    Digit6 = 13,
    Digit7 = 14,
    Digit8 = 15,
    Digit9 = 16,

    // Letters (device codes 29–54)
    KeyA = 29,
    KeyB = 30,
    KeyC = 31,
    KeyD = 32,
    KeyE = 33,
    KeyF = 34,
    KeyG = 35,
    KeyH = 36,
    KeyI = 37,
    KeyJ = 38,
    KeyK = 39,
    KeyL = 40,
    KeyM = 41,
    KeyN = 42,
    KeyO = 43,
    KeyP = 44,
    KeyQ = 45,
    KeyR = 46,
    KeyS = 47,
    KeyT = 48,
    KeyU = 49,
    KeyV = 50,
    KeyW = 51,
    KeyX = 52,
    KeyY = 53,
    KeyZ = 54,

    // Punctuation and whitespace
    Comma = 55,
    Period = 56,
    ShiftLeft = 59,
    Tab = 61,
    Space = 62,
    Enter = 66,
    Backspace = 67,
    Grave = 68,
    Minus = 69,
    Equals = 70,
    LeftBracket = 71,
    RightBracket = 72,
    Backslash = 73,
    Semicolon = 74,
    Apostrophe = 75,
    Slash = 76,
    Delete = 112,
}

impl KeyCode {
    /// The numeric device code carried by injected events.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// One key stroke produced by character translation: the key to press and
/// whether it must be wrapped in shift down/up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub shifted: bool,
}

impl KeyStroke {
    /// A stroke with no shift modifier.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            shifted: false,
        }
    }

    /// A stroke wrapped in shift down/up.
    pub fn shifted(code: KeyCode) -> Self {
        Self {
            code,
            shifted: true,
        }
    }
}
