//! # displayd-core
//!
//! Shared library for displayd containing the domain entities and the key
//! code translation table.
//!
//! This crate is used by the service crate and by anything that speaks the
//! session API (e.g. an RPC transport). It has zero dependencies on OS APIs,
//! async runtimes, or I/O.
//!
//! # Architecture overview
//!
//! displayd is a device-side automation daemon: remote callers open
//! *sessions*, each bound to one display output (a virtual off-screen
//! surface, or the single physical display), and drive that output with
//! synthetic input, frame capture, and app-lifecycle operations.
//!
//! This crate defines:
//!
//! - **`domain`** – Pure value types shared across the service: session
//!   configuration and identifiers, output descriptors, settings namespaces,
//!   and the pointer/key event structs the gesture synthesizer dispatches.
//!
//! - **`keymap`** – The device key code enum and the character → key-stroke
//!   table used to decompose text into key events.

pub mod domain;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `displayd_core::SessionConfig` instead of the full module path.
pub use domain::input::{KeyAction, KeyEvent, PointerAction, PointerEvent};
pub use domain::output::{OutputId, OutputInfo, PRIMARY_OUTPUT_ID};
pub use domain::session::{SessionConfig, SessionId, PHYSICAL_SESSION_ID};
pub use domain::settings::{InvalidNamespaceError, SettingsNamespace};
pub use keymap::{char_to_keystroke, KeyCode, KeyStroke};
