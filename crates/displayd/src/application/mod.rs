//! Application layer: the session engine.
//!
//! Everything here depends only on traits and domain types; the OS-facing
//! implementations live in the infrastructure layer and are injected at
//! construction time.

pub mod error;
pub mod gestures;
pub mod session;
pub mod session_manager;
