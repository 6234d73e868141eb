//! Session identity and configuration.

use serde::{Deserialize, Serialize};

/// Unique identifier for a session.
///
/// Generated (UUID v4) for headless sessions; the physical-display session
/// always uses the fixed [`PHYSICAL_SESSION_ID`] sentinel so that repeated
/// acquisitions of the primary display resolve to the same handle.
pub type SessionId = String;

/// The reserved id of the session bound to the physical display.
pub const PHYSICAL_SESSION_ID: &str = "physical-0";

/// Requested geometry and mode for a new session.
///
/// All fields have serde defaults so a transport can deserialize a partial
/// request object and still get a fully-formed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Surface width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Surface height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Surface density in dpi.
    #[serde(default = "default_density")]
    pub density: u32,
    /// `true` = off-screen virtual surface; `false` = the physical display.
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_width() -> u32 {
    1080
}
fn default_height() -> u32 {
    1920
}
fn default_density() -> u32 {
    420
}
fn default_headless() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            density: default_density(),
            headless: default_headless(),
        }
    }
}
