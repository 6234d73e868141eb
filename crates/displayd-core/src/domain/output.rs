//! Display output descriptors.
//!
//! Every session is bound to exactly one *output*: either the device's
//! physical display (output id 0) or a virtual off-screen surface created by
//! the surface backend. Output ids are what the input injection and
//! app-launch paths use to target a specific display.

use serde::{Deserialize, Serialize};

/// Identifies a display output on the device.
///
/// The physical display is always [`PRIMARY_OUTPUT_ID`]; virtual outputs get
/// positive ids assigned by the surface backend.
pub type OutputId = i32;

/// The output id of the physical (primary) display.
pub const PRIMARY_OUTPUT_ID: OutputId = 0;

/// Descriptor for one display output, physical or virtual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub id: OutputId,
    /// Human-readable name, e.g. `"builtin"` or the session label.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Density in dpi.
    pub density: u32,
    /// `true` for off-screen surfaces, `false` for the physical display.
    pub is_virtual: bool,
}

impl OutputInfo {
    /// Returns `true` if this descriptor names the physical display.
    pub fn is_primary(&self) -> bool {
        self.id == PRIMARY_OUTPUT_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_output_is_not_virtual_by_convention() {
        let info = OutputInfo {
            id: PRIMARY_OUTPUT_ID,
            name: "builtin".to_string(),
            width: 1080,
            height: 1920,
            density: 420,
            is_virtual: false,
        };
        assert!(info.is_primary());
        assert!(!info.is_virtual);
    }

    #[test]
    fn test_virtual_output_is_not_primary() {
        let info = OutputInfo {
            id: 7,
            name: "session-abc".to_string(),
            width: 800,
            height: 600,
            density: 160,
            is_virtual: true,
        };
        assert!(!info.is_primary());
    }
}
