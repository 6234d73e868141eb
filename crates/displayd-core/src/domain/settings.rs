//! Settings namespaces accepted by the system-settings operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three settings namespaces the device exposes.
///
/// Any other namespace string is rejected before the system delegate is
/// reached, so the delegate never sees an unvalidated namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsNamespace {
    System,
    Secure,
    Global,
}

/// Error returned when parsing an unknown settings namespace.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown settings namespace: {0}")]
pub struct InvalidNamespaceError(pub String);

impl SettingsNamespace {
    /// The lowercase namespace token used by the device's `settings` tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsNamespace::System => "system",
            SettingsNamespace::Secure => "secure",
            SettingsNamespace::Global => "global",
        }
    }
}

impl fmt::Display for SettingsNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsNamespace {
    type Err = InvalidNamespaceError;

    /// Case-insensitive parse of a namespace token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(SettingsNamespace::System),
            "secure" => Ok(SettingsNamespace::Secure),
            "global" => Ok(SettingsNamespace::Global),
            _ => Err(InvalidNamespaceError(s.to_string())),
        }
    }
}
