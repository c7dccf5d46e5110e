//! Operator-facing status messages
//!
//! Every mutating operation answers with a short human-readable message
//! categorized by severity; the calling layer decides how to display it.

use serde::{Deserialize, Serialize};

/// Display severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

/// A short human-readable operation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_serialize_lowercase() {
        let msg = StatusMessage::warning("group cap exceeded");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["message"], "group cap exceeded");
    }
}
