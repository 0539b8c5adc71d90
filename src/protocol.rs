//! Shared host↔panel message vocabulary.
//!
//! Both directions use the same JSON envelope shape on the wire:
//! `{"command": <string>, "payload": <object?>}`. The vocabulary is closed
//! and modeled as tagged enums so every known command carries exactly the
//! payload shape bound to it; envelopes outside the vocabulary are reported
//! through [`Error::UnsupportedCommand`], never crashed on.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Which semantic-version component a panel interaction bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl BumpKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the UI environment the host runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiKind {
    Desktop,
    Web,
}

impl UiKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Web => "Web",
        }
    }
}

impl fmt::Display for UiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-observed facts carried by a `state` message.
///
/// Recomputed from the shell on every send, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostState {
    pub version: String,
    pub ui_kind: UiKind,
}

/// Payload of a panel-originated `versionChanged` message, produced only
/// after a successful local increment on the panel side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionChangeNotification {
    pub kind: BumpKind,
    pub new_version: String,
}

/// Messages the panel sends to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum HostBound {
    /// The surface finished loading and is ready for state.
    Initialized,
    /// The panel recomputed its displayed version.
    VersionChanged(VersionChangeNotification),
}

impl HostBound {
    /// Get the wire command name.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::VersionChanged(_) => "versionChanged",
        }
    }

    /// Parses an inbound envelope against the closed vocabulary.
    pub fn parse(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|err| {
            tracing::debug!("host-bound envelope rejected: {err}");
            Error::UnsupportedCommand(command_of(value))
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }
}

/// Messages the host sends to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum PanelBound {
    /// Reply to `initialized`, carrying current host facts.
    State(HostState),
}

impl PanelBound {
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::State(_) => "state",
        }
    }

    pub fn parse(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|err| {
            tracing::debug!("panel-bound envelope rejected: {err}");
            Error::UnsupportedCommand(command_of(value))
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }
}

fn command_of(value: &Value) -> String {
    value
        .get("command")
        .and_then(Value::as_str)
        .unwrap_or("<missing>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn initialized_serializes_without_payload() {
        let value = HostBound::Initialized.to_value().expect("serialize");
        assert_eq!(value, json!({ "command": "initialized" }));
    }

    #[test]
    fn version_changed_envelope_uses_camel_case_payload() {
        let message = HostBound::VersionChanged(VersionChangeNotification {
            kind: BumpKind::Patch,
            new_version: "1.0.1".to_string(),
        });
        let value = message.to_value().expect("serialize");
        assert_eq!(
            value,
            json!({
                "command": "versionChanged",
                "payload": { "kind": "patch", "newVersion": "1.0.1" }
            })
        );
    }

    #[test]
    fn state_envelope_matches_wire_shape() {
        let message = PanelBound::State(HostState {
            version: "1.99.0".to_string(),
            ui_kind: UiKind::Desktop,
        });
        let value = message.to_value().expect("serialize");
        assert_eq!(
            value,
            json!({
                "command": "state",
                "payload": { "version": "1.99.0", "uiKind": "Desktop" }
            })
        );
    }

    #[test]
    fn host_bound_round_trips() {
        let original = HostBound::VersionChanged(VersionChangeNotification {
            kind: BumpKind::Major,
            new_version: "2.0.0".to_string(),
        });
        let value = original.to_value().expect("serialize");
        let parsed = HostBound::parse(&value).expect("parse");
        assert_eq!(parsed, original);
        assert_eq!(parsed.command(), "versionChanged");
    }

    #[test]
    fn unknown_command_is_reported_by_name() {
        let err = HostBound::parse(&json!({ "command": "selfDestruct" }))
            .expect_err("unknown command must not parse");
        assert_eq!(err.to_string(), "command not supported: selfDestruct");
    }

    #[test]
    fn known_command_with_malformed_payload_is_rejected() {
        let err = HostBound::parse(&json!({
            "command": "versionChanged",
            "payload": { "kind": "gigantic", "newVersion": "1.0.0" }
        }))
        .expect_err("payload outside the closed kind enum must not parse");
        assert_eq!(err.to_string(), "command not supported: versionChanged");
    }

    #[test]
    fn envelope_without_command_is_rejected() {
        let err = HostBound::parse(&json!({ "payload": {} })).expect_err("must not parse");
        assert_eq!(err.to_string(), "command not supported: <missing>");
    }
}
