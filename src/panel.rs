//! Panel-side view logic.
//!
//! The logic the rendering surface runs, expressed as a pure state model so
//! tests and the headless host can drive a full button-press → message →
//! render cycle without a real surface. On load the panel announces
//! `initialized`, renders whatever `state` the host replies with, and
//! recomputes a new version locally when a bump button is pressed — the host
//! is informed, never asked.

use serde_json::Value;

use crate::error::Result;
use crate::protocol::{BumpKind, HostBound, PanelBound, VersionChangeNotification};
use crate::version;

/// Facts shown when no host is attached (running the view standalone).
const DETACHED_VERSION: &str = "9.9.9";
const DETACHED_UI_KIND: &str = "browser";

/// View model of the rendering surface: what the panel currently displays.
#[derive(Debug, Default)]
pub struct PanelView {
    version: Option<String>,
    ui_kind: Option<String>,
}

impl PanelView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load handler. Detached views self-populate placeholder facts; either
    /// way the panel announces readiness and lets the host reply with state.
    pub fn initialize(&mut self, host_attached: bool) -> HostBound {
        if !host_attached {
            self.version = Some(DETACHED_VERSION.to_string());
            self.ui_kind = Some(DETACHED_UI_KIND.to_string());
        }
        HostBound::Initialized
    }

    /// Applies a host-sent envelope to the view. Envelopes outside the
    /// panel-bound vocabulary are logged and ignored.
    pub fn apply(&mut self, message: &Value) {
        match PanelBound::parse(message) {
            Ok(PanelBound::State(state)) => {
                tracing::debug!("new state received from the host");
                self.version = Some(state.version);
                self.ui_kind = Some(state.ui_kind.to_string());
            }
            Err(err) => tracing::warn!("unexpected message for panel: {err}"),
        }
    }

    /// Bump-button handler: recomputes the displayed version locally and
    /// reports the change back to the host.
    pub fn press(&mut self, kind: BumpKind) -> Result<HostBound> {
        let current = self.version.as_deref().unwrap_or(DETACHED_VERSION);
        let next = version::increment(current, kind)?;
        self.version = Some(next.clone());
        Ok(HostBound::VersionChanged(VersionChangeNotification {
            kind,
            new_version: next,
        }))
    }

    #[must_use]
    pub fn displayed_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn displayed_ui_kind(&self) -> Option<&str> {
        self.ui_kind.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::protocol::{HostState, UiKind};

    #[test]
    fn attached_view_waits_for_host_state() {
        let mut view = PanelView::new();
        assert_eq!(view.initialize(true), HostBound::Initialized);
        assert_eq!(view.displayed_version(), None);
        assert_eq!(view.displayed_ui_kind(), None);
    }

    #[test]
    fn detached_view_populates_placeholder_state() {
        let mut view = PanelView::new();
        assert_eq!(view.initialize(false), HostBound::Initialized);
        assert_eq!(view.displayed_version(), Some("9.9.9"));
        assert_eq!(view.displayed_ui_kind(), Some("browser"));
    }

    #[test]
    fn state_message_renders_host_facts() {
        let mut view = PanelView::new();
        let message = PanelBound::State(HostState {
            version: "1.80.0".to_string(),
            ui_kind: UiKind::Web,
        })
        .to_value()
        .expect("serialize");

        view.apply(&message);
        assert_eq!(view.displayed_version(), Some("1.80.0"));
        assert_eq!(view.displayed_ui_kind(), Some("Web"));
    }

    #[test]
    fn unknown_message_leaves_view_untouched() {
        let mut view = PanelView::new();
        view.apply(&json!({ "command": "reboot" }));
        assert_eq!(view.displayed_version(), None);
    }

    #[test]
    fn press_recomputes_locally_and_reports_the_change() {
        let mut view = PanelView::new();
        let message = PanelBound::State(HostState {
            version: "1.0.0".to_string(),
            ui_kind: UiKind::Desktop,
        })
        .to_value()
        .expect("serialize");
        view.apply(&message);

        let outbound = view.press(BumpKind::Patch).expect("press");
        assert_eq!(view.displayed_version(), Some("1.0.1"));
        assert_eq!(
            outbound,
            HostBound::VersionChanged(VersionChangeNotification {
                kind: BumpKind::Patch,
                new_version: "1.0.1".to_string(),
            })
        );
    }
}
