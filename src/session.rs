//! Panel session lifecycle and host-side message routing.
//!
//! At most one panel session is live at a time, owned by a [`PanelRegistry`]
//! value instead of ambient static state. The session walks
//! `Absent → Creating → Live{Visible|Hidden} → Disposed`: creation composes
//! and installs nonce-gated content, becoming visible again recomposes it
//! from scratch, and disposal releases the surface handle plus every
//! lifecycle [`Subscription`] exactly once on every exit path.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use crate::content::{self, Nonce, ResourceResolver};
use crate::error::Result;
use crate::protocol::{HostBound, HostState, PanelBound};
use crate::template;

/// Handle to the isolated rendering surface the host supervises.
///
/// The three `on_did_*` methods register lifecycle listeners and return RAII
/// guards; the surface must stop delivering the corresponding [`PanelEvent`]s
/// once its guard is released.
pub trait PanelSurface: ResourceResolver {
    /// Atomically replaces the surface's content. Callers only ever pass a
    /// fully composed string; the surface never sees a half-rewritten
    /// template.
    fn install_content(&mut self, html: &str);

    /// Brings the surface to the foreground without touching its content.
    fn reveal(&mut self);

    /// Fire-and-forget delivery of a panel-bound envelope.
    fn post_message(&mut self, message: Value);

    /// Releases the underlying surface handle.
    fn dispose_surface(&mut self);

    fn on_did_dispose(&mut self) -> Subscription;
    fn on_did_change_view_state(&mut self) -> Subscription;
    fn on_did_receive_message(&mut self) -> Subscription;
}

/// Host environment: user-visible notices plus the facts sent in `state`.
pub trait HostShell {
    fn show_info(&self, message: &str);
    fn show_warning(&self, message: &str);

    /// Current host-observed facts; queried fresh per `state` send.
    fn host_state(&self) -> HostState;
}

/// Lifecycle events the host event queue delivers, strictly sequentially.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    ViewStateChanged { visible: bool },
    MessageReceived(Value),
    Disposed,
}

/// RAII guard for one lifecycle listener registration.
///
/// Releasing runs the registered cleanup exactly once; dropping an armed
/// guard releases it too, so no registration survives any exit path.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// Where the session sources its template and resolves local references.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Directory holding the template and every local resource it references.
    pub content_dir: PathBuf,
    pub template_name: String,
}

impl PanelConfig {
    #[must_use]
    pub fn new(content_dir: impl Into<PathBuf>, template_name: impl Into<String>) -> Self {
        Self {
            content_dir: content_dir.into(),
            template_name: template_name.into(),
        }
    }
}

/// The single live panel instance: surface handle, lifecycle subscriptions,
/// and the routing for its inbound/outbound messages.
pub struct PanelSession<S: PanelSurface> {
    surface: S,
    config: PanelConfig,
    subscriptions: Vec<Subscription>,
    visible: bool,
    disposed: bool,
    nonce: Option<Nonce>,
}

impl<S: PanelSurface> PanelSession<S> {
    /// Nonce of the currently installed content, if any.
    #[must_use]
    pub const fn current_nonce(&self) -> Option<&Nonce> {
        self.nonce.as_ref()
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Loads, composes, and installs content from scratch. Every call issues
    /// a fresh nonce; on failure nothing is installed.
    fn reset_content(&mut self) -> Result<()> {
        let text = template::load_template(&self.config.content_dir, &self.config.template_name)?;
        let composed = content::compose(&text, &self.surface, &self.config.content_dir)?;
        self.nonce = Some(composed.nonce().clone());
        self.surface.install_content(composed.html());
        Ok(())
    }

    fn handle_event(&mut self, event: PanelEvent, shell: &impl HostShell) {
        if self.disposed {
            return;
        }
        match event {
            PanelEvent::Disposed => self.teardown(),
            PanelEvent::ViewStateChanged { visible } => {
                self.visible = visible;
                if visible {
                    // Defensive refresh: host facts may have changed while
                    // the panel was hidden. A failed refresh leaves the
                    // session live with its previous content.
                    if let Err(err) = self.reset_content() {
                        tracing::warn!("panel content refresh failed: {err}");
                        shell.show_warning(&format!("Unable to refresh panel: {err}"));
                    }
                }
            }
            PanelEvent::MessageReceived(value) => self.handle_message(&value, shell),
        }
    }

    fn handle_message(&mut self, value: &Value, shell: &impl HostShell) {
        match HostBound::parse(value) {
            Ok(HostBound::Initialized) => {
                let state = shell.host_state();
                match PanelBound::State(state).to_value() {
                    Ok(envelope) => self.surface.post_message(envelope),
                    Err(err) => tracing::warn!("failed to encode state reply: {err}"),
                }
            }
            Ok(HostBound::VersionChanged(change)) => {
                // Notify-only: the host does not adopt the panel's version.
                shell.show_info(&format!(
                    "New {} version: {}",
                    change.kind, change.new_version
                ));
            }
            Err(err) => {
                tracing::warn!("inbound panel message rejected: {err}");
                shell.show_warning(&err.to_string());
            }
        }
    }

    /// Releases the surface handle and every subscription exactly once;
    /// re-entrant calls are no-ops.
    fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.surface.dispose_surface();
        while let Some(mut subscription) = self.subscriptions.pop() {
            subscription.release();
        }
        tracing::debug!("panel session disposed");
    }
}

/// Owns the at-most-one live panel session for the whole host process.
pub struct PanelRegistry<S: PanelSurface> {
    current: Option<PanelSession<S>>,
}

impl<S: PanelSurface> PanelRegistry<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub const fn current(&self) -> Option<&PanelSession<S>> {
        self.current.as_ref()
    }

    /// Opens the panel, or reveals the already-live instance.
    ///
    /// The reveal path composes nothing and issues no new nonce. The creation
    /// path attaches the three lifecycle listeners before composing; if
    /// composition fails, everything acquired so far is released and the
    /// registry reverts to absent.
    pub fn create_or_show(
        &mut self,
        config: PanelConfig,
        make_surface: impl FnOnce() -> S,
    ) -> Result<()> {
        if let Some(session) = self.current.as_mut() {
            tracing::debug!("panel already live, revealing existing instance");
            session.surface.reveal();
            return Ok(());
        }

        let mut surface = make_surface();
        let subscriptions = vec![
            surface.on_did_dispose(),
            surface.on_did_change_view_state(),
            surface.on_did_receive_message(),
        ];
        let mut session = PanelSession {
            surface,
            config,
            subscriptions,
            visible: true,
            disposed: false,
            nonce: None,
        };
        if let Err(err) = session.reset_content() {
            // Never leave a half-initialized session behind: fully live or
            // fully absent.
            session.teardown();
            return Err(err);
        }
        self.current = Some(session);
        tracing::debug!("panel session live");
        Ok(())
    }

    /// Routes one lifecycle event to the live session. Events arriving with
    /// no live session (including after disposal) are ignored.
    pub fn handle_event(&mut self, event: PanelEvent, shell: &impl HostShell) {
        let Some(session) = self.current.as_mut() else {
            tracing::debug!(?event, "panel event ignored, no live session");
            return;
        };
        session.handle_event(event, shell);
        if session.disposed {
            self.current = None;
        }
    }

    /// Programmatic disposal; shares the teardown path with user-driven
    /// close and is a no-op when nothing is live.
    pub fn dispose(&mut self) {
        if let Some(mut session) = self.current.take() {
            session.teardown();
        }
    }
}

impl<S: PanelSurface> Default for PanelRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn subscription_releases_exactly_once() {
        let released = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&released);
        let mut subscription = Subscription::new(move || counter.set(counter.get() + 1));

        subscription.release();
        subscription.release();
        drop(subscription);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn dropping_an_armed_subscription_releases_it() {
        let released = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&released);
        drop(Subscription::new(move || counter.set(counter.get() + 1)));
        assert_eq!(released.get(), 1);
    }
}
