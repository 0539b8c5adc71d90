//! Interactive command surface: opens the calculator panel against a
//! headless rendering surface and drives one scripted session through the
//! full initialized → state → bump cycle.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use semver_panel::content::ResourceResolver;
use semver_panel::panel::PanelView;
use semver_panel::protocol::{BumpKind, HostState, UiKind};
use semver_panel::session::{
    HostShell, PanelConfig, PanelEvent, PanelRegistry, PanelSurface, Subscription,
};

#[derive(Parser, Debug)]
#[command(name = "semver-panel")]
#[command(about = "Open the semver calculator panel on a headless demo host")]
struct Args {
    /// Directory holding view.html and the local resources it references.
    #[arg(long, default_value = "assets")]
    content_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut registry = PanelRegistry::new();
    let shell = TerminalShell;

    let state = Rc::new(RefCell::new(SurfaceState::default()));
    registry
        .create_or_show(
            PanelConfig::new(&args.content_dir, "view.html"),
            || HeadlessSurface {
                state: Rc::clone(&state),
            },
        )
        .context("unable to open the panel")?;

    // The surface finished loading: the panel announces itself and the host
    // replies with state.
    let mut view = PanelView::new();
    let hello = view.initialize(true).to_value()?;
    registry.handle_event(PanelEvent::MessageReceived(hello), &shell);
    for reply in state.borrow_mut().outbox.drain(..).collect::<Vec<_>>() {
        view.apply(&reply);
    }
    tracing::info!(
        version = view.displayed_version().unwrap_or("<none>"),
        ui_kind = view.displayed_ui_kind().unwrap_or("<none>"),
        "panel rendered host state"
    );

    // One press of each bump button, reported back to the host.
    for kind in [BumpKind::Patch, BumpKind::Minor, BumpKind::Major] {
        let outbound = view.press(kind)?.to_value()?;
        registry.handle_event(PanelEvent::MessageReceived(outbound), &shell);
    }

    // A second activation request only reveals the live instance.
    registry.create_or_show(PanelConfig::new(&args.content_dir, "view.html"), || {
        unreachable!("panel is already live")
    })?;

    registry.dispose();

    let snapshot = state.borrow();
    tracing::info!(
        reveals = snapshot.reveals,
        content_bytes = snapshot.installed_html.as_ref().map_or(0, String::len),
        active_listeners = snapshot.active_listeners,
        surface_disposed = snapshot.disposed,
        "session closed"
    );
    Ok(())
}

#[derive(Default)]
struct SurfaceState {
    installed_html: Option<String>,
    outbox: Vec<Value>,
    reveals: u32,
    active_listeners: u32,
    disposed: bool,
}

/// Rendering surface with no real display: records installs and outbound
/// messages so the demo loop can play the panel's part.
struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl ResourceResolver for HeadlessSurface {
    fn csp_source(&self) -> String {
        "panel-resource:".to_string()
    }

    fn resource_locator(&self, base: &Path, relative: &str) -> String {
        format!("panel-resource://{}/{relative}", base.display())
    }
}

impl HeadlessSurface {
    fn listener(&self) -> Subscription {
        let state = Rc::clone(&self.state);
        state.borrow_mut().active_listeners += 1;
        Subscription::new(move || state.borrow_mut().active_listeners -= 1)
    }
}

impl PanelSurface for HeadlessSurface {
    fn install_content(&mut self, html: &str) {
        tracing::debug!(bytes = html.len(), "content installed");
        self.state.borrow_mut().installed_html = Some(html.to_string());
    }

    fn reveal(&mut self) {
        let mut state = self.state.borrow_mut();
        state.reveals += 1;
        tracing::info!("panel revealed");
    }

    fn post_message(&mut self, message: Value) {
        self.state.borrow_mut().outbox.push(message);
    }

    fn dispose_surface(&mut self) {
        self.state.borrow_mut().disposed = true;
    }

    fn on_did_dispose(&mut self) -> Subscription {
        self.listener()
    }

    fn on_did_change_view_state(&mut self) -> Subscription {
        self.listener()
    }

    fn on_did_receive_message(&mut self) -> Subscription {
        self.listener()
    }
}

/// Shell that surfaces notices on the terminal.
struct TerminalShell;

impl HostShell for TerminalShell {
    fn show_info(&self, message: &str) {
        println!("[info] {message}");
    }

    fn show_warning(&self, message: &str) {
        println!("[warn] {message}");
    }

    fn host_state(&self) -> HostState {
        HostState {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ui_kind: UiKind::Desktop,
        }
    }
}
