//! Secure content composition for the rendering surface.
//!
//! Rewrites the raw markup template into installable content: injects a
//! content-security-policy header derived from a fresh per-composition nonce,
//! rewrites local `script`/`link` references to host-approved locators, and
//! nonce-tags script sources so only host-approved scripts execute under the
//! injected policy.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// Placeholder token the template must carry exactly once.
pub const CSP_PLACEHOLDER: &str = "<!-- CSP -->";

/// Marker of a hand-written policy header. Templates carrying one are
/// rejected so the injected policy can never be shadowed or doubled.
const ROGUE_POLICY_MARKER: &str = r#"http-equiv="Content-Security-Policy""#;

const NONCE_LEN: usize = 32;
const NONCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// One-time token gating which scripts the surface may execute.
///
/// Fresh per composition. The same value appears in the policy's
/// `script-src` directive and on every rewritten script tag, so within one
/// [`RenderableContent`] they always match. Uniqueness across compositions is
/// probabilistic, not cryptographically guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Draws a fresh 32-character alphanumeric token from the OS entropy
    /// source.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0_u8; NONCE_LEN];
        getrandom::fill(&mut bytes).map_err(Error::Entropy)?;
        let token = bytes
            .iter()
            .map(|byte| NONCE_ALPHABET[usize::from(*byte) % NONCE_ALPHABET.len()] as char)
            .collect();
        Ok(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seam the rendering surface implements so the composer can translate local
/// resource references into locators the surface is allowed to load.
pub trait ResourceResolver {
    /// Origin granted by the policy for images, styles, and fonts.
    fn csp_source(&self) -> String;

    /// Maps a relative reference under `base` to a host-approved locator.
    fn resource_locator(&self, base: &Path, relative: &str) -> String;
}

/// Fully composed markup, ready to install into the rendering surface.
///
/// Invariant: no unresolved local resource references remain and exactly one
/// policy header is present, carrying [`Self::nonce`].
#[derive(Debug, Clone)]
pub struct RenderableContent {
    html: String,
    nonce: Nonce,
}

impl RenderableContent {
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub const fn nonce(&self) -> &Nonce {
        &self.nonce
    }
}

fn resource_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Attribute-name matching is case-insensitive; the nonce decision
        // below re-checks the captured name the same way.
        Regex::new(r#"<(script|link) ([^>]*)((?i:src|href))="([^"]+)""#)
            .expect("resource tag regex")
    })
}

/// Composes `template` into renderable content scoped to `resource_base`.
///
/// Order matters: the contract checks run against the raw template, before
/// the policy injection introduces the very marker the rogue check rejects.
pub fn compose(
    template: &str,
    resolver: &dyn ResourceResolver,
    resource_base: &Path,
) -> Result<RenderableContent> {
    match template.matches(CSP_PLACEHOLDER).count() {
        1 => {}
        0 => {
            return Err(Error::TemplateContract(format!(
                "missing `{CSP_PLACEHOLDER}` placeholder"
            )));
        }
        n => {
            return Err(Error::TemplateContract(format!(
                "`{CSP_PLACEHOLDER}` placeholder occurs {n} times, expected exactly one"
            )));
        }
    }
    if template.contains(ROGUE_POLICY_MARKER) {
        return Err(Error::TemplateContract(
            "template already carries a Content-Security-Policy header".to_string(),
        ));
    }

    let nonce = Nonce::generate()?;
    let policy = content_security_policy(&resolver.csp_source(), &nonce);
    let html = template.replacen(CSP_PLACEHOLDER, &policy, 1);

    let html = resource_tag_regex()
        .replace_all(&html, |caps: &Captures<'_>| {
            let (tag, pass_through, attr, value) = (&caps[1], &caps[2], &caps[3], &caps[4]);
            // External references pass through untouched and never get a
            // nonce: the allow-list covers local, host-approved scripts only.
            if value.starts_with("http") {
                return caps[0].to_string();
            }
            let locator = resolver.resource_locator(resource_base, value);
            let nonce_attr = if attr.eq_ignore_ascii_case("src") {
                format!(r#"nonce="{nonce}" "#)
            } else {
                String::new()
            };
            format!(r#"<{tag} {pass_through}{nonce_attr}{attr}="{locator}""#)
        })
        .into_owned();

    tracing::debug!(nonce = %nonce, "composed panel content");
    Ok(RenderableContent { html, nonce })
}

fn content_security_policy(source: &str, nonce: &Nonce) -> String {
    format!(
        "<meta http-equiv=\"Content-Security-Policy\" content=\"default-src 'none'; \
         img-src {source} https:; \
         style-src {source}; \
         script-src 'nonce-{nonce}'; \
         font-src {source}; \">"
    )
}
