//! Version engine: semantic-version increment arithmetic.
//!
//! Pure collaborator of the panel side. Parsing is delegated entirely to the
//! `semver` crate; malformed input surfaces as [`crate::Error::Version`].

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::Result;
use crate::protocol::BumpKind;

/// Computes the next version string for `kind`.
///
/// Follows node-semver `inc` semantics: bumping a component zeroes the lower
/// ones and drops pre-release/build metadata, and a pre-release of the target
/// version graduates in place instead of skipping ahead (`2.0.0-alpha` +
/// major is `2.0.0`, not `3.0.0`).
pub fn increment(version: &str, kind: BumpKind) -> Result<String> {
    let mut parsed = Version::parse(version)?;
    let graduating = !parsed.pre.is_empty();
    match kind {
        BumpKind::Major => {
            if !(graduating && parsed.minor == 0 && parsed.patch == 0) {
                parsed.major += 1;
            }
            parsed.minor = 0;
            parsed.patch = 0;
        }
        BumpKind::Minor => {
            if !(graduating && parsed.patch == 0) {
                parsed.minor += 1;
            }
            parsed.patch = 0;
        }
        BumpKind::Patch => {
            if !graduating {
                parsed.patch += 1;
            }
        }
    }
    parsed.pre = Prerelease::EMPTY;
    parsed.build = BuildMetadata::EMPTY;
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::error::Error;

    #[test]
    fn increments_patch() {
        assert_eq!(increment("1.0.0", BumpKind::Patch).unwrap(), "1.0.1");
    }

    #[test]
    fn increments_minor() {
        assert_eq!(increment("1.0.1", BumpKind::Minor).unwrap(), "1.1.0");
    }

    #[test]
    fn increments_major() {
        assert_eq!(increment("1.1.1", BumpKind::Major).unwrap(), "2.0.0");
    }

    #[test]
    fn bump_zeroes_lower_components_and_drops_metadata() {
        assert_eq!(increment("1.2.3+build.7", BumpKind::Minor).unwrap(), "1.3.0");
        assert_eq!(increment("1.2.3", BumpKind::Major).unwrap(), "2.0.0");
    }

    #[test]
    fn prerelease_graduates_instead_of_skipping() {
        assert_eq!(increment("2.0.0-alpha", BumpKind::Major).unwrap(), "2.0.0");
        assert_eq!(increment("1.3.0-rc.1", BumpKind::Minor).unwrap(), "1.3.0");
        assert_eq!(increment("1.2.3-beta", BumpKind::Patch).unwrap(), "1.2.3");
    }

    #[test]
    fn prerelease_of_a_lower_component_still_bumps() {
        assert_eq!(increment("2.1.0-alpha", BumpKind::Major).unwrap(), "3.0.0");
        assert_eq!(increment("1.3.2-rc.1", BumpKind::Minor).unwrap(), "1.4.0");
    }

    #[test]
    fn malformed_version_is_a_parse_error() {
        let err = increment("one.two.three", BumpKind::Patch).unwrap_err();
        assert!(matches!(err, Error::Version(_)), "got {err}");
    }
}
