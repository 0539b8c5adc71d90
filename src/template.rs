//! Template loader: raw markup reads, nothing else.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Reads the markup template `name` from `base_dir`.
///
/// No parsing and no side effects beyond the read; the template contract is
/// enforced later by [`crate::content::compose`].
pub fn load_template(base_dir: &Path, name: &str) -> Result<String> {
    let path = base_dir.join(name);
    tracing::debug!(path = %path.display(), "loading panel template");
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(Error::TemplateNotFound { path })
        }
        Err(source) => Err(Error::TemplateRead { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn reads_template_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("view.html"), "<html><!-- CSP --></html>").expect("write");

        let text = load_template(dir.path(), "view.html").expect("load");
        assert_eq!(text, "<html><!-- CSP --></html>");
    }

    #[test]
    fn missing_template_maps_to_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_template(dir.path(), "absent.html").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }), "got {err}");
    }

    #[test]
    fn unreadable_template_maps_to_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should be: the open succeeds, the read fails.
        fs::create_dir(dir.path().join("view.html")).expect("mkdir");

        let err = load_template(dir.path(), "view.html").unwrap_err();
        assert!(matches!(err, Error::TemplateRead { .. }), "got {err}");
    }
}
