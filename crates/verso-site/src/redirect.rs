//! Landing page redirecting the site root to the default ref.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::error::{AssembleError, IoResultExt};
use crate::html::escape;

/// Redirect page written at the site root.
pub const LANDING_FILENAME: &str = "index.html";

/// Marker telling GitHub Pages to serve files without Jekyll processing.
pub const NO_TEMPLATING_MARKER: &str = ".nojekyll";

/// GitHub Pages base URL for an `owner/name` repository.
///
/// Returns `None` unless `repository` is exactly two non-empty segments.
#[must_use]
pub fn pages_base_url(repository: &str) -> Option<String> {
    let (owner, name) = repository.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some(format!("https://{owner}.github.io/{name}/"))
}

/// Ensure a base URL ends with exactly one `/`.
#[must_use]
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Render a page that immediately forwards to `target_url`.
#[must_use]
pub fn render_redirect(target_url: &str) -> String {
    let target = escape(target_url);
    let mut html = String::with_capacity(512);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>Redirecting to {target}</title>");
    let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"0; URL={target}\">");
    let _ = writeln!(html, "<link rel=\"canonical\" href=\"{target}\">");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<p>Redirecting to <a href=\"{target}\">{target}</a></p>");
    html.push_str("</body>\n</html>\n");
    html
}

/// Write the root redirect page and the no-templating marker.
///
/// Both files are overwritten on every run.
pub fn write_landing(root: &Path, base_url: &str, landing_ref: &str) -> Result<(), AssembleError> {
    let target = format!("{}{landing_ref}/", normalize_base_url(base_url));
    let index = root.join(LANDING_FILENAME);
    fs::write(&index, render_redirect(&target)).at(&index)?;

    let marker = root.join(NO_TEMPLATING_MARKER);
    fs::write(&marker, "").at(&marker)?;

    tracing::info!(target = %target, "Wrote landing page redirect");
    Ok(())
}
