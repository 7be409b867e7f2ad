//! Root site manifest derived from the landing ref's `pkgdown.yml`.
//!
//! The generator records absolute URLs of the reference and article sections
//! under `urls`. The root copy must point into the landing ref's directory,
//! since that is where the pages are actually served from.

use std::fs;
use std::io;
use std::path::Path;

use serde_yaml::Value;

use crate::error::AssembleError;
use crate::files::write_if_changed;

/// Site manifest filename, both per ref and at the root.
pub const MANIFEST_FILENAME: &str = "pkgdown.yml";

/// What happened to the root manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestOutcome {
    Written,
    /// The root manifest already had the scoped content.
    Unchanged,
    /// The landing ref has no manifest; nothing was written.
    Missing,
}

/// Copy the landing ref's manifest to the root with its URLs scoped.
pub fn write_root_manifest(
    root: &Path,
    landing_ref: &str,
) -> Result<ManifestOutcome, AssembleError> {
    let source = root.join(landing_ref).join(MANIFEST_FILENAME);
    let content = match fs::read_to_string(&source) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(landing_ref, "Landing ref has no site manifest, skipping");
            return Ok(ManifestOutcome::Missing);
        }
        Err(e) => return Err(AssembleError::io(&source, e)),
    };

    let mut manifest: Value = serde_yaml::from_str(&content).map_err(yaml_error(&source))?;
    if let Some(urls) = manifest.get_mut("urls").and_then(Value::as_mapping_mut) {
        for (_, url) in urls.iter_mut() {
            if let Value::String(url) = url {
                *url = scope_url(url, landing_ref);
            }
        }
    }

    let target = root.join(MANIFEST_FILENAME);
    let rendered = serde_yaml::to_string(&manifest).map_err(yaml_error(&target))?;
    if write_if_changed(&target, &rendered)? {
        tracing::info!(landing_ref, "Wrote root site manifest");
        Ok(ManifestOutcome::Written)
    } else {
        tracing::debug!(landing_ref, "Root site manifest unchanged");
        Ok(ManifestOutcome::Unchanged)
    }
}

fn yaml_error(path: &Path) -> impl FnOnce(serde_yaml::Error) -> AssembleError {
    let path = path.to_path_buf();
    move |source| AssembleError::Yaml { path, source }
}

/// Put `landing_ref` in front of the last path segment of `url`.
///
/// URLs whose last segment already sits under `landing_ref` are unchanged.
fn scope_url(url: &str, landing_ref: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let trailing = &url[trimmed.len()..];
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if parent.rsplit('/').next() == Some(landing_ref) => url.to_owned(),
        Some((parent, segment)) => format!("{parent}/{landing_ref}/{segment}{trailing}"),
        None if trimmed.is_empty() => url.to_owned(),
        None => format!("{landing_ref}/{trimmed}{trailing}"),
    }
}
