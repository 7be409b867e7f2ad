//! Link rewriting inside the generator's `search.json` search index.
//!
//! The index is a JSON array of page records. Only the link fields of each
//! record (`path`, `id`) are rewritten; titles and page text are left alone.
//! An index that fails to parse is rewritten as plain text instead.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::{AssembleError, IoResultExt};
use crate::files::write_if_changed;

/// Search index filename inside a ref directory.
pub const SEARCH_INDEX_FILENAME: &str = "search.json";

/// Record fields that carry page links.
const LINK_FIELDS: &[&str] = &["path", "id"];

/// Replace every occurrence of `source` with `alias` in the index links.
///
/// Returns `true` when the file changed. A missing index is not an error.
pub fn rewrite_ref_name(
    index_path: &Path,
    source: &str,
    alias: &str,
) -> Result<bool, AssembleError> {
    rewrite_links(index_path, |link| link.replace(source, alias))
}

/// Scope absolute links under the ref they belong to.
///
/// Every occurrence of `base_url` not already followed by `<ref_name>/` gets
/// `<ref_name>/` inserted after it. Running this twice is a no-op.
pub fn scope_urls(
    index_path: &Path,
    base_url: &str,
    ref_name: &str,
) -> Result<bool, AssembleError> {
    rewrite_links(index_path, |link| scope_link(link, base_url, ref_name))
}

fn scope_link(link: &str, base_url: &str, ref_name: &str) -> String {
    if base_url.is_empty() {
        return link.to_owned();
    }
    let scoped_prefix = format!("{ref_name}/");
    let mut result = String::with_capacity(link.len() + scoped_prefix.len());
    let mut rest = link;
    while let Some(pos) = rest.find(base_url) {
        let after = pos + base_url.len();
        result.push_str(&rest[..after]);
        rest = &rest[after..];
        if !rest.starts_with(&scoped_prefix) {
            result.push_str(&scoped_prefix);
        }
    }
    result.push_str(rest);
    result
}

fn rewrite_links<F>(index_path: &Path, rewrite: F) -> Result<bool, AssembleError>
where
    F: Fn(&str) -> String,
{
    let content = match fs::read_to_string(index_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(AssembleError::io(index_path, e)),
    };

    let updated = match serde_json::from_str::<Value>(&content) {
        Ok(mut index) => {
            if !rewrite_value(&mut index, &rewrite) {
                return Ok(false);
            }
            serde_json::to_string(&index).map_err(|source| AssembleError::Json {
                path: index_path.to_path_buf(),
                source,
            })?
        }
        Err(e) => {
            tracing::warn!(
                path = %index_path.display(),
                error = %e,
                "Search index is not valid JSON, rewriting as text"
            );
            rewrite(&content)
        }
    };

    let written = write_if_changed(index_path, &updated)?;
    if written {
        tracing::debug!(path = %index_path.display(), "Rewrote search index links");
    }
    Ok(written)
}

/// Rewrite link fields anywhere in `value`. Returns `true` if anything changed.
fn rewrite_value<F>(value: &mut Value, rewrite: &F) -> bool
where
    F: Fn(&str) -> String,
{
    match value {
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |changed, item| rewrite_value(item, rewrite) | changed),
        Value::Object(record) => {
            let mut changed = false;
            for (key, field) in record.iter_mut() {
                if let Value::String(link) = field
                    && LINK_FIELDS.contains(&key.as_str())
                {
                    let new_link = rewrite(link);
                    if new_link != *link {
                        *link = new_link;
                        changed = true;
                    }
                } else {
                    changed |= rewrite_value(field, rewrite);
                }
            }
            changed
        }
        _ => false,
    }
}

/// Whether any link field in the index still mentions `ref_name`.
pub(crate) fn links_mention(index_path: &Path, ref_name: &str) -> Result<bool, AssembleError> {
    let content = fs::read_to_string(index_path).at(index_path)?;
    let Ok(index) = serde_json::from_str::<Value>(&content) else {
        return Ok(content.contains(ref_name));
    };
    Ok(value_mentions(&index, ref_name))
}

fn value_mentions(value: &Value, ref_name: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| value_mentions(item, ref_name)),
        Value::Object(record) => record.iter().any(|(key, field)| match field {
            Value::String(link) if LINK_FIELDS.contains(&key.as_str()) => link.contains(ref_name),
            other => value_mentions(other, ref_name),
        }),
        _ => false,
    }
}
