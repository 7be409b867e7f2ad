//! Versions dropdown injection into generated HTML pages.
//!
//! Pages are edited textually: tags are located with a lightweight scanner
//! and only the navbar list is touched, so the rest of each page keeps its
//! exact bytes. The navbar is the first `ul.navbar-nav.me-auto` inside
//! `div#navbar`, as emitted by the generator's Bootstrap 5 templates.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AssembleError, IoResultExt};
use crate::files::{html_files, write_if_changed};
use crate::navigation::DROPDOWN_ID;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<(/)?([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .unwrap()
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .unwrap()
});

static SCRIPT_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</script").unwrap());
static STYLE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</style").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Why a page was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `ul.navbar-nav.me-auto` inside `div#navbar`.
    NoNavbar,
    /// The navbar list has no `nav-item` entries.
    NoNavItems,
    /// Navbar elements are not properly closed.
    Malformed,
    /// The file is not UTF-8 and cannot be edited as text.
    NotUtf8,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoNavbar => "no navbar found",
            Self::NoNavItems => "navbar has no items",
            Self::Malformed => "navbar markup is not well formed",
            Self::NotUtf8 => "page is not valid UTF-8",
        })
    }
}

/// Result of processing one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Updated,
    Unchanged,
    Skipped(SkipReason),
}

/// Page counts for one injection pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InjectStats {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl InjectStats {
    fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Updated => self.updated += 1,
            PageOutcome::Unchanged => self.unchanged += 1,
            PageOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Add another pass's counts to these.
    pub fn merge(&mut self, other: Self) {
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
    }
}

#[derive(Debug)]
struct Tag<'a> {
    start: usize,
    end: usize,
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: &'a str,
}

impl Tag<'_> {
    fn is_open(&self, name: &str) -> bool {
        !self.closing && self.name == name
    }

    fn attr(&self, name: &str) -> Option<&str> {
        attr_value(self.attrs, name)
    }
}

fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
    })
}

fn has_classes(tag: &Tag<'_>, wanted: &[&str]) -> bool {
    tag.attr("class").is_some_and(|class| {
        let tokens: Vec<&str> = class.split_ascii_whitespace().collect();
        wanted.iter().all(|w| tokens.contains(w))
    })
}

/// Tokenize element tags, skipping comments and raw text of scripts/styles.
fn scan_tags(html: &str) -> Vec<Tag<'_>> {
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(caps) = TAG_RE.captures_at(html, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        pos = whole.end();
        let Some(name) = caps.get(2) else {
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if !closing {
            let raw_end = match name.as_str() {
                "script" => Some(&*SCRIPT_END_RE),
                "style" => Some(&*STYLE_END_RE),
                _ => None,
            };
            if let Some(raw_end) = raw_end {
                pos = raw_end.find_at(html, pos).map_or(html.len(), |m| m.start());
            }
        }

        tags.push(Tag {
            start: whole.start(),
            end: whole.end(),
            self_closing: attrs.trim_end().ends_with('/'),
            name,
            closing,
            attrs,
        });
    }
    tags
}

/// Index of the tag closing the element opened at `open`.
fn matching_close(tags: &[Tag<'_>], open: usize) -> Option<usize> {
    let name = &tags[open].name;
    let mut depth = 0usize;
    for (i, tag) in tags.iter().enumerate().skip(open) {
        if tag.name != *name || tag.self_closing {
            continue;
        }
        if tag.closing {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// Insert or replace the versions dropdown in one page's navbar.
///
/// An existing dropdown is replaced in place and duplicates are dropped;
/// otherwise the dropdown becomes the last item of the navbar list.
pub fn inject_dropdown(html: &str, dropdown: &str) -> Result<String, SkipReason> {
    let tags = scan_tags(html);

    let navbar = tags
        .iter()
        .position(|t| t.is_open("div") && t.attr("id") == Some("navbar"))
        .ok_or(SkipReason::NoNavbar)?;
    let navbar_end = matching_close(&tags, navbar).ok_or(SkipReason::Malformed)?;
    let list = (navbar + 1..navbar_end)
        .find(|&i| tags[i].is_open("ul") && has_classes(&tags[i], &["navbar-nav", "me-auto"]))
        .ok_or(SkipReason::NoNavbar)?;
    let list_end = matching_close(&tags[..navbar_end], list).ok_or(SkipReason::Malformed)?;
    let inner = &tags[list + 1..list_end];

    let has_items = inner.iter().any(|t| {
        t.is_open("li") && t.attr("class").is_some_and(|c| c.contains("nav-item"))
    });
    if !has_items {
        return Err(SkipReason::NoNavItems);
    }

    // Direct children of the list, as (first tag, last tag) index pairs.
    let mut children = Vec::new();
    let mut i = list + 1;
    while i < list_end {
        let tag = &tags[i];
        if tag.closing {
            i += 1;
            continue;
        }
        let last = if tag.self_closing || VOID_ELEMENTS.contains(&tag.name.as_str()) {
            i
        } else {
            matching_close(&tags[..list_end], i).ok_or(SkipReason::Malformed)?
        };
        children.push((i, last));
        i = last + 1;
    }

    let existing: Vec<(usize, usize)> = children
        .into_iter()
        .filter(|&(first, last)| {
            tags[first..=last]
                .iter()
                .any(|t| t.attr("aria-labelledby") == Some(DROPDOWN_ID))
        })
        .map(|(first, last)| (tags[first].start, tags[last].end))
        .collect();

    let mut out = String::with_capacity(html.len() + dropdown.len() + 1);
    match existing.split_first() {
        None => {
            let at = tags[list_end].start;
            out.push_str(&html[..at]);
            out.push_str(dropdown);
            out.push('\n');
            out.push_str(&html[at..]);
        }
        Some((&(start, end), duplicates)) => {
            out.push_str(&html[..start]);
            out.push_str(dropdown);
            let mut cursor = end;
            for &(dup_start, dup_end) in duplicates {
                out.push_str(&html[cursor..dup_start]);
                cursor = dup_end;
            }
            out.push_str(&html[cursor..]);
        }
    }
    Ok(out)
}

/// Inject the dropdown into one HTML file, writing only on change.
pub fn inject_file(path: &Path, dropdown: &str) -> Result<PageOutcome, AssembleError> {
    let Ok(html) = String::from_utf8(fs::read(path).at(path)?) else {
        tracing::warn!(path = %path.display(), "Skipping page that is not valid UTF-8");
        return Ok(PageOutcome::Skipped(SkipReason::NotUtf8));
    };
    match inject_dropdown(&html, dropdown) {
        Ok(updated) => {
            if write_if_changed(path, &updated)? {
                tracing::debug!(path = %path.display(), "Injected versions dropdown");
                Ok(PageOutcome::Updated)
            } else {
                Ok(PageOutcome::Unchanged)
            }
        }
        Err(reason) => {
            tracing::debug!(path = %path.display(), %reason, "Skipped page");
            Ok(PageOutcome::Skipped(reason))
        }
    }
}

/// Inject the dropdown into every HTML page beneath `dir`.
pub fn inject_tree(dir: &Path, dropdown: &str) -> Result<InjectStats, AssembleError> {
    let mut stats = InjectStats::default();
    for path in html_files(dir)? {
        stats.record(inject_file(&path, dropdown)?);
    }
    Ok(stats)
}
