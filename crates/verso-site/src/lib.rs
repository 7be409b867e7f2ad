//! Multi-version documentation site assembly.
//!
//! A site root holds one directory per git ref (`main`, `v1.2.0`, ...), each a
//! complete rendered documentation site. [`Assembler`] turns that into one
//! browsable site: it recreates the `latest-tag` and `release-candidate`
//! aliases, writes a root redirect and manifest, scopes search indexes to their
//! ref, and injects a versions dropdown into every page.

pub mod alias;
mod assembler;
mod error;
mod files;
mod html;
pub mod inject;
pub mod manifest;
pub mod navigation;
pub mod redirect;
pub mod search_index;
pub mod version;

pub use alias::{AliasKind, AliasNames, AliasOutcome, AliasReport};
pub use assembler::{AssembleConfig, AssembleReport, Assembler, NavigationReport};
pub use error::AssembleError;
pub use inject::{InjectStats, PageOutcome, SkipReason};
pub use manifest::ManifestOutcome;
pub use navigation::{NavEntry, RemainingOrder};
pub use redirect::{normalize_base_url, pages_base_url};
