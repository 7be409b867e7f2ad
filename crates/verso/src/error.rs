//! CLI error types.

use verso_config::ConfigError;
use verso_site::AssembleError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Assemble(#[from] AssembleError),

    #[error("{0} alias(es) could not be created")]
    AliasFailures(usize),
}
