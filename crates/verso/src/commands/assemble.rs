//! `verso assemble` command implementation.

use clap::Args;
use verso_config::{CliSettings, Config};
use verso_site::{AliasOutcome, AliasReport, AssembleReport, Assembler, ManifestOutcome};

use super::args::{NavigationArgs, SiteArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the assemble command.
#[derive(Args, Debug)]
pub(crate) struct AssembleArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    navigation: NavigationArgs,

    /// Ref the site root redirects to (overrides config).
    #[arg(long, env = "VERSO_DEFAULT_LANDING_PAGE")]
    default_landing_page: Option<String>,

    /// Also publish the latest-tag alias under this name.
    #[arg(long, env = "VERSO_LATEST_TAG_ALT_NAME")]
    latest_tag_alt_name: Option<String>,

    /// Also publish the release-candidate alias under this name.
    #[arg(long, env = "VERSO_RELEASE_CANDIDATE_ALT_NAME")]
    release_candidate_alt_name: Option<String>,
}

impl AssembleArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let mut cli_settings = CliSettings {
            default_landing_page: self.default_landing_page,
            latest_tag_alt_name: self.latest_tag_alt_name,
            release_candidate_alt_name: self.release_candidate_alt_name,
            ..CliSettings::default()
        };
        self.site.apply(&mut cli_settings);
        self.navigation.apply(&mut cli_settings);
        let config = Config::load(self.site.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.config_path, "Loaded configuration");

        let assembler = Assembler::new(config.assemble_config()?)?;
        output.heading(&format!("Assembling {}", assembler.root().display()));

        let report = assembler.run()?;
        print_report(&output, &report);

        let failures = report.alias_failures();
        if failures > 0 {
            return Err(CliError::AliasFailures(failures));
        }
        output.success("Site assembled");
        Ok(())
    }
}

fn print_report(output: &Output, report: &AssembleReport) {
    for alias in &report.aliases {
        let line = describe_alias(alias);
        match alias.outcome {
            AliasOutcome::Created { .. } => output.info(&line),
            AliasOutcome::Skipped => output.warning(&line),
            AliasOutcome::Failed { .. } => output.error(&line),
        }
    }
    match report.root_manifest {
        ManifestOutcome::Written => output.info("Root manifest written"),
        ManifestOutcome::Unchanged => {}
        ManifestOutcome::Missing => {
            output.warning("Landing ref has no pkgdown.yml, root manifest not written");
        }
    }
    let labels: Vec<&str> = report.navigation.iter().map(|e| e.label.as_str()).collect();
    output.info(&format!("Versions: {}", labels.join(", ")));
    output.info(&format!(
        "Pages: {} updated, {} unchanged, {} skipped",
        report.pages.updated, report.pages.unchanged, report.pages.skipped
    ));
}

fn describe_alias(alias: &AliasReport) -> String {
    match &alias.outcome {
        AliasOutcome::Created { source, dirs } => format!("{} -> {source}", dirs.join(", ")),
        AliasOutcome::Skipped => format!("{}: no matching ref, skipped", alias.kind),
        AliasOutcome::Failed { source, error } => {
            format!("{} from {source} failed: {error}", alias.kind)
        }
    }
}
