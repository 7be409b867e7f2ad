//! `verso dropdown` command implementation.

use clap::Args;
use verso_config::{CliSettings, Config};
use verso_site::Assembler;

use super::args::{NavigationArgs, SiteArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the dropdown command.
#[derive(Args, Debug)]
pub(crate) struct DropdownArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    navigation: NavigationArgs,
}

impl DropdownArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let mut cli_settings = CliSettings::default();
        self.site.apply(&mut cli_settings);
        self.navigation.apply(&mut cli_settings);
        let config = Config::load(self.site.config.as_deref(), Some(&cli_settings))?;

        let assembler = Assembler::new(config.assemble_config()?)?;
        output.heading(&format!(
            "Updating navigation in {}",
            assembler.root().display()
        ));

        let report = assembler.inject_navigation_only()?;
        let labels: Vec<&str> = report.navigation.iter().map(|e| e.label.as_str()).collect();
        output.info(&format!("Versions: {}", labels.join(", ")));
        if report.scoped_indexes > 0 {
            output.info(&format!("Search indexes scoped: {}", report.scoped_indexes));
        }
        output.success(&format!(
            "Dropdown injected into {} page(s), {} already current",
            report.pages.updated, report.pages.unchanged
        ));
        if report.pages.skipped > 0 {
            output.warning(&format!(
                "{} page(s) have no navbar and were left alone",
                report.pages.skipped
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: DropdownArgs,
    }

    #[test]
    fn execute_injects_without_aliases() {
        let temp = tempfile::tempdir().unwrap();
        let main = temp.path().join("main");
        fs::create_dir_all(&main).unwrap();
        fs::write(
            main.join("index.html"),
            "<div id=\"navbar\"><ul class=\"navbar-nav me-auto\">\
             <li class=\"nav-item\">Home</li></ul></div>",
        )
        .unwrap();
        fs::write(main.join("404.html"), "<p>Not found</p>").unwrap();
        let config = temp.path().join("verso.toml");
        fs::write(&config, "").unwrap();

        TestCli::try_parse_from([
            "dropdown",
            temp.path().to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--base-url",
            "https://docs.example.com/pkg",
        ])
        .unwrap()
        .args
        .execute()
        .unwrap();

        let page = fs::read_to_string(main.join("index.html")).unwrap();
        assert!(page.contains("href=\"https://docs.example.com/pkg/main/\""));
        assert_eq!(
            fs::read_to_string(main.join("404.html")).unwrap(),
            "<p>Not found</p>"
        );
        assert!(!temp.path().join("latest-tag").exists());
        assert!(!temp.path().join("index.html").exists());
    }
}
