//! stagehand CLI entrypoint.
//!
//! Loads configuration, authorises the request, runs the requested command,
//! and prints the JSON outcome to stdout. The process exits with the
//! outcome's code.

use clap::Parser;
use log::error;
use stagehand::artefact::extraction::ZipExtractor;
use stagehand::cli::Cli;
use stagehand::config::DeployConfig;
use stagehand::error::Result;
use stagehand::fs_ops::StdDirectoryOps;
use stagehand::gate::RequestGate;
use stagehand::outcome::Outcome;
use stagehand::pipeline::{Command, DeployRequest, Pipeline};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let outcome = run(&cli);
    let mut stdout = std::io::stdout();
    write_outcome(&mut stdout, &outcome);
    if outcome.code != 0 {
        std::process::exit(outcome.code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: &Cli) -> Outcome {
    match execute(cli) {
        Ok(messages) => Outcome::success(messages),
        Err(err) => {
            error!("{err}");
            Outcome::from(err)
        }
    }
}

fn execute(cli: &Cli) -> Result<Vec<String>> {
    let config = DeployConfig::load(&cli.config)?;
    RequestGate::from_config(&config).authorise(cli.secret.as_deref())?;

    let command: Command = cli.command.as_deref().unwrap_or_default().parse()?;
    let request = DeployRequest::new(command, cli.app_version.clone(), cli.signature.clone());
    let report = Pipeline::new(&config, &ZipExtractor, &StdDirectoryOps).run(&request)?;
    Ok(report.messages())
}

fn write_outcome(out: &mut dyn Write, outcome: &Outcome) {
    match outcome.to_json() {
        Ok(json) => {
            if writeln!(out, "{json}").is_err() {
                // Nowhere left to report to.
            }
        }
        Err(err) => error!("failed to serialise outcome: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use stagehand::test_utils::DeploymentLayout;

    struct Harness {
        layout: DeploymentLayout,
        config_path: Utf8PathBuf,
    }

    #[fixture]
    fn harness() -> Harness {
        let layout = DeploymentLayout::new("app");
        let config = &layout.config;
        let toml = format!(
            concat!(
                "application_name = \"{}\"\n",
                "secret = \"{}\"\n",
                "package_dir = \"{}\"\n",
                "extract_dir = \"{}\"\n",
                "live_dir = \"{}\"\n",
                "auth_failure_delay_ms = 0\n",
            ),
            config.application_name,
            config.secret,
            config.package_dir,
            config.extract_dir,
            config.live_dir,
        );
        let config_path = config
            .package_dir
            .parent()
            .expect("layout root")
            .join("stagehand.toml");
        std::fs::write(&config_path, toml).expect("write config");
        Harness {
            layout,
            config_path,
        }
    }

    fn cli(harness: &Harness, args: &[&str]) -> Cli {
        let mut argv = vec!["stagehand", "--config", harness.config_path.as_str()];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[rstest]
    fn wrong_secret_is_rejected(harness: Harness) {
        let outcome = run(&cli(&harness, &["info", "--secret", "guess"]));
        assert_eq!(outcome.code, 3);
        assert_eq!(outcome.messages, vec!["invalid request"]);
    }

    #[rstest]
    fn unknown_command_lists_valid_commands(harness: Harness) {
        let outcome = run(&cli(&harness, &["launch", "--secret", "test-secret"]));
        assert_eq!(outcome.code, 2);
        assert_eq!(
            outcome.messages.first().map(String::as_str),
            Some("invalid COMMAND")
        );
    }

    #[rstest]
    fn extract_and_deploy_succeeds(harness: Harness) {
        let digest = harness
            .layout
            .upload("1.2.3", &[("index.html", "new release")]);
        let outcome = run(&cli(
            &harness,
            &[
                "extract-and-deploy",
                "--secret",
                "test-secret",
                "--app-version",
                "1.2.3",
                "--signature",
                digest.as_str(),
            ],
        ));
        assert!(outcome.is_success(), "{:?}", outcome.messages);
        let live = std::fs::read_to_string(harness.layout.live_path().join("index.html"))
            .expect("read live index");
        assert_eq!(live, "new release");
    }

    #[test]
    fn missing_config_is_a_config_error() {
        let outcome = run(&Cli::parse_from([
            "stagehand",
            "--config",
            "/nonexistent/stagehand.toml",
            "info",
        ]));
        assert_eq!(outcome.code, 4);
    }

    #[test]
    fn outcome_is_written_as_one_json_line() {
        let mut out = Vec::new();
        write_outcome(&mut out, &Outcome::success(vec!["Success".to_owned()]));
        let text = String::from_utf8(out).expect("stdout was not UTF-8");
        assert_eq!(text, "{\"type\":\"success\",\"code\":0,\"messages\":[\"Success\"]}\n");
    }
}
