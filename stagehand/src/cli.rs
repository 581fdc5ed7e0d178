//! CLI argument definitions for the stagehand agent.
//!
//! The binary maps one invocation onto one request: the secret, command,
//! version, and signature arrive as arguments (or environment variables),
//! and the JSON outcome is printed to stdout.

use crate::config::DEFAULT_CONFIG_FILE;
use camino::Utf8PathBuf;
use clap::Parser;

/// Verify, extract, and atomically deploy an application archive.
#[derive(Parser, Debug, Default)]
#[command(name = "stagehand")]
#[command(version, about)]
#[command(after_help = concat!(
    "COMMANDS:\n",
    "  info                  Report the agent version, host and configuration\n",
    "  extract               Verify and extract the archive only\n",
    "  deploy                Deploy an already extracted app\n",
    "  extract-and-deploy    Execute both extract and deploy\n\n",
    "EXAMPLES:\n",
    "  Verify and unpack app-1.2.3.zip:\n",
    "    $ stagehand extract --app-version 1.2.3 --signature <xxh128>\n\n",
    "  Promote the unpacked release:\n",
    "    $ stagehand deploy --app-version 1.2.3",
))]
pub struct Cli {
    /// Command to run (case-insensitive).
    #[arg(value_name = "COMMAND", env = "STAGEHAND_COMMAND")]
    pub command: Option<String>,

    /// Application version to extract or deploy.
    #[arg(long = "app-version", value_name = "APP_VER", env = "STAGEHAND_APP_VER")]
    pub app_version: Option<String>,

    /// Expected archive digest, lowercase hex.
    #[arg(long, value_name = "APP_SIGNATURE", env = "STAGEHAND_APP_SIGNATURE")]
    pub signature: Option<String>,

    /// Shared secret authorising the request.
    #[arg(long, env = "STAGEHAND_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Path to the configuration file.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter implied by the verbosity flags.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
