//! Command-line interface definitions for `relayd`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use relay_config::{DEFAULT_LOG_FILTER, LogFormat};

/// Process supervisor for the relay service.
#[derive(Parser, Debug)]
#[command(name = "relayd", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Tracing filter expression applied to the log file.
    #[arg(long, global = true, value_name = "EXPR", default_value = DEFAULT_LOG_FILTER)]
    pub(crate) log_filter: String,
    /// Log line format.
    #[arg(long, global = true, value_name = "FORMAT", default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

impl Cli {
    /// Logging flags handed to a re-executed background instance.
    pub(crate) fn forwarded_arguments(&self) -> Vec<String> {
        vec![
            "--log-filter".to_owned(),
            self.log_filter.clone(),
            "--log-format".to_owned(),
            self.log_format.to_string(),
        ]
    }
}

/// Lifecycle subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Serves the configured listeners, or spawns a background instance.
    Run {
        /// Configuration file; defaults to the runtime directory's config.json.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Detaches into a background process and records its pid.
        #[arg(short, long)]
        daemon: bool,
    },
    /// Kills the recorded background process.
    Stop,
    /// Stops the background process, then starts a new one.
    Reload {
        /// Configuration file for the new instance.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("relayd").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = parse(&["stop"]);
        assert_eq!(cli.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(cli.log_format, LogFormat::Compact);
        assert_eq!(cli.command, CliCommand::Stop);
    }

    #[rstest]
    #[case(&["run"], CliCommand::Run { config: None, daemon: false })]
    #[case(&["run", "-d"], CliCommand::Run { config: None, daemon: true })]
    #[case(
        &["run", "--config", "relay.json", "--daemon"],
        CliCommand::Run { config: Some(PathBuf::from("relay.json")), daemon: true }
    )]
    #[case(
        &["reload", "-c", "/etc/relay.json"],
        CliCommand::Reload { config: Some(PathBuf::from("/etc/relay.json")) }
    )]
    #[case(&["reload"], CliCommand::Reload { config: None })]
    fn parses_subcommands(#[case] args: &[&str], #[case] expected: CliCommand) {
        assert_eq!(parse(args).command, expected);
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = parse(&["run", "--log-format", "json", "--log-filter", "info"]);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_filter, "info");
    }

    #[test]
    fn forwarded_arguments_carry_logging_flags() {
        let cli = parse(&["--log-format", "json", "--log-filter", "relayd=trace", "run"]);
        assert_eq!(
            cli.forwarded_arguments(),
            ["--log-filter", "relayd=trace", "--log-format", "json"]
        );
    }

    #[rstest]
    #[case::missing_subcommand(&[])]
    #[case::unknown_subcommand(&["restart"])]
    #[case::bad_format(&["--log-format", "yaml", "stop"])]
    fn rejects_invalid_invocations(#[case] args: &[&str]) {
        let result = Cli::try_parse_from(std::iter::once("relayd").chain(args.iter().copied()));
        assert!(result.is_err());
    }
}
