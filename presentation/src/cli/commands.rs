//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for skybit
#[derive(Parser, Debug)]
#[command(name = "skybit")]
#[command(author, version, about = "Local tool-call gateway for trading agents")]
#[command(long_about = r#"
skybit exposes market data, trade preview, order placement, policy and audit
tools to an automated agent through one JSON envelope:

  POST /mcp   {"name": "trade.preview", "args": {...}}
  ->          {"ok": true, "data": {...}}

Brokerage tools (broker.*) talk to SnapTrade and need SNAPTRADE_CLIENT_ID and
SNAPTRADE_CLIENT_SECRET in the environment.

Configuration files are loaded from (in priority order):
1. SKYBIT_* environment variables (e.g. SKYBIT_SERVER__BIND)
2. --config <path>                 Explicit config file
3. ./skybit.toml                   Project-level config
4. ~/.config/skybit/config.toml    Global config

Example:
  skybit serve --bind 127.0.0.1:7878
  skybit tools
  skybit call trade.preview --args '{"orders":[{"qty":10,"limit_price":5}]}'
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The command to run; `serve` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve { bind: None })
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP tool gateway until interrupted
    Serve {
        /// Listen address (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// List registered tools
    Tools,

    /// Dispatch a single tool call and print the response envelope
    Call {
        /// Tool name, e.g. data.snapshot
        name: String,

        /// Arguments as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        args: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::parse_from(["skybit"]);
        assert_eq!(cli.command(), Command::Serve { bind: None });
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_call_with_args_and_global_flags() {
        let cli = Cli::parse_from([
            "skybit",
            "call",
            "data.snapshot",
            "--args",
            r#"{"symbols":["BTC-USD"]}"#,
            "-vv",
            "--no-config",
        ]);
        assert_eq!(
            cli.command(),
            Command::Call {
                name: "data.snapshot".into(),
                args: r#"{"symbols":["BTC-USD"]}"#.into(),
            }
        );
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
    }

    #[test]
    fn test_serve_bind_override() {
        let cli = Cli::parse_from(["skybit", "--config", "x.toml", "serve", "--bind", "0.0.0.0:1"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert_eq!(
            cli.command(),
            Command::Serve {
                bind: Some("0.0.0.0:1".into())
            }
        );
    }
}
