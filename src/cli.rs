use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config;

#[derive(Parser, Debug)]
#[command(
    name = "vpn-inspector",
    version,
    about = "Report whether a VPN connection is active on this host"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(short, long, global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,
    #[arg(
        long,
        global = true,
        default_value = "/",
        help = "Root of the host tree to read procfs, sysfs and /etc from"
    )]
    pub host_root: PathBuf,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Inspect once and print the report (default)
    Inspect,
    /// Re-inspect periodically and print each changed report
    Watch {
        #[arg(long, default_value_t = config::WATCH_INTERVAL_MS)]
        interval_ms: u64,
        #[arg(
            long,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Stop after this many reports"
        )]
        count: Option<u64>,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Inspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_inspect() {
        let cli = Cli::parse_from(["vpn-inspector"]);
        assert_eq!(cli.command(), Commands::Inspect);
        assert!(!cli.json);
        assert_eq!(cli.host_root, PathBuf::from("/"));
    }

    #[test]
    fn test_watch_arguments() {
        let cli = Cli::parse_from([
            "vpn-inspector",
            "watch",
            "--interval-ms",
            "500",
            "--count",
            "3",
            "--json",
        ]);
        assert!(cli.json);
        assert_eq!(
            cli.command(),
            Commands::Watch {
                interval_ms: 500,
                count: Some(3)
            }
        );
    }

    #[test]
    fn test_watch_count_must_be_positive() {
        assert!(Cli::try_parse_from(["vpn-inspector", "watch", "--count", "0"]).is_err());
        assert!(Cli::try_parse_from(["vpn-inspector", "watch", "--count", "1"]).is_ok());
    }

    #[test]
    fn test_watch_interval_default() {
        let cli = Cli::parse_from(["vpn-inspector", "watch"]);
        assert_eq!(
            cli.command(),
            Commands::Watch {
                interval_ms: config::WATCH_INTERVAL_MS,
                count: None
            }
        );
    }
}
