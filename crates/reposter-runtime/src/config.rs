//! Runtime configuration
//!
//! Routing state lives in the table file; this covers how the process runs.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

/// Process-level settings
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Routing table file
    pub table_path: PathBuf,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Inbound events buffered ahead of the node
    pub channel_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            table_path: PathBuf::from("config.json"),
            log_filter: "info".to_string(),
            log_json: false,
            channel_capacity: 64,
        }
    }
}

/// Relays posts from registered source feeds to every registered sink.
///
/// Reads inbound events as JSON lines on stdin and writes deliveries,
/// replies and reactions as JSON lines on stdout.
#[derive(Parser, Debug)]
#[command(name = "reposter", version)]
pub struct Cli {
    /// Path to the routing table file
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Inbound events buffered while the relay is busy
    #[arg(long, default_value = "64")]
    pub channel_capacity: NonZeroUsize,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        RuntimeConfig {
            table_path: cli.config,
            log_filter: cli.log_filter,
            log_json: cli.log_json,
            channel_capacity: cli.channel_capacity.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["reposter"]).unwrap();
        let config = RuntimeConfig::from(cli);
        let default = RuntimeConfig::default();
        assert_eq!(config.table_path, default.table_path);
        assert_eq!(config.log_filter, default.log_filter);
        assert!(!config.log_json);
        assert_eq!(config.channel_capacity, default.channel_capacity);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "reposter",
            "--config",
            "/etc/reposter/table.json",
            "--log-filter",
            "reposter_runtime=debug",
            "--log-json",
            "--channel-capacity",
            "8",
        ])
        .unwrap();
        let config = RuntimeConfig::from(cli);
        assert_eq!(config.table_path, PathBuf::from("/etc/reposter/table.json"));
        assert_eq!(config.log_filter, "reposter_runtime=debug");
        assert!(config.log_json);
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn test_zero_channel_capacity_rejected() {
        assert!(Cli::try_parse_from(["reposter", "--channel-capacity", "0"]).is_err());
    }
}
