//! Runtime configuration for the vanity commit miner.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;

use crate::matcher::{PrefixError, TargetPrefix, MAX_PREFIX_LEN};

/// Vanity Commit Miner
///
/// Appends a nonce to a commit so its object ID starts with the given prefix.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Hex prefix for the commit ID (odd length matches half a byte)
    #[arg(short, long)]
    pub prefix: String,

    /// Commit content to mine (`-` reads stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Write the matched commit here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,

    /// Output the full object with its `commit <len>` header
    #[arg(long, default_value = "false")]
    pub raw: bool,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.prefix.strip_prefix("0x").unwrap_or(&self.prefix);

        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidPrefix(
                "Prefix must contain only hex characters (0-9, a-f)".into(),
            ));
        }

        if prefix.len() > MAX_PREFIX_LEN * 2 {
            return Err(ConfigError::InvalidPrefix(
                "Prefix cannot be longer than 40 characters (full object ID)".into(),
            ));
        }

        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        Ok(())
    }

    /// Parses the prefix (after validation).
    pub fn target_prefix(&self) -> Result<TargetPrefix, ConfigError> {
        Ok(TargetPrefix::from_hex(&self.prefix)?)
    }

    /// Reads the commit content from the input file or stdin.
    pub fn read_content(&self) -> Result<Vec<u8>, ConfigError> {
        if self.input.as_os_str() == "-" {
            let mut content = Vec::new();
            io::stdin()
                .read_to_end(&mut content)
                .map_err(|source| ConfigError::Input {
                    path: self.input.clone(),
                    source,
                })?;
            return Ok(content);
        }

        fs::read(&self.input).map_err(|source| ConfigError::Input {
            path: self.input.clone(),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),
    #[error("Worker count must be greater than zero")]
    InvalidWorkers,
    #[error("Report interval must be at least one second")]
    InvalidReportInterval,
    #[error(transparent)]
    Prefix(#[from] PrefixError),
    #[error("Failed to read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config(prefix: &str) -> Config {
        Config {
            prefix: prefix.into(),
            input: PathBuf::from("-"),
            output: None,
            workers: None,
            report_interval: 5,
            raw: false,
        }
    }

    #[test]
    fn test_valid_prefix() {
        let config = make_test_config("c0ffee");
        assert!(config.validate().is_ok());
        assert_eq!(config.target_prefix().unwrap().full_bytes(), &[0xc0, 0xff, 0xee]);
    }

    #[test]
    fn test_odd_prefix_requests_half_nibble() {
        let config = make_test_config("0xbad");
        assert!(config.validate().is_ok());
        let prefix = config.target_prefix().unwrap();
        assert_eq!(prefix.full_bytes(), &[0xba]);
        assert_eq!(prefix.half_nibble(), Some(0xd));
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(make_test_config("xyz").validate().is_err());
        assert!(make_test_config(&"a".repeat(41)).validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = make_test_config("00");
        config.workers = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorkers)));
    }

    #[test]
    fn test_parse_args() {
        let config =
            Config::try_parse_from(["commit-vanity", "-p", "abc", "-w", "3", "--raw"]).unwrap();
        assert_eq!(config.prefix, "abc");
        assert_eq!(config.worker_count(), 3);
        assert!(config.raw);
        assert_eq!(config.input, PathBuf::from("-"));
    }

    #[test]
    fn test_missing_input_file() {
        let mut config = make_test_config("00");
        config.input = PathBuf::from("/nonexistent/commit-vanity-input");
        assert!(matches!(
            config.read_content(),
            Err(ConfigError::Input { .. })
        ));
    }
}
