//! Command-line configuration.
//!
//! Defaults reproduce the fixed setup: port 8080, files from the current
//! directory, nested routes.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::Layout;

/// Static file server with hit counting, health check and CORS.
#[derive(Parser, Debug, Clone)]
#[command(name = "chirpy")]
#[command(version)]
pub struct Config {
    /// TCP port to listen on.
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Directory served under /app.
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Route layout.
    #[arg(long, value_enum, default_value_t = Layout::Nested)]
    pub layout: Layout,

    /// Maximum number of connections served at once.
    #[arg(long, default_value = "512")]
    pub threads: usize,

    /// Seconds an idle keep-alive connection is kept open (0 waits forever).
    #[arg(long, default_value = "5")]
    pub keep_alive_timeout: u64,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.keep_alive_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_setup() {
        let config = Config::parse_from(["chirpy"]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.layout, Layout::Nested);
        assert_eq!(config.threads, 512);
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(5)));
        assert!(!config.verbose);
    }

    #[test]
    fn parses_overrides() {
        let config = Config::parse_from([
            "chirpy",
            "--port",
            "3000",
            "--root",
            "public",
            "--layout",
            "flat",
            "--keep-alive-timeout",
            "0",
            "-v",
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.root, PathBuf::from("public"));
        assert_eq!(config.layout, Layout::Flat);
        assert_eq!(config.read_timeout(), None);
        assert!(config.verbose);
    }

    #[test]
    fn rejects_unknown_layouts() {
        assert!(Config::try_parse_from(["chirpy", "--layout", "tree"]).is_err());
    }
}
