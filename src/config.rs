//! Configuration for patientdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default TCP port for the record protocol
pub const DEFAULT_PORT: u16 = 9999;

/// Main configuration for a patientdb server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Close a connection that takes longer than this to send a complete
    /// command line, counted from when the server starts waiting for it
    /// (milliseconds, 0 = never)
    pub idle_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Longest accepted command line in bytes, excluding the newline
    pub max_line_bytes: usize,

    // -------------------------------------------------------------------------
    // Startup Configuration
    // -------------------------------------------------------------------------
    /// Optional JSON file of records loaded before the server starts listening
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            idle_timeout_ms: 0,
            max_line_bytes: 64 * 1024, // 64 KiB
            seed_file: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the idle timeout (in milliseconds, 0 disables it)
    pub fn idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.idle_timeout_ms = ms;
        self
    }

    /// Set the maximum command line length (in bytes)
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.config.max_line_bytes = bytes;
        self
    }

    /// Set the seed file to load at startup
    pub fn seed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.seed_file = Some(path.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
