//! CLI argument definitions for logminer.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.
//! Every flag overrides the corresponding config-file/environment value.

use std::path::PathBuf;

use clap::Parser;

use logminer_core::config::LogminerConfig;

/// Logminer log ingestion pipeline.
///
/// Walks the configured nginx and Nexus log directories, unpacks nested
/// archives, parses every log line and streams structured records into
/// per-family JSONL files.
#[derive(Parser, Debug)]
#[command(name = "logminer")]
#[command(version, about, long_about = None)]
pub struct LogminerCli {
    /// Path to logminer.toml configuration file.
    #[arg(short, long, default_value = "logminer.toml")]
    pub config: PathBuf,

    /// Root directory to scan for nginx logs.
    #[arg(long)]
    pub nginx_dir: Option<String>,

    /// Root directory to scan for Nexus logs.
    #[arg(long)]
    pub nexus_dir: Option<String>,

    /// Comma-separated glob list for nginx log filenames.
    #[arg(long)]
    pub nginx_pattern: Option<String>,

    /// Comma-separated glob list for Nexus log filenames.
    #[arg(long)]
    pub nexus_pattern: Option<String>,

    /// Records per storage batch.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum nested-archive extraction depth (1-10).
    #[arg(long)]
    pub max_archive_depth: Option<usize>,

    /// Directory for the per-family JSONL output files.
    #[arg(long, default_value = "./out")]
    pub output_dir: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without running ingestion.
    #[arg(long)]
    pub validate: bool,
}

impl LogminerCli {
    /// Apply CLI flag overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut LogminerConfig) {
        if let Some(v) = &self.log_level {
            config.general.log_level = v.clone();
        }
        if let Some(v) = &self.log_format {
            config.general.log_format = v.clone();
        }
        if let Some(v) = &self.nginx_dir {
            config.ingest.nginx_dir = v.clone();
        }
        if let Some(v) = &self.nexus_dir {
            config.ingest.nexus_dir = v.clone();
        }
        if let Some(v) = &self.nginx_pattern {
            config.ingest.nginx_pattern = v.clone();
        }
        if let Some(v) = &self.nexus_pattern {
            config.ingest.nexus_pattern = v.clone();
        }
        if let Some(v) = self.chunk_size {
            config.ingest.chunk_size = v;
        }
        if let Some(v) = self.max_archive_depth {
            config.ingest.max_archive_depth = v;
        }
    }
}
