// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Most scan flags are optional: when a flag is not given, the value from
// the --config file (or the built-in default) is used. Flags can also be
// set through MD_LINK_GUARDIAN_* environment variables, handy in CI.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use md_link_guardian::{ScanConfig, ScanError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "md-link-guardian",
    version,
    about = "A CLI tool to scan markdown files for broken links",
    long_about = "md-link-guardian walks a directory, extracts every link from its markdown files \
                  and checks them: URLs over HTTP, relative links against the filesystem. \
                  It's perfect for CI/CD pipelines to keep documentation links healthy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show every checked link and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory of markdown files for broken links
    ///
    /// Example: md-link-guardian scan docs/ --exclude 'linkedin\.com'
    Scan(ScanArgs),

    /// Print the links found in a single markdown file (no checking)
    ///
    /// Example: md-link-guardian extract README.md
    Extract {
        /// Markdown file to read
        file: PathBuf,

        /// Output links as JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory (or single markdown file) to scan
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Only check relative links; never touch the network
    #[arg(long, env = "MD_LINK_GUARDIAN_OFFLINE")]
    pub offline: bool,

    /// JSON config file with scan settings
    #[arg(long, env = "MD_LINK_GUARDIAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of HTTP checks running at once
    #[arg(short, long, env = "MD_LINK_GUARDIAN_CONCURRENCY",
          value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Number of URLs from one file checked together
    #[arg(long, env = "MD_LINK_GUARDIAN_BATCH_SIZE",
          value_parser = clap::value_parser!(u16).range(1..))]
    pub batch_size: Option<u16>,

    /// Per-request timeout in seconds
    #[arg(long, env = "MD_LINK_GUARDIAN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Retries after a timeout or connection failure
    #[arg(long, env = "MD_LINK_GUARDIAN_RETRIES")]
    pub retries: Option<u8>,

    /// Don't check URLs matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Don't descend into directories with this name (repeatable)
    #[arg(long, value_name = "NAME")]
    pub skip_dir: Vec<String>,
}

impl ScanArgs {
    // Builds the effective config: file (or defaults), then flags on top
    pub fn to_config(&self) -> Result<ScanConfig, ScanError> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_file(path)?,
            None => ScanConfig::default(),
        };

        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency as usize;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size as usize;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if self.offline {
            config.offline = true;
        }
        config.exclude.extend(self.exclude.iter().cloned());
        config.skip_dirs.extend(self.skip_dir.iter().cloned());

        Ok(config)
    }
}
