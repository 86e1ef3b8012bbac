//! CLI argument parsing module for reqlint

use crate::error::ConfigError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Linter for pip requirements manifests
#[derive(Parser, Debug, Clone)]
#[command(name = "reqlint", version, about = "Linter for pip requirements manifests")]
pub struct CliArgs {
    /// Manifest files or directories to lint
    #[arg(default_value = "requirements.txt")]
    pub paths: Vec<PathBuf>,

    // Target environment
    /// Python version markers are evaluated against (e.g. 3.11 or 3.11.4)
    #[arg(long, value_name = "VERSION")]
    pub python_version: Option<String>,

    /// Full Python version (python_full_version), e.g. 3.11.4
    #[arg(long, value_name = "VERSION")]
    pub python_full_version: Option<String>,

    /// Target sys_platform (e.g. linux, darwin, win32)
    #[arg(long, value_name = "PLATFORM")]
    pub sys_platform: Option<String>,

    /// Target platform_system (e.g. Linux, Darwin, Windows)
    #[arg(long, value_name = "SYSTEM")]
    pub platform_system: Option<String>,

    /// Target platform_machine (e.g. x86_64, arm64)
    #[arg(long, value_name = "MACHINE")]
    pub platform_machine: Option<String>,

    /// Interpreter implementation (e.g. cpython, pypy)
    #[arg(long, value_name = "NAME")]
    pub implementation: Option<String>,

    /// Extra considered requested by `extra == '...'` markers (repeatable)
    #[arg(long = "extra", value_name = "EXTRA", action = ArgAction::Append)]
    pub extras: Vec<String>,

    // Policy
    /// Config file (default: reqlint.toml next to the first manifest)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Require an exact pin on every entry, overriding the config file
    #[arg(long)]
    pub strict: bool,

    /// Do not require exact pins
    #[arg(long)]
    pub allow_unpinned: bool,

    /// Disable a rule by code or name (repeatable)
    #[arg(long, value_name = "RULE", action = ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Exit with failure when warnings are found
    #[arg(long)]
    pub deny_warnings: bool,

    /// Check exact pins against the PyPI registry
    #[arg(long)]
    pub check_registry: bool,

    /// PyPI JSON API base URL (default: https://pypi.org/pypi)
    #[arg(long, value_name = "URL")]
    pub registry_url: Option<String>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - errors and summary only
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CliArgs {
    /// Rejects flag combinations that contradict each other
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiet && self.verbose {
            return Err(ConfigError::ConflictingOptions {
                message: "--quiet and --verbose cannot be used together".to_string(),
            });
        }
        if self.strict && self.allow_unpinned {
            return Err(ConfigError::ConflictingOptions {
                message: "--strict and --allow-unpinned cannot be used together".to_string(),
            });
        }
        Ok(())
    }

    /// Pin requirement forced from the command line, if any
    pub fn require_pins(&self) -> Option<bool> {
        if self.strict {
            Some(true)
        } else if self.allow_unpinned {
            Some(false)
        } else {
            None
        }
    }
}
