//! Run configuration
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. `reqlint.toml` (next to the first manifest, or `--config`)
//! 3. Command-line flags

use crate::cli::CliArgs;
use crate::domain::Rule;
use crate::error::ConfigError;
use crate::lint::LintPolicy;
use crate::marker::{ExtraName, TargetEnvironment};
use pep440_rs::Version;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name looked up next to the first manifest
pub const CONFIG_FILE_NAME: &str = "reqlint.toml";

/// Default number of concurrent registry requests
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Contents of `reqlint.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub require_pins: Option<bool>,
    pub allow_unpinned: Vec<String>,
    /// Rule codes or names
    pub ignore: Vec<String>,
    pub extras: Vec<String>,
    pub deny_warnings: Option<bool>,
    pub check_registry: Option<bool>,
    pub concurrency: Option<usize>,
    /// PyPI JSON API base URL, for mirrors
    pub registry_url: Option<String>,
    pub environment: EnvironmentOverrides,
}

/// `[environment]` table; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentOverrides {
    pub python_version: Option<String>,
    pub python_full_version: Option<String>,
    pub os_name: Option<String>,
    pub sys_platform: Option<String>,
    pub platform_release: Option<String>,
    pub platform_system: Option<String>,
    pub platform_version: Option<String>,
    pub platform_machine: Option<String>,
    pub platform_python_implementation: Option<String>,
    pub implementation_name: Option<String>,
    pub implementation_version: Option<String>,
    /// Shorthand that sets the implementation name and platform_python_implementation
    pub implementation: Option<String>,
}

impl EnvironmentOverrides {
    /// Overlay `other` on top of `self`
    fn merge(mut self, other: EnvironmentOverrides) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            python_version,
            python_full_version,
            os_name,
            sys_platform,
            platform_release,
            platform_system,
            platform_version,
            platform_machine,
            platform_python_implementation,
            implementation_name,
            implementation_version,
            implementation
        );
        self
    }

    /// Apply the overrides to the default environment
    ///
    /// Derived values are applied first so explicit keys win: the
    /// implementation and `sys_platform` set related fields, then
    /// `python_version` sets the full version, then every explicit key.
    pub fn apply(&self, base: TargetEnvironment) -> Result<TargetEnvironment, ConfigError> {
        let mut env = base;

        if let Some(name) = &self.implementation {
            env = env.with_implementation(name);
        }
        if let Some(platform) = &self.sys_platform {
            env = env.with_sys_platform(platform);
        }
        if let Some(version) = &self.python_version {
            validate_version("python_version", version)?;
            env = env.with_python_version(version);
        }
        if let Some(version) = &self.python_full_version {
            validate_version("python_full_version", version)?;
            env.python_full_version = version.clone();
            if env.implementation_name == "cpython" {
                env.implementation_version = version.clone();
            }
        }

        if let Some(version) = &self.implementation_version {
            validate_version("implementation_version", version)?;
        }

        let explicit = [
            (&self.os_name, &mut env.os_name),
            (&self.platform_release, &mut env.platform_release),
            (&self.platform_system, &mut env.platform_system),
            (&self.platform_version, &mut env.platform_version),
            (&self.platform_machine, &mut env.platform_machine),
            (
                &self.platform_python_implementation,
                &mut env.platform_python_implementation,
            ),
            (&self.implementation_name, &mut env.implementation_name),
            (&self.implementation_version, &mut env.implementation_version),
        ];
        for (value, slot) in explicit {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        Ok(env)
    }
}

fn validate_version(field: &str, value: &str) -> Result<(), ConfigError> {
    Version::from_str(value.trim())
        .map(|_| ())
        .map_err(|e| ConfigError::invalid_environment(field, value, e.to_string()))
}

impl FileConfig {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse config file content
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }

    /// Look for `reqlint.toml` beside the first manifest path
    pub fn discover(first_path: &Path) -> Option<PathBuf> {
        let dir = if first_path.is_dir() {
            first_path
        } else {
            first_path.parent().unwrap_or_else(|| Path::new(""))
        };
        let candidate = if dir.as_os_str().is_empty() {
            PathBuf::from(CONFIG_FILE_NAME)
        } else {
            dir.join(CONFIG_FILE_NAME)
        };
        candidate.is_file().then_some(candidate)
    }
}

/// Parse rule identifiers (codes or names)
pub fn parse_rules(values: &[String]) -> Result<Vec<Rule>, ConfigError> {
    values
        .iter()
        .map(|v| Rule::from_str(v).map_err(|value| ConfigError::UnknownRule { value }))
        .collect()
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub paths: Vec<PathBuf>,
    pub policy: LintPolicy,
    pub environment: TargetEnvironment,
    pub check_registry: bool,
    pub concurrency: usize,
    /// Custom PyPI base URL
    pub registry_url: Option<String>,
    /// Config file that was applied, if any
    pub config_file: Option<PathBuf>,
}

impl RunConfig {
    /// Resolve CLI flags on top of the config file on top of defaults
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        args.validate()?;

        let config_file = match &args.config {
            Some(path) => Some(path.clone()),
            None => args.paths.first().and_then(|p| FileConfig::discover(p)),
        };
        let file = match &config_file {
            Some(path) => {
                tracing::debug!("using config file {}", path.display());
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };

        Self::from_layers(args, file, config_file)
    }

    /// Combine an already-loaded config file with CLI flags
    pub fn from_layers(
        args: &CliArgs,
        file: FileConfig,
        config_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut ignore = parse_rules(&file.ignore)?;
        ignore.extend(parse_rules(&args.ignore)?);

        let mut extras = file.extras.clone();
        extras.extend(args.extras.iter().cloned());
        for extra in &extras {
            if let Err(e) = ExtraName::from_str(extra) {
                return Err(ConfigError::invalid_environment("extra", extra, e.to_string()));
            }
        }

        let defaults = LintPolicy::default();
        let policy = LintPolicy {
            require_pins: args
                .require_pins()
                .or(file.require_pins)
                .unwrap_or(defaults.require_pins),
            extras,
            deny_warnings: args.deny_warnings || file.deny_warnings.unwrap_or(false),
            ..defaults
        }
        .with_allow_unpinned(&file.allow_unpinned)
        .with_ignored(ignore);

        let cli_env = EnvironmentOverrides {
            python_version: args.python_version.clone(),
            python_full_version: args.python_full_version.clone(),
            sys_platform: args.sys_platform.clone(),
            platform_system: args.platform_system.clone(),
            platform_machine: args.platform_machine.clone(),
            implementation: args.implementation.clone(),
            ..EnvironmentOverrides::default()
        };
        let environment = file
            .environment
            .merge(cli_env)
            .apply(TargetEnvironment::default())?;

        let concurrency = file.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);

        Ok(Self {
            paths: args.paths.clone(),
            policy,
            environment,
            check_registry: args.check_registry || file.check_registry.unwrap_or(false),
            concurrency,
            registry_url: args.registry_url.clone().or(file.registry_url),
            config_file,
        })
    }
}
