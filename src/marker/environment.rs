//! Target environment for marker evaluation

use pep440_rs::VersionParseError;
use pep508_rs::{MarkerEnvironment, MarkerEnvironmentBuilder};

/// Values of every marker variable for one target interpreter/platform
///
/// The default describes CPython 3.12 on Linux x86_64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnvironment {
    pub python_version: String,
    pub python_full_version: String,
    pub os_name: String,
    pub sys_platform: String,
    pub platform_release: String,
    pub platform_system: String,
    pub platform_version: String,
    pub platform_machine: String,
    pub platform_python_implementation: String,
    pub implementation_name: String,
    pub implementation_version: String,
}

impl Default for TargetEnvironment {
    fn default() -> Self {
        Self {
            python_version: "3.12".to_string(),
            python_full_version: "3.12.0".to_string(),
            os_name: "posix".to_string(),
            sys_platform: "linux".to_string(),
            platform_release: String::new(),
            platform_system: "Linux".to_string(),
            platform_version: String::new(),
            platform_machine: "x86_64".to_string(),
            platform_python_implementation: "CPython".to_string(),
            implementation_name: "cpython".to_string(),
            implementation_version: "3.12.0".to_string(),
        }
    }
}

impl TargetEnvironment {
    /// Builds the environment markers are evaluated against
    ///
    /// Fails when one of the version-valued fields is not a PEP 440 version.
    pub fn to_marker_environment(&self) -> Result<MarkerEnvironment, VersionParseError> {
        MarkerEnvironment::try_from(MarkerEnvironmentBuilder {
            implementation_name: &self.implementation_name,
            implementation_version: &self.implementation_version,
            os_name: &self.os_name,
            platform_machine: &self.platform_machine,
            platform_python_implementation: &self.platform_python_implementation,
            platform_release: &self.platform_release,
            platform_system: &self.platform_system,
            platform_version: &self.platform_version,
            python_full_version: &self.python_full_version,
            python_version: &self.python_version,
            sys_platform: &self.sys_platform,
        })
    }

    /// Sets the interpreter version from `X.Y` or `X.Y.Z` (builder pattern)
    ///
    /// Keeps `python_version`, `python_full_version` and, for CPython,
    /// `implementation_version` consistent with each other.
    pub fn with_python_version(mut self, version: &str) -> Self {
        let parts: Vec<&str> = version.trim().split('.').collect();
        let short = parts.iter().take(2).copied().collect::<Vec<_>>().join(".");
        let full = if parts.len() >= 3 {
            version.trim().to_string()
        } else if parts.len() == 2 {
            format!("{}.0", short)
        } else {
            format!("{}.0.0", short)
        };
        self.python_version = short;
        self.python_full_version = full.clone();
        if self.implementation_name == "cpython" {
            self.implementation_version = full;
        }
        self
    }

    /// Sets the platform from a `sys_platform` value (builder pattern)
    ///
    /// Derives `os_name` and `platform_system` for the common platforms.
    pub fn with_sys_platform(mut self, platform: &str) -> Self {
        self.sys_platform = platform.to_string();
        let (os_name, system) = match platform {
            "win32" | "cygwin" => ("nt", "Windows"),
            "darwin" => ("posix", "Darwin"),
            p if p.starts_with("linux") => ("posix", "Linux"),
            p if p.starts_with("freebsd") => ("posix", "FreeBSD"),
            _ => return self,
        };
        self.os_name = os_name.to_string();
        self.platform_system = system.to_string();
        self
    }

    /// Sets the interpreter implementation, e.g. `cpython` or `pypy` (builder pattern)
    pub fn with_implementation(mut self, name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        self.platform_python_implementation = match name.as_str() {
            "cpython" => "CPython".to_string(),
            "pypy" => "PyPy".to_string(),
            "graalpy" => "GraalVM".to_string(),
            other => other.to_string(),
        };
        self.implementation_name = name;
        self
    }
}
