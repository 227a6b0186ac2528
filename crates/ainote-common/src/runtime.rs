//! Version check for the external runtime that builds the extension.
use std::{fmt, process::Command, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(r"v?(\d+)\.(\d+)(?:\.(\d+))?").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Extract the first `major.minor[.patch]` occurrence in `text`.
    pub fn find(text: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(text)?;
        let part = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().parse::<u64>())
                .unwrap_or(Ok(0))
        };
        Some(Self {
            major: part(1).ok()?,
            minor: part(2).ok()?,
            patch: part(3).ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::find(s.trim()).ok_or_else(|| format!("invalid version: {s:?}"))
    }
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeRequirement {
    pub command: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    pub min_version: Version,
}

fn default_args() -> Vec<String> {
    vec!["--version".to_owned()]
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not find a version number in the output of `{command}`: {output:?}")]
    Unparsable { command: String, output: String },
    #[error("{command} {found} detected, {required} or higher is required")]
    Unsupported {
        command: String,
        found: Version,
        required: Version,
    },
}

/// Run the configured runtime and make sure it reports at least `min_version`.
pub fn check(requirement: &RuntimeRequirement) -> Result<Version, RuntimeError> {
    let output = Command::new(&requirement.command)
        .args(&requirement.args)
        .output()
        .map_err(|source| RuntimeError::Spawn {
            command: requirement.command.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!(
        "`{}` exited with {}: {}",
        requirement.command,
        output.status,
        stdout.trim()
    );

    let found = Version::find(&stdout)
        .or_else(|| Version::find(&stderr))
        .ok_or_else(|| RuntimeError::Unparsable {
            command: requirement.command.clone(),
            output: format!("{}{}", stdout, stderr).trim().to_owned(),
        })?;

    if found < requirement.min_version {
        return Err(RuntimeError::Unsupported {
            command: requirement.command.clone(),
            found,
            required: requirement.min_version,
        });
    }
    Ok(found)
}
