//! On-disk configuration file

use std::path::PathBuf;
use std::str::FromStr;

use mirror_fs::PathCase;
use serde::Deserialize;

use super::settings::CopyFailurePolicy;

/// Case policy as written in a config file or on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCaseChoice {
    /// Follow the platform's usual filesystem
    #[default]
    Auto,
    Sensitive,
    Insensitive,
}

impl PathCaseChoice {
    pub fn resolve(self) -> PathCase {
        match self {
            Self::Auto => PathCase::platform_default(),
            Self::Sensitive => PathCase::Sensitive,
            Self::Insensitive => PathCase::Insensitive,
        }
    }
}

impl FromStr for PathCaseChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sensitive" => Ok(Self::Sensitive),
            "insensitive" => Ok(Self::Insensitive),
            other => Err(format!(
                "unknown path case '{other}' (expected auto, sensitive or insensitive)"
            )),
        }
    }
}

/// Contents of a config file.
///
/// Every field is optional; command-line values take precedence over
/// anything set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub replica: Option<PathBuf>,
    pub interval_secs: Option<u64>,
    pub log: Option<PathBuf>,
    pub path_case: Option<PathCaseChoice>,
    pub copy_failures: Option<CopyFailurePolicy>,
    pub mtime_tolerance_ms: Option<u64>,
}
