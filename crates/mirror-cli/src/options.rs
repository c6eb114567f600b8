//! Merging command-line values with the optional config file

use std::path::{Path, PathBuf};
use std::time::Duration;

use mirror_core::{FileConfig, PathCaseChoice, SyncSettings};
use mirror_fs::ConfigStore;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Everything `main` needs to start the loop
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings: SyncSettings,
    pub log: PathBuf,
    pub once: bool,
}

impl RunOptions {
    /// Resolve options from the parsed command line, reading `--config` if
    /// given. Relative paths are resolved against `cwd`.
    pub fn from_cli(cli: &Cli, cwd: &Path) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => ConfigStore::new().load(&absolute(cwd, path))?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file, cwd)
    }

    /// Command-line values win; the config file fills the gaps.
    pub fn merge(cli: &Cli, file: FileConfig, cwd: &Path) -> Result<Self> {
        let source = required(cli.source.clone().or(file.source), "--source", "source")?;
        let replica = required(cli.replica.clone().or(file.replica), "--replica", "replica")?;
        let interval = required(cli.interval.or(file.interval_secs), "--interval", "interval_secs")?;
        let log = required(cli.log.clone().or(file.log), "--log", "log")?;

        let path_case = cli.path_case.or(file.path_case).unwrap_or(PathCaseChoice::Auto);
        let copy_failures = cli.copy_failures.or(file.copy_failures).unwrap_or_default();

        let mut settings = SyncSettings::new(absolute(cwd, &source), absolute(cwd, &replica))
            .with_interval(Duration::from_secs(interval))
            .with_path_case(path_case.resolve())
            .with_copy_failures(copy_failures);
        if let Some(ms) = cli.mtime_tolerance_ms.or(file.mtime_tolerance_ms) {
            settings = settings.with_mtime_tolerance(Duration::from_millis(ms));
        }

        Ok(Self {
            settings,
            log: absolute(cwd, &log),
            once: cli.once,
        })
    }
}

fn required<T>(value: Option<T>, flag: &str, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        CliError::user(format!(
            "missing {flag} (set it on the command line, in the environment, or as `{key}` in the config file)"
        ))
    })
}

/// Canonical form of an existing path, or `path` joined onto `cwd`.
fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    dunce::canonicalize(&joined).unwrap_or(joined)
}
