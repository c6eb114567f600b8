//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use mirror_core::{CopyFailurePolicy, PathCaseChoice};

/// Folder Mirror - Keep a replica folder identical to a source folder
///
/// Runs a synchronization pass every INTERVAL seconds until interrupted.
/// Every change made to the replica is written to the console and to the
/// log file.
///
/// Examples:
///   mirror --source ./data --replica /backup/data --interval 30 --log mirror.log
///   mirror --config mirror.toml --once
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder treated as ground truth
    #[arg(short, long, env = "MIRROR_SOURCE")]
    pub source: Option<PathBuf>,

    /// Folder kept identical to the source
    #[arg(short, long, env = "MIRROR_REPLICA")]
    pub replica: Option<PathBuf>,

    /// Seconds to wait between the end of one pass and the start of the next
    #[arg(short, long, env = "MIRROR_INTERVAL", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Log file; lines are appended
    #[arg(short, long, env = "MIRROR_LOG")]
    pub log: Option<PathBuf>,

    /// Config file (TOML, JSON or YAML); command-line values take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Path comparison: auto, sensitive or insensitive
    #[arg(long, value_name = "CASE")]
    pub path_case: Option<PathCaseChoice>,

    /// What a failed copy does: report (continue) or abort (fail the pass)
    #[arg(long, value_name = "POLICY")]
    pub copy_failures: Option<CopyFailurePolicy>,

    /// Modification times closer than this are treated as equal
    #[arg(long, value_name = "MS")]
    pub mtime_tolerance_ms: Option<u64>,

    /// Enable verbose output, including unchanged files
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable coloured console output
    #[arg(long)]
    pub no_color: bool,
}
