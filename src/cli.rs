use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modscore")]
#[command(about = "Module health scoring for multi-module Kotlin/Java builds", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    ///
    /// MODSCORE_LOG overrides this with a full filter directive.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every module in a project manifest and report unused features
    Analyze {
        /// Project manifest (JSON) describing the modules
        manifest: PathBuf,

        /// Directory for JSON artifacts
        #[arg(short, long, default_value = "build/modscore")]
        output: PathBuf,

        /// Feature catalog override document (JSON)
        #[arg(long, env = "MODSCORE_CATALOG")]
        catalog: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .modscore.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rewrite build files in place to remove unused features
        #[arg(long = "auto-fix")]
        auto_fix: bool,

        /// Exit with an error when any module enables an unused feature
        #[arg(long = "fail-on-unused")]
        fail_on_unused: bool,

        /// Show only the top N modules
        #[arg(long = "top", default_value = "20")]
        top: usize,

        /// Number of worker threads (0 = one per CPU)
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,

        /// Process modules on a single thread
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Leave generated sources out of module size
        #[arg(long = "exclude-generated")]
        exclude_generated: bool,
    },

    /// Print line counts for a source tree as JSON
    Loc {
        /// Hand-written sources root
        dir: PathBuf,

        /// Generated sources root
        #[arg(long)]
        generated: Option<PathBuf>,
    },

    /// Check which enabled features a single module does not use
    Features {
        /// Module directory
        module_dir: PathBuf,

        /// Enabled feature name (repeatable)
        #[arg(long = "enable", required = true)]
        enable: Vec<String>,

        /// Applied plugin identifier (repeatable)
        #[arg(long = "plugin")]
        plugins: Vec<String>,

        /// Feature catalog override document (JSON)
        #[arg(long, env = "MODSCORE_CATALOG")]
        catalog: Option<PathBuf>,
    },
}
