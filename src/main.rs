use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use modscore::cli::{Cli, Commands};
use modscore::config::{load_config, ModscoreConfig};
use modscore::features::{load_catalog, FeatureDetector, FeatureReport};
use modscore::io::{render_feature_warnings, render_score_table, ArtifactWriter, FixAction};
use modscore::metrics::SourceTreeScanner;
use modscore::modules::{ModuleTopography, ProjectManifest};
use modscore::pipeline::run_analysis;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "MODSCORE_LOG";

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("modscore={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Analyze {
            manifest,
            output,
            catalog,
            config,
            auto_fix,
            fail_on_unused,
            top,
            jobs,
            no_parallel,
            exclude_generated,
        } => {
            let mut settings = load_config(config.as_deref())?;
            apply_analyze_flags(
                &mut settings,
                AnalyzeFlags {
                    auto_fix,
                    fail_on_unused,
                    jobs,
                    no_parallel,
                    exclude_generated,
                },
            );
            handle_analyze(&manifest, &output, catalog.as_deref(), &settings, top)
        }
        Commands::Loc { dir, generated } => handle_loc(&dir, generated.as_deref()),
        Commands::Features {
            module_dir,
            enable,
            plugins,
            catalog,
        } => handle_features(module_dir, enable, plugins, catalog.as_deref()),
    }
}

struct AnalyzeFlags {
    auto_fix: bool,
    fail_on_unused: bool,
    jobs: Option<usize>,
    no_parallel: bool,
    exclude_generated: bool,
}

/// CLI flags win over file settings, but only when given
fn apply_analyze_flags(config: &mut ModscoreConfig, flags: AnalyzeFlags) {
    config.features.auto_fix |= flags.auto_fix;
    config.features.fail_on_unused |= flags.fail_on_unused;
    if let Some(jobs) = flags.jobs {
        config.parallel.jobs = jobs;
    }
    if flags.no_parallel {
        config.parallel.enabled = false;
    }
    if flags.exclude_generated {
        config.scoring.include_generated = false;
    }
}

fn handle_analyze(
    manifest_path: &Path,
    out_dir: &Path,
    catalog_path: Option<&Path>,
    config: &ModscoreConfig,
    top: usize,
) -> Result<()> {
    let catalog = load_catalog(catalog_path).context("loading feature catalog")?;
    let manifest = ProjectManifest::load(manifest_path)?;
    let output = run_analysis(&manifest, &catalog, config)?;

    let actions = ArtifactWriter::new(out_dir, config.features.auto_fix)
        .write_all(&output)
        .with_context(|| format!("writing artifacts to {}", out_dir.display()))?;

    eprint!("{}", render_feature_warnings(&output));
    for action in &actions {
        match action {
            FixAction::InPlace(path) => eprintln!("{} {}", "fixed:".green().bold(), path.display()),
            FixAction::Emitted(path) => {
                eprintln!("{} {}", "suggested fix:".cyan().bold(), path.display())
            }
            FixAction::Unchanged => {}
        }
    }

    println!("{}", render_score_table(&output.aggregate, top));
    output.enforce_feature_policy(config.features.fail_on_unused)?;
    Ok(())
}

fn handle_loc(dir: &Path, generated: Option<&Path>) -> Result<()> {
    let report = SourceTreeScanner::default().scan_module(dir, generated);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn handle_features(
    module_dir: PathBuf,
    enable: Vec<String>,
    plugins: Vec<String>,
    catalog_path: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(catalog_path).context("loading feature catalog")?;
    let name = module_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| module_dir.display().to_string());
    let topography = ModuleTopography {
        gradle_path: format!(":{}", name),
        name,
        features: enable.into_iter().collect(),
        plugins: plugins.into_iter().collect(),
    };

    let unused = FeatureDetector::new(&catalog).unused_features(&module_dir, &topography);
    let report = FeatureReport::new(topography.gradle_path.clone(), &unused);
    if report.is_empty() {
        println!("All enabled features are in use.");
    } else {
        print!("{}", report.render());
    }
    Ok(())
}
