use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use apicheck_classpath::ClasspathProvider;
use apicheck_config::ApiCheckConfig;
use apicheck_core::ApiChecker;

#[derive(Parser)]
#[command(
    name = "apicheck",
    version,
    about = "Check that compiled classes expose the same API as their reference classes"
)]
struct Cli {
    /// Candidate classes by binary name (`Foo`, `pkg.Foo`); each is checked against the
    /// class with the reference marker prepended to its simple name
    classes: Vec<String>,

    /// Check every candidate that has a reference class on the classpath
    #[arg(long, conflicts_with = "classes")]
    all: bool,

    /// Class directory or jar to search; repeatable. Replaces the configured classpath
    #[arg(short = 'c', long = "classpath", value_name = "PATH")]
    classpath: Vec<PathBuf>,

    /// Config file (defaults to `apicheck.toml` in the current directory, if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Prefix identifying reference classes
    #[arg(long)]
    marker: Option<String>,

    /// Print only the final verdict
    #[arg(short, long)]
    quiet: bool,

    /// Log level or `EnvFilter` directives for stderr logging
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let (mut config, config_dir) = load_config(cli.config.as_deref())?;
    if let Some(marker) = cli.marker {
        config.naming.reference_marker = marker;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate().context("invalid command-line override")?;
    apicheck_config::init_tracing(&config.logging);

    let classpath = if cli.classpath.is_empty() {
        resolve_against(config_dir.as_deref(), &config.classpath)
    } else {
        cli.classpath
    };
    tracing::debug!(target: "apicheck.cli", ?classpath, "using classpath");

    let provider = ClasspathProvider::from_paths(classpath);
    let classes: Vec<String> = if cli.all {
        provider
            .discover_candidates(&config.naming.reference_marker)
            .context("failed to scan the classpath for reference classes")?
            .into_iter()
            .collect()
    } else {
        cli.classes
    };
    if classes.is_empty() {
        if cli.all {
            bail!(
                "no reference classes (prefix `{}`) found on the classpath",
                config.naming.reference_marker
            );
        }
        bail!("no classes to check; pass class names or --all");
    }

    let checker = ApiChecker::with_settings(provider, config.to_settings());
    let print = !cli.quiet;
    let report = checker.check_batch(&classes, print);

    if print {
        print!("{report}");
    } else {
        println!("{}", report.summary());
    }
    tracing::info!(
        target: "apicheck.cli",
        classes = classes.len(),
        passed = report.passed(),
        "finished API checks"
    );

    Ok(if report.passed() { 0 } else { 1 })
}

/// The effective config and the directory its relative classpath entries are relative to.
fn load_config(explicit: Option<&Path>) -> Result<(ApiCheckConfig, Option<PathBuf>)> {
    match explicit {
        Some(path) => {
            let config = ApiCheckConfig::load_from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, path.parent().map(Path::to_path_buf)))
        }
        None => {
            let cwd = std::env::current_dir().context("failed to read the current directory")?;
            let (config, path) = apicheck_config::load_for_dir(&cwd)
                .context("failed to load apicheck.toml")?;
            Ok((config, path.and_then(|p| p.parent().map(Path::to_path_buf))))
        }
    }
}

fn resolve_against(base: Option<&Path>, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|path| match base {
            Some(base) if path.is_relative() && !base.as_os_str().is_empty() => base.join(path),
            _ => path.clone(),
        })
        .collect()
}
