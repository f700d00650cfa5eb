use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use socialmap_core::config::{self, DEFAULT_TAG_FILES, TagConfig};
use socialmap_core::pipeline::{BuildOptions, BuildSummary, execute_build};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_TAGS_DIR: &str = "~/.config/socialmap/tags/";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// level.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Expand a leading `~` to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load the domain set for the internal view
pub fn load_internal_domains(path: &Path) -> Result<HashSet<String>> {
    let domains = config::read_domain_list(path)
        .with_context(|| format!("Failed to read internal domain list {}", path.display()))?;
    Ok(domains.into_iter().collect())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Turn `build` arguments into pipeline options
pub fn build_options(args: &ArgMatches, quiet: bool) -> Result<BuildOptions> {
    let sites = args
        .get_one::<PathBuf>("SITES")
        .context("SITES is required")?
        .clone();
    let links = args
        .get_one::<PathBuf>("LINKS")
        .context("LINKS is required")?
        .clone();
    let extras: Vec<PathBuf> = args
        .get_many::<PathBuf>("EXTRA")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    let output_dir = args
        .get_one::<String>("output")
        .map(|dir| expand_path(dir))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let tags_dir = expand_path(
        args.get_one::<String>("tags")
            .map(String::as_str)
            .unwrap_or(DEFAULT_TAGS_DIR),
    );

    let tags = TagConfig::load(&tags_dir)
        .with_context(|| format!("Failed to load tag lists from {}", tags_dir.display()))?;
    info!("Using tag lists from {}", tags_dir.display());
    let internal_domains = args
        .get_one::<PathBuf>("internal")
        .map(|path| load_internal_domains(path))
        .transpose()?;

    let mut options = BuildOptions::new(sites, links, output_dir);
    options.extras = extras;
    options.tags = tags;
    options.internal_domains = internal_domains;
    if let Some(max) = args.get_one::<usize>("max-base-links") {
        options.max_base_links = *max;
    }
    options.show_progress_bars = !quiet;
    Ok(options)
}

pub fn run_build(args: &ArgMatches, quiet: bool) -> Result<BuildSummary> {
    let options = build_options(args, quiet)?;
    execute_build(options, None).context("Build failed")
}

pub fn handle_build(args: &ArgMatches, quiet: bool) {
    let summary = match run_build(args, quiet) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if quiet {
        return;
    }

    println!();
    print_divider();
    println!("{}", "  BUILD COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Link records: {}",
        "✓".green().bold(),
        summary.link_records.to_string().cyan()
    );
    println!(
        "{} Full view: {} records",
        "✓".green().bold(),
        summary.full.to_string().cyan()
    );
    println!(
        "{} Base view: {} records ({} truncated)",
        "✓".green().bold(),
        summary.base.to_string().cyan(),
        summary.truncated.to_string().yellow()
    );
    println!(
        "{} Internal view: {} records",
        "✓".green().bold(),
        summary.internal.to_string().cyan()
    );
    println!(
        "{} Output: {}",
        "→".blue(),
        summary.output_dir.display().to_string().bright_white()
    );
    println!();
}

/// Scaffold the tag directory. Returns the directory and the files written.
pub fn run_init(args: &ArgMatches) -> Result<(PathBuf, Vec<PathBuf>)> {
    let tags_dir = expand_path(
        args.get_one::<String>("PATH")
            .map(String::as_str)
            .unwrap_or(DEFAULT_TAGS_DIR),
    );
    let force = args.get_flag("force");

    let written = config::scaffold(&tags_dir, force)
        .with_context(|| format!("Failed to create tag lists in {}", tags_dir.display()))?;
    Ok((tags_dir, written))
}

pub fn handle_init(args: &ArgMatches) {
    print_divider();
    println!("{}", "  SOCIALMAP INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let (tags_dir, written) = match run_init(args) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "{} Target: {}",
        "→".blue(),
        tags_dir.display().to_string().bright_white()
    );
    for path in &written {
        println!(
            "  {} {}",
            "✓".green(),
            path.display().to_string().bright_white()
        );
    }

    let kept = DEFAULT_TAG_FILES.len() - written.len();
    if kept > 0 {
        println!();
        println!(
            "{} Kept {} existing list(s); use --force to overwrite",
            "⚠".yellow().bold(),
            kept
        );
    }

    println!();
    println!(
        "{} Add one domain per line to each list, then run {}",
        "ℹ".blue(),
        "socialmap build".bright_cyan()
    );
    println!();
}
