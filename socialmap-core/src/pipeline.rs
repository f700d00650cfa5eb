use crate::assemble::SiteAssembler;
use crate::config::TagConfig;
use crate::error::Result;
use crate::io::{for_each_record, read_records, write_view};
use crate::views::{MAX_BASE_LINKS, ViewGenerator, Views};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use socialmap_graph::{LinkAggregator, LinkGraph, ProgressCallback, ScoreComputer, Stage};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Options for configuring a build
pub struct BuildOptions {
    pub sites: PathBuf,
    pub links: PathBuf,
    pub extras: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub tags: TagConfig,
    /// Domains for the internal view; defaults to the base site domains
    pub internal_domains: Option<HashSet<String>>,
    pub max_base_links: usize,
    pub show_progress_bars: bool,
}

impl BuildOptions {
    pub fn new(sites: PathBuf, links: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            sites,
            links,
            extras: Vec::new(),
            output_dir,
            tags: TagConfig::default(),
            internal_domains: None,
            max_base_links: MAX_BASE_LINKS,
            show_progress_bars: false,
        }
    }
}

/// In-memory inputs for [`build_views`]
#[derive(Debug, Clone, Default)]
pub struct BuildInput {
    pub sites: Vec<Value>,
    pub links: Vec<Value>,
    pub extras: Vec<Vec<Value>>,
}

/// Counts reported after a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub link_records: usize,
    pub full: usize,
    pub base: usize,
    pub truncated: usize,
    pub internal: usize,
    pub output_dir: PathBuf,
}

/// Domains named by the base site records
pub fn site_domains(sites: &[Value]) -> HashSet<String> {
    sites
        .iter()
        .filter_map(|site| site.get("domain").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Run the whole pipeline on in-memory inputs
pub fn build_views(
    input: BuildInput,
    tags: &TagConfig,
    internal_domains: Option<&HashSet<String>>,
    max_base_links: usize,
    progress_callback: Option<ProgressCallback>,
) -> Result<Views> {
    let BuildInput {
        sites,
        links,
        extras,
    } = input;

    let mut aggregator = LinkAggregator::new();
    if let Some(ref cb) = progress_callback {
        aggregator = aggregator.with_progress_callback(cb.clone());
    }
    for record in links {
        aggregator.push_record(record)?;
    }

    finish_views(
        aggregator.finish(),
        sites,
        &extras,
        tags,
        internal_domains,
        max_base_links,
        progress_callback,
    )
}

fn finish_views(
    graph: LinkGraph,
    sites: Vec<Value>,
    extras: &[Vec<Value>],
    tags: &TagConfig,
    internal_domains: Option<&HashSet<String>>,
    max_base_links: usize,
    progress_callback: Option<ProgressCallback>,
) -> Result<Views> {
    let default_internal;
    let internal_domains = match internal_domains {
        Some(domains) => domains,
        None => {
            default_internal = site_domains(&sites);
            &default_internal
        }
    };

    let mut scorer = ScoreComputer::new();
    let mut assembler = SiteAssembler::new(tags);
    let mut generator = ViewGenerator::new().with_max_links(max_base_links);
    if let Some(cb) = progress_callback {
        scorer = scorer.with_progress_callback(cb.clone());
        assembler = assembler.with_progress_callback(cb.clone());
        generator = generator.with_progress_callback(cb);
    }

    let scored = scorer.score(graph)?;
    let full = assembler.assemble(sites, &scored, extras)?;
    Ok(generator.generate(full, internal_domains))
}

/// Execute a build: read inputs, run the pipeline and write the `full`,
/// `base` and `internal` trees under the output directory
pub fn execute_build(
    options: BuildOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<BuildSummary> {
    let BuildOptions {
        sites,
        links,
        extras,
        output_dir,
        tags,
        internal_domains,
        max_base_links,
        show_progress_bars,
    } = options;

    // Single spinner for overall progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Loading sites...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let stage_callback: Option<ProgressCallback> = match (&progress_bar, progress_callback) {
        (Some(pb), outer) => {
            let pb = pb.clone();
            Some(Arc::new(move |stage: Stage, count: usize| {
                pb.set_message(format!("{}... {} processed", stage, count));
                pb.tick();
                if let Some(ref cb) = outer {
                    cb(stage, count);
                }
            }))
        }
        (None, outer) => outer,
    };
    let set_message = |msg: &str| {
        if let Some(ref pb) = progress_bar {
            pb.set_message(msg.to_string());
        }
    };

    let site_records = read_records(&sites)?;
    let extra_records = extras
        .iter()
        .map(|path| read_records(path))
        .collect::<Result<Vec<_>>>()?;

    set_message("Processing links...");
    info!("Loading {}", links.display());
    let mut aggregator = LinkAggregator::new();
    if let Some(ref cb) = stage_callback {
        aggregator = aggregator.with_progress_callback(cb.clone());
    }
    for_each_record(&links, |record| Ok(aggregator.push_record(record)?))?;
    let link_records = aggregator.processed();

    set_message("Scoring and assembling sites...");
    let views = finish_views(
        aggregator.finish(),
        site_records,
        &extra_records,
        &tags,
        internal_domains.as_ref(),
        max_base_links,
        stage_callback.clone(),
    )?;

    set_message("Writing output...");
    write_view(&output_dir.join("full"), &views.full)?;
    write_view(&output_dir.join("base"), &views.base)?;
    write_view(&output_dir.join("internal"), &views.internal)?;
    if let Some(ref cb) = stage_callback {
        cb(Stage::Writing, views.full.len() + views.base.len() + views.internal.len());
    }

    let summary = BuildSummary {
        link_records,
        full: views.full.len(),
        base: views.base.len(),
        truncated: views.base.iter().filter(|site| site.is_truncated()).count(),
        internal: views.internal.len(),
        output_dir,
    };

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Build complete! {} sites written", summary.full));
    }

    Ok(summary)
}
