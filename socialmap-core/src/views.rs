// Derived views of the full site records

use crate::site::SiteRecord;
use socialmap_graph::progress::checkpoint;
use socialmap_graph::{ProgressCallback, Stage};
use std::collections::HashSet;
use tracing::info;

/// Cap on the number of link domains per record in the base view
pub const MAX_BASE_LINKS: usize = 500;

/// Report view progress every this many records
pub const VIEW_PROGRESS_INTERVAL: usize = 100;

/// The three output record sets
#[derive(Debug, Clone, Default)]
pub struct Views {
    pub full: Vec<SiteRecord>,
    pub base: Vec<SiteRecord>,
    pub internal: Vec<SiteRecord>,
}

pub struct ViewGenerator {
    max_links: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Default for ViewGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewGenerator {
    pub fn new() -> Self {
        Self {
            max_links: MAX_BASE_LINKS,
            progress_callback: None,
        }
    }

    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Copy of `full` with each record's links capped at `max_links`
    pub fn base(&self, full: &[SiteRecord]) -> Vec<SiteRecord> {
        let mut truncated = 0;
        let base: Vec<SiteRecord> = full
            .iter()
            .enumerate()
            .map(|(i, site)| {
                let mut site = site.clone();
                if cap_links(&mut site, self.max_links) {
                    truncated += 1;
                }
                checkpoint(
                    self.progress_callback.as_ref(),
                    Stage::Base,
                    i + 1,
                    VIEW_PROGRESS_INTERVAL,
                );
                site
            })
            .collect();

        info!(
            "Generated base view: {} records, {} truncated to {} links",
            base.len(),
            truncated,
            self.max_links
        );
        base
    }

    /// Records for internal domains only, with links to internal domains only
    pub fn internal(&self, full: &[SiteRecord], domains: &HashSet<String>) -> Vec<SiteRecord> {
        let internal: Vec<SiteRecord> = full
            .iter()
            .filter(|site| domains.contains(&site.domain))
            .enumerate()
            .map(|(i, site)| {
                let mut site = site.clone();
                site.links.retain(|target, _| domains.contains(target));
                checkpoint(
                    self.progress_callback.as_ref(),
                    Stage::Internal,
                    i + 1,
                    VIEW_PROGRESS_INTERVAL,
                );
                site
            })
            .collect();

        info!(
            "Generated internal view: {} of {} records",
            internal.len(),
            full.len()
        );
        internal
    }

    pub fn generate(&self, full: Vec<SiteRecord>, internal_domains: &HashSet<String>) -> Views {
        let base = self.base(&full);
        let internal = self.internal(&full, internal_domains);
        Views {
            full,
            base,
            internal,
        }
    }
}

/// Keep the first `max_links` (already score-ordered) links. Returns whether
/// anything was dropped.
pub fn cap_links(site: &mut SiteRecord, max_links: usize) -> bool {
    if site.links.len() <= max_links {
        return false;
    }
    site.links.truncate(max_links);
    site.links_truncated = Some(true);
    true
}
