// Static tag and server configuration

use crate::error::{CoreError, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tag name and the file in the tags directory that lists its domains
pub const DEFAULT_TAG_FILES: &[(&str, &str)] = &[
    ("bridgy", "domains_bridgy_sent.txt"),
    ("community", "domains_community.txt"),
    ("elder", "domains_elders.txt"),
    ("founder", "domains_founders.txt"),
    ("IRC", "domains_irc_people.txt"),
    ("tool", "domains_tools.txt"),
    ("webmention.io", "domains_webmention.io.txt"),
];

/// Hosting platforms whose users' subdomains must not inherit the tag
pub const NO_SUBDOMAIN_DOMAINS: &[&str] = &["micro.blog", "withknown.com"];

/// Raw generator string -> canonical server name
pub const SERVER_ALIASES: &[(&str, &str)] = &[
    ("Known http://withknown.com", "Known"),
    ("Known https://withknown.com", "Known"),
];

/// Servers that are also emitted as tags
pub const SERVER_TAGS: &[&str] = &["Known", "WordPress"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCategory {
    pub tag: String,
    pub domains: Vec<String>,
}

/// Read-only configuration consulted while assembling site records
#[derive(Debug, Clone)]
pub struct TagConfig {
    pub categories: Vec<TagCategory>,
    pub no_subdomain: HashSet<String>,
    pub server_aliases: HashMap<String, String>,
    pub server_tags: HashSet<String>,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            no_subdomain: NO_SUBDOMAIN_DOMAINS.iter().map(|d| d.to_string()).collect(),
            server_aliases: SERVER_ALIASES
                .iter()
                .map(|(raw, name)| (raw.to_string(), name.to_string()))
                .collect(),
            server_tags: SERVER_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TagConfig {
    /// Load every default tag category from `dir`. A missing file leaves its
    /// category empty.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::default();
        for (tag, filename) in DEFAULT_TAG_FILES {
            let path = dir.join(filename);
            let domains = match read_domain_list(&path) {
                Ok(domains) => domains,
                Err(CoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    warn!("Tag list {} not found, '{}' will not be assigned", path.display(), tag);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            debug!("Loaded {} domains for tag '{}'", domains.len(), tag);
            config = config.with_category(tag, domains);
        }
        Ok(config)
    }

    /// Add domains to a tag category, creating it if needed
    pub fn with_category<I, S>(mut self, tag: &str, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domains = domains.into_iter().map(Into::into);
        match self.categories.iter_mut().find(|c| c.tag == tag) {
            Some(category) => category.domains.extend(domains),
            None => self.categories.push(TagCategory {
                tag: tag.to_string(),
                domains: domains.collect(),
            }),
        }
        self
    }

    pub fn with_no_subdomain(mut self, domain: &str) -> Self {
        self.no_subdomain.insert(domain.to_string());
        self
    }

    pub fn with_server_alias(mut self, generator: &str, server: &str) -> Self {
        self.server_aliases
            .insert(generator.to_string(), server.to_string());
        self
    }

    pub fn with_server_tag(mut self, server: &str) -> Self {
        self.server_tags.insert(server.to_string());
        self
    }

    /// Tags whose domain lists cover `domain`, in category order
    pub fn matching_tags(&self, domain: &str) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|category| {
                category.domains.iter().any(|listed| {
                    domain_matches(domain, listed, !self.no_subdomain.contains(listed))
                })
            })
            .map(|category| category.tag.as_str())
            .collect()
    }

    pub fn canonical_server<'a>(&'a self, generator: &'a str) -> &'a str {
        self.server_aliases
            .get(generator)
            .map(String::as_str)
            .unwrap_or(generator)
    }

    pub fn is_server_tag(&self, server: &str) -> bool {
        self.server_tags.contains(server)
    }
}

/// True if `domain` is `listed` or, when allowed, one of its subdomains
pub fn domain_matches(domain: &str, listed: &str, allow_subdomains: bool) -> bool {
    if domain == listed {
        return true;
    }
    allow_subdomains
        && domain
            .strip_suffix(listed)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Read a newline-delimited domain list. Blank lines and `#` comments are
/// skipped.
pub fn read_domain_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Create the tags directory with an empty list per default category.
///
/// Existing files are left alone unless `force` is set. Returns the files
/// that were written.
pub fn scaffold(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;

    let mut written = Vec::new();
    for (tag, filename) in DEFAULT_TAG_FILES {
        let path = dir.join(filename);
        if path.exists() && !force {
            debug!("Keeping existing {}", path.display());
            continue;
        }
        let header = format!(
            "# Domains tagged '{}', one per line. Subdomains match too.\n",
            tag
        );
        fs::write(&path, header).map_err(|e| CoreError::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}
