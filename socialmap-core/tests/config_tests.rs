// Tests for tag configuration loading and scaffolding

use socialmap_core::config::{DEFAULT_TAG_FILES, TagConfig, domain_matches, read_domain_list, scaffold};
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Domain Matching Tests
// ============================================================================

#[test]
fn test_domain_matches() {
    assert!(domain_matches("indieweb.org", "indieweb.org", true));
    assert!(domain_matches("chat.indieweb.org", "indieweb.org", true));
    assert!(!domain_matches("chat.indieweb.org", "indieweb.org", false));
    assert!(!domain_matches("notindieweb.org", "indieweb.org", true));
    assert!(!domain_matches("indieweb.org.evil.com", "indieweb.org", true));
}

#[test]
fn test_no_subdomain_platforms() {
    let config = TagConfig::default()
        .with_category("tool", ["withknown.com", "example.net"])
        .with_no_subdomain("example.net");

    assert_eq!(config.matching_tags("withknown.com"), vec!["tool"]);
    assert!(config.matching_tags("alice.withknown.com").is_empty());
    assert!(config.matching_tags("bob.example.net").is_empty());
}

#[test]
fn test_server_aliases_and_tags() {
    let config = TagConfig::default()
        .with_server_alias("Hugo 0.20", "Hugo")
        .with_server_tag("Hugo");

    assert_eq!(config.canonical_server("Known https://withknown.com"), "Known");
    assert_eq!(config.canonical_server("Hugo 0.20"), "Hugo");
    assert_eq!(config.canonical_server("Jekyll"), "Jekyll");
    assert!(config.is_server_tag("WordPress"));
    assert!(config.is_server_tag("Hugo"));
    assert!(!config.is_server_tag("Jekyll"));
}

// ============================================================================
// Loading Tests
// ============================================================================

#[test]
fn test_read_domain_list_skips_comments() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "# header\na.com\n\n  b.com  \n#c.com\n").unwrap();

    assert_eq!(read_domain_list(&path).unwrap(), vec!["a.com", "b.com"]);
}

#[test]
fn test_load_reads_each_category() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("domains_founders.txt"), "tantek.com\naaronparecki.com\n").unwrap();
    fs::write(dir.path().join("domains_community.txt"), "indieweb.org\n").unwrap();

    let config = TagConfig::load(dir.path()).unwrap();

    assert_eq!(config.categories.len(), DEFAULT_TAG_FILES.len());
    assert_eq!(config.matching_tags("tantek.com"), vec!["founder"]);
    assert_eq!(config.matching_tags("chat.indieweb.org"), vec!["community"]);
    assert!(config.matching_tags("unknown.com").is_empty());
}

#[test]
fn test_load_from_missing_directory_is_empty() {
    let dir = TempDir::new().unwrap();

    let config = TagConfig::load(&dir.path().join("nope")).unwrap();

    assert!(config.categories.iter().all(|c| c.domains.is_empty()));
}

// ============================================================================
// Scaffold Tests
// ============================================================================

#[test]
fn test_scaffold_creates_every_list() {
    let dir = TempDir::new().unwrap();
    let tags_dir = dir.path().join("tags");

    let written = scaffold(&tags_dir, false).unwrap();

    assert_eq!(written.len(), DEFAULT_TAG_FILES.len());
    for (_, filename) in DEFAULT_TAG_FILES {
        let path = tags_dir.join(filename);
        assert!(path.is_file());
        assert!(read_domain_list(&path).unwrap().is_empty());
    }
}

#[test]
fn test_scaffold_keeps_existing_unless_forced() {
    let dir = TempDir::new().unwrap();
    let elders = dir.path().join("domains_elders.txt");
    fs::write(&elders, "elder.com\n").unwrap();

    let written = scaffold(dir.path(), false).unwrap();
    assert_eq!(written.len(), DEFAULT_TAG_FILES.len() - 1);
    assert_eq!(read_domain_list(&elders).unwrap(), vec!["elder.com"]);

    let written = scaffold(dir.path(), true).unwrap();
    assert_eq!(written.len(), DEFAULT_TAG_FILES.len());
    assert!(read_domain_list(&elders).unwrap().is_empty());
}
