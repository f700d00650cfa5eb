// Tests for the end-to-end build pipeline

use serde_json::{Value, json};
use socialmap_core::config::TagConfig;
use socialmap_core::error::CoreError;
use socialmap_core::pipeline::{BuildInput, BuildOptions, build_views, execute_build};
use socialmap_graph::{GraphError, ProgressCallback, Stage};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn write_lines(path: &Path, records: &[Value]) {
    let content: String = records.iter().map(|r| format!("{}\n", r)).collect();
    fs::write(path, content).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn link(from: &str, to: &str, num: u64, class: &str) -> Value {
    json!({"from_domain": from, "to_domain": to, "num": num, "mf2_class": class})
}

// ============================================================================
// In-Memory Pipeline Tests
// ============================================================================

#[test]
fn test_build_views_in_memory() {
    let input = BuildInput {
        sites: vec![json!({"domain": "a.com"}), json!({"domain": "b.com"})],
        links: vec![link("a.com", "b.com", 3, "u-in-reply-to")],
        extras: Vec::new(),
    };

    let views = build_views(input, &TagConfig::default(), None, 500, None).unwrap();

    assert_eq!(views.full.len(), 2);
    assert_eq!(views.internal.len(), 2);
    let a = views.full[0].to_json().unwrap();
    assert_eq!(a["links"]["b.com"]["out"]["in-reply-to"], json!(3));
    assert_eq!(a["links"]["b.com"]["score"], json!(1.0));
    assert!(a["links"]["b.com"].get("in").is_none());
}

#[test]
fn test_repeated_site_keeps_last_record_in_every_view() {
    let input = BuildInput {
        sites: vec![
            json!({"domain": "a.com", "title": "first"}),
            json!({"domain": "a.com", "title": "second"}),
        ],
        links: Vec::new(),
        extras: Vec::new(),
    };

    let views = build_views(input, &TagConfig::default(), None, 500, None).unwrap();

    for view in [&views.full, &views.base, &views.internal] {
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].extra["title"], json!("second"));
    }
}

#[test]
fn test_empty_input_builds_empty_views() {
    let views = build_views(BuildInput::default(), &TagConfig::default(), None, 500, None).unwrap();

    assert!(views.full.is_empty());
    assert!(views.base.is_empty());
    assert!(views.internal.is_empty());
}

#[test]
fn test_unknown_mf2_class_aborts() {
    let input = BuildInput {
        sites: vec![json!({"domain": "a.com"})],
        links: vec![link("a.com", "b.com", 1, "u-mystery")],
        extras: Vec::new(),
    };

    let err = build_views(input, &TagConfig::default(), None, 500, None).unwrap_err();

    assert!(matches!(err, CoreError::Graph(GraphError::UnknownMf2Class(ref c)) if c == "mystery"));
}

#[test]
fn test_malformed_link_aborts() {
    let input = BuildInput {
        sites: Vec::new(),
        links: vec![json!({"from_domain": "a.com", "num": 1})],
        extras: Vec::new(),
    };

    let err = build_views(input, &TagConfig::default(), None, 500, None).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Graph(GraphError::MissingField { field: "to_domain", .. })
    ));
}

#[test]
fn test_explicit_internal_domains() {
    let input = BuildInput {
        sites: vec![json!({"domain": "a.com"}), json!({"domain": "b.com"})],
        links: vec![link("a.com", "b.com", 1, "other"), link("c.com", "a.com", 1, "other")],
        extras: Vec::new(),
    };
    let internal: HashSet<String> = ["a.com", "c.com"].iter().map(|s| s.to_string()).collect();

    let views = build_views(input, &TagConfig::default(), Some(&internal), 500, None).unwrap();

    let names: Vec<&str> = views.internal.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(names, vec!["a.com", "c.com"]);
    assert_eq!(
        views.internal[0].links.keys().collect::<Vec<_>>(),
        vec!["c.com"]
    );
}

#[test]
fn test_progress_callback_sees_stages() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = stages.clone();
    let callback: ProgressCallback = Arc::new(move |stage: Stage, _count: usize| {
        sink.lock().unwrap().push(stage);
    });
    let sites: Vec<Value> = (0..250).map(|i| json!({"domain": format!("s{}.com", i)})).collect();
    let input = BuildInput {
        sites,
        links: Vec::new(),
        extras: Vec::new(),
    };

    build_views(input, &TagConfig::default(), None, 500, Some(callback)).unwrap();

    let seen = stages.lock().unwrap();
    assert!(seen.contains(&Stage::Sites));
    assert!(seen.contains(&Stage::Base));
    assert!(seen.contains(&Stage::Internal));
}

// ============================================================================
// File Pipeline Tests
// ============================================================================

#[test]
fn test_execute_build_writes_three_views() {
    let dir = TempDir::new().unwrap();
    let sites = dir.path().join("sites.json");
    let links = dir.path().join("links.json");
    let extra = dir.path().join("extra.json");
    let out = dir.path().join("out");
    write_lines(
        &sites,
        &[
            json!({"domain": "a.com", "html": "<p>", "title": "A"}),
            json!({"domain": "b.com", "title": "B"}),
        ],
    );
    write_lines(
        &links,
        &[
            link("a.com", "b.com", 3, "u-like-of"),
            link("a.com", "c.com", 1, "other"),
            link("a.com", "d.com", 1, "other"),
            link("x.com", "a.com", 2, "u-repost-of"),
        ],
    );
    write_lines(&extra, &[json!({"domain": "b.com", "num_pages": "12"})]);

    let mut options = BuildOptions::new(sites, links, out.clone());
    options.extras = vec![extra];
    options.max_base_links = 2;
    let summary = execute_build(options, None).unwrap();

    assert_eq!(summary.link_records, 4);
    assert_eq!(summary.full, 3);
    assert_eq!(summary.base, 3);
    assert_eq!(summary.truncated, 1);
    assert_eq!(summary.internal, 2);

    let full_a = read_json(&out.join("full").join("a.com.json"));
    assert_eq!(full_a["title"], json!("A"));
    assert!(full_a.get("html").is_none());
    assert_eq!(full_a["links_out"], json!(5));
    assert_eq!(full_a["links_in"], json!(2));
    assert_eq!(full_a["links"].as_object().unwrap().len(), 4);

    let base_a = read_json(&out.join("base").join("a.com.json"));
    assert_eq!(base_a["links"].as_object().unwrap().len(), 2);
    assert_eq!(base_a["links_truncated"], json!(true));

    let full_b = read_json(&out.join("full").join("b.com.json"));
    assert_eq!(full_b["num_pages"], json!(12));

    assert!(out.join("full").join("x.com.json").is_file());
    assert!(!out.join("full").join("c.com.json").exists());
    assert!(!out.join("internal").join("x.com.json").exists());
    let internal_a = read_json(&out.join("internal").join("a.com.json"));
    assert_eq!(
        internal_a["links"].as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["b.com"]
    );
}

#[test]
fn test_execute_build_applies_tags() {
    let dir = TempDir::new().unwrap();
    let sites = dir.path().join("sites.json");
    let links = dir.path().join("links.json");
    let tags_dir = dir.path().join("tags");
    fs::create_dir_all(&tags_dir).unwrap();
    fs::write(tags_dir.join("domains_elders.txt"), "a.com\n").unwrap();
    write_lines(&sites, &[json!({"domain": "blog.a.com", "webmention_endpoints": ["https://blog.a.com/wm"]})]);
    fs::write(&links, "").unwrap();

    let mut options = BuildOptions::new(sites, links, dir.path().join("out"));
    options.tags = TagConfig::load(&tags_dir).unwrap();
    execute_build(options, None).unwrap();

    let record = read_json(&dir.path().join("out").join("full").join("blog.a.com.json"));
    assert_eq!(record["tags"], json!(["elder", "webmention"]));
    assert_eq!(record["links"], json!({}));
}

#[test]
fn test_execute_build_missing_input() {
    let dir = TempDir::new().unwrap();
    let options = BuildOptions::new(
        dir.path().join("absent-sites.json"),
        dir.path().join("absent-links.json"),
        dir.path().join("out"),
    );

    let err = execute_build(options, None).unwrap_err();

    assert!(matches!(err, CoreError::Io { .. }));
    assert!(!dir.path().join("out").exists());
}
