//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for the content server and drive
//! discovery, resolution, and harvesting end-to-end against a temp directory.

use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use transcript_harvester::config::{Config, OutputConfig, SourceConfig, WorkerConfig};
use transcript_harvester::payload::{NextDataExtractor, PayloadExtractor};
use transcript_harvester::pipeline::{Pipeline, ResolvedManifestEntry};
use transcript_harvester::{Outcome, OutcomeKind};
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILTER: &str = "/api/server/audio/filter";
const SERIES_FILTER: &str = "/api/server/audio/series-filter";

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, partitions: &[&str], root: &Path) -> Config {
    Config {
        source: SourceConfig {
            base_url: base_url.to_string(),
            corpus_language: "hindi".to_string(),
            partitions: partitions.iter().map(|p| p.to_string()).collect(),
            timeout_secs: 1,
            ..SourceConfig::default()
        },
        workers: WorkerConfig {
            discovery: 2,
            resolution: 2,
            fetch: 4,
        },
        output: OutputConfig {
            root_dir: root.to_string_lossy().into_owned(),
            extension: "txt".to_string(),
        },
    }
}

/// Wraps a page payload the way the content server embeds it
fn html_with_payload(page_data: Value) -> String {
    let payload = json!({ "props": { "pageProps": { "data": { "pageData": page_data } } } });
    format!(
        r#"<html><head><title>page</title></head><body><div id="__next"></div><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
        payload
    )
}

/// Extractor that panics on pages containing a trigger word
struct PanicOnWord(&'static str);

impl PayloadExtractor for PanicOnWord {
    fn extract(&self, page: &str) -> Option<Value> {
        if page.contains(self.0) {
            panic!("extractor cannot handle page");
        }
        NextDataExtractor.extract(page)
    }
}

fn collection_page_with_total(category_id: &str, total: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(html_with_payload(json!({
        "categoryData": { "_id": category_id },
        "total": total
    })))
}

fn collection_page(category_id: &str, total: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(html_with_payload(json!({
        "categoryData": { "_id": category_id },
        "total": total
    })))
}

fn item_page(title: &str, description: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(html_with_payload(json!({
        "audioData": { "title": title, "description": description }
    })))
}

fn html_without_payload() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string("<html><body><h1>Not found</h1></body></html>")
}

async fn mount_partition(server: &MockServer, letter: &str, collections: Value) {
    Mock::given(method("POST"))
        .and(path(FILTER))
        .and(body_json(json!({ "letter": letter, "language": "hindi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "seriesData": collections })))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, category_id: &str, per_page: u64, slugs: &[&str]) {
    let items: Vec<Value> = slugs.iter().map(|s| json!({ "slug": s })).collect();
    Mock::given(method("POST"))
        .and(path(SERIES_FILTER))
        .and(body_json(json!({ "perPage": per_page, "page": 1, "currentId": category_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "listData": items })))
        .mount(server)
        .await;
}

fn outcome_of<'a>(results: &'a [(transcript_harvester::HarvestJob, Outcome)], slug: &str) -> &'a Outcome {
    &results
        .iter()
        .find(|(job, _)| job.item_slug == slug)
        .unwrap_or_else(|| panic!("no result for {}", slug))
        .1
}

#[tokio::test]
async fn test_full_harvest_then_idempotent_rerun() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_partition(&server, "A", json!([{ "slug": "amrit-dwar", "title": "Amrit Dwar" }])).await;
    Mock::given(method("GET"))
        .and(path("/amrit-dwar"))
        .respond_with(collection_page("cat-a", 4))
        .mount(&server)
        .await;
    mount_listing(&server, "cat-a", 100, &["talk-1", "talk-2", "talk-3", "talk-4"]).await;

    // each successful item is fetched exactly once across both runs
    Mock::given(method("GET"))
        .and(path("/talk-1"))
        .respond_with(item_page("Talk One", "Line1<br>Line2<br/>Line3<br />Line4"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/talk-2"))
        .respond_with(item_page("Talk Two", "Osho"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/talk-3"))
        .respond_with(html_without_payload())
        .expect(1)
        .mount(&server)
        .await;
    // failures leave nothing behind, so the next run retries
    Mock::given(method("GET"))
        .and(path("/talk-4"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &["A"], tmp.path());
    let pipeline = Pipeline::new(config).expect("Failed to create pipeline");

    let first = pipeline.run().await.expect("Harvest failed");

    assert_eq!(first.counts.downloaded, 1);
    assert_eq!(first.counts.blank, 1);
    assert_eq!(first.counts.no_extractable, 1);
    assert_eq!(first.counts.errors, 1);
    assert_eq!(first.counts.skipped, 0);

    let series = tmp.path().join("amrit-dwar");
    assert_eq!(
        std::fs::read_to_string(series.join("talk-1.txt")).unwrap(),
        "Line1\nLine2\nLine3\nLine4"
    );
    assert_eq!(
        *outcome_of(&first.results, "talk-1"),
        Outcome::Downloaded {
            title: "Talk One".to_string(),
            chars: "Line1\nLine2\nLine3\nLine4".chars().count(),
        }
    );
    assert_eq!(std::fs::metadata(series.join("talk-2.txt")).unwrap().len(), 0);
    assert_eq!(std::fs::metadata(series.join("talk-3.txt")).unwrap().len(), 0);
    assert!(!series.join("talk-4.txt").exists());
    assert_eq!(outcome_of(&first.results, "talk-4").kind(), OutcomeKind::Error);

    let second = pipeline.run().await.expect("Second harvest failed");

    assert_eq!(second.counts.skipped, 3);
    assert_eq!(second.counts.errors, 1);
    assert_eq!(second.counts.attempted(), 1);
    assert_eq!(*outcome_of(&second.results, "talk-2"), Outcome::Skipped);
    assert_eq!(*outcome_of(&second.results, "talk-3"), Outcome::Skipped);
    assert_eq!(std::fs::metadata(series.join("talk-2.txt")).unwrap().len(), 0);
}

#[tokio::test]
async fn test_collection_without_payload_is_skipped() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_partition(
        &server,
        "B",
        json!([
            { "slug": "good-series", "title": "Good" },
            { "slug": "broken-series", "title": "Broken" }
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/good-series"))
        .respond_with(collection_page("cat-good", 2))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken-series"))
        .respond_with(html_without_payload())
        .mount(&server)
        .await;
    mount_listing(&server, "cat-good", 100, &["g-1", "g-2"]).await;

    let config = create_test_config(&server.uri(), &["B"], tmp.path());
    let pipeline = Pipeline::new(config).unwrap();
    let manifest = pipeline.build_manifest().await;

    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].collection_slug, "good-series");
    assert_eq!(manifest[0].collection_title, "Good");
    assert_eq!(manifest[0].item_slugs, vec!["g-1", "g-2"]);
    assert_eq!(manifest[0].expected_count, 2);
    assert_eq!(manifest[0].output_directory, tmp.path().join("good-series"));

    let listing_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == SERIES_FILTER)
        .count();
    assert_eq!(listing_calls, 1);
}

#[tokio::test]
async fn test_failed_partition_is_not_fatal() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_partition(&server, "A", json!([{ "slug": "a-series", "title": "A Series" }])).await;
    Mock::given(method("POST"))
        .and(path(FILTER))
        .and(body_json(json!({ "letter": "B", "language": "hindi" })))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    mount_partition(&server, "C", json!([])).await;

    let config = create_test_config(&server.uri(), &["A", "B", "C"], tmp.path());
    let pipeline = Pipeline::new(config).unwrap();
    let descriptors = pipeline.discover().await;

    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].slug, "a-series");
    assert_eq!(descriptors[0].partition_key, "A");
}

#[tokio::test]
async fn test_listing_page_size_covers_total() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_partition(&server, "M", json!([{ "slug": "big-series", "title": "Big" }])).await;
    Mock::given(method("GET"))
        .and(path("/big-series"))
        .respond_with(collection_page("cat-big", 250))
        .mount(&server)
        .await;
    mount_listing(&server, "cat-big", 250, &["b-1"]).await;

    let config = create_test_config(&server.uri(), &["M"], tmp.path());
    let manifest = Pipeline::new(config).unwrap().build_manifest().await;

    // the server count is advisory; the listing wins
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].expected_count, 250);
    assert_eq!(manifest[0].item_slugs, vec!["b-1"]);
}

#[tokio::test]
async fn test_loosely_typed_totals_still_resolve() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_partition(
        &server,
        "T",
        json!([
            { "slug": "float-total", "title": "Float" },
            { "slug": "string-total", "title": "String" },
            { "slug": "word-total", "title": "Word" }
        ]),
    )
    .await;
    for (slug, category, total) in [
        ("float-total", "cat-float", json!(12.0)),
        ("string-total", "cat-string", json!("250")),
        ("word-total", "cat-word", json!("many")),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/{}", slug)))
            .respond_with(collection_page_with_total(category, total))
            .mount(&server)
            .await;
    }
    mount_listing(&server, "cat-float", 100, &["f-1", "f-2"]).await;
    mount_listing(&server, "cat-string", 250, &["s-1"]).await;
    mount_listing(&server, "cat-word", 100, &["w-1", "w-2", "w-3"]).await;

    let config = create_test_config(&server.uri(), &["T"], tmp.path());
    let mut manifest = Pipeline::new(config).unwrap().build_manifest().await;
    manifest.sort_by(|a, b| a.collection_slug.cmp(&b.collection_slug));

    let summary: Vec<_> = manifest
        .iter()
        .map(|e| (e.collection_slug.as_str(), e.expected_count, e.item_slugs.len()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("float-total", 12, 2),
            ("string-total", 250, 1),
            ("word-total", 3, 3),
        ]
    );
}

#[tokio::test]
async fn test_panicking_extractor_is_reported_as_error() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let body = "first<br>second<br>third";

    for (slug, title) in [("x", "explode"), ("y", "Y"), ("z", "Z")] {
        Mock::given(method("GET"))
            .and(path(format!("/{}", slug)))
            .respond_with(item_page(title, body))
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server.uri(), &["A"], tmp.path());
    let pipeline = Pipeline::new(config)
        .unwrap()
        .with_extractor(Arc::new(PanicOnWord("explode")));
    let manifest = vec![ResolvedManifestEntry {
        collection_slug: "series".to_string(),
        collection_title: "Series".to_string(),
        output_directory: tmp.path().join("series"),
        item_slugs: vec!["x".to_string(), "y".to_string(), "z".to_string()],
        expected_count: 3,
    }];

    let report = pipeline.harvest(&manifest).await;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.counts.downloaded, 2);
    assert_eq!(report.counts.errors, 1);
    match outcome_of(&report.results, "x") {
        Outcome::Error(cause) => assert!(cause.starts_with("worker panicked"), "cause: {}", cause),
        other => panic!("expected an error, got {:?}", other),
    }
    assert!(!tmp.path().join("series/x.txt").exists());
    assert!(tmp.path().join("series/y.txt").exists());
    assert!(tmp.path().join("series/z.txt").exists());
}

#[tokio::test]
async fn test_timeout_on_one_item_does_not_block_siblings() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let body = "first<br>second<br>third";

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(item_page("Slow", body).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    for slug in ["y", "z"] {
        Mock::given(method("GET"))
            .and(path(format!("/{}", slug)))
            .respond_with(item_page(slug, body))
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server.uri(), &["A"], tmp.path());
    let pipeline = Pipeline::new(config).unwrap();
    let manifest = vec![ResolvedManifestEntry {
        collection_slug: "series".to_string(),
        collection_title: "Series".to_string(),
        output_directory: tmp.path().join("series"),
        item_slugs: vec!["slow".to_string(), "y".to_string(), "z".to_string()],
        expected_count: 3,
    }];

    let report = pipeline.harvest(&manifest).await;

    assert_eq!(report.counts.downloaded, 2);
    assert_eq!(report.counts.errors, 1);
    match outcome_of(&report.results, "slow") {
        Outcome::Error(cause) => assert!(cause.contains("timeout"), "cause: {}", cause),
        other => panic!("expected an error, got {:?}", other),
    }
    assert!(!tmp.path().join("series/slow.txt").exists());
    assert!(!tmp.path().join("series/slow.txt.part").exists());
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("series/y.txt")).unwrap(),
        "first\nsecond\nthird"
    );
    assert!(tmp.path().join("series/z.txt").exists());
}

#[tokio::test]
async fn test_only_missing_items_are_fetched() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let series = tmp.path().join("series");
    std::fs::create_dir_all(&series).unwrap();
    std::fs::write(series.join("talk-1.txt"), "already here\n\nyes").unwrap();
    std::fs::write(series.join("talk-4.txt"), "").unwrap();

    Mock::given(method("GET"))
        .and(path_regex(r"^/talk-\d+$"))
        .respond_with(item_page("Talk", "a<br>b<br>c"))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &["A"], tmp.path());
    let pipeline = Pipeline::new(config).unwrap();
    let manifest = vec![ResolvedManifestEntry {
        collection_slug: "series".to_string(),
        collection_title: "Series".to_string(),
        output_directory: series.clone(),
        item_slugs: (1..=5).map(|n| format!("talk-{}", n)).collect(),
        expected_count: 5,
    }];

    let plan = pipeline.plan(&manifest).await;
    assert_eq!(plan.total(), 5);
    assert_eq!(plan.pending.len(), 3);

    let report = pipeline.harvest(&manifest).await;

    assert_eq!(report.counts.skipped, 2);
    assert_eq!(report.counts.downloaded, 3);
    // negative-cache marker is untouched
    assert_eq!(std::fs::metadata(series.join("talk-4.txt")).unwrap().len(), 0);
    assert_eq!(
        std::fs::read_to_string(series.join("talk-1.txt")).unwrap(),
        "already here\n\nyes"
    );
}

#[tokio::test]
async fn test_blank_runs_collapse_in_written_text() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/talk"))
        .respond_with(item_page(
            "Talk",
            "<p>Para one</p>\n\n\n\nPara two<br>line two<br><br><br><br>end",
        ))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &["A"], tmp.path());
    let pipeline = Pipeline::new(config).unwrap();
    let manifest = vec![ResolvedManifestEntry {
        collection_slug: "series".to_string(),
        collection_title: "Series".to_string(),
        output_directory: tmp.path().join("series"),
        item_slugs: vec!["talk".to_string()],
        expected_count: 1,
    }];

    let report = pipeline.harvest(&manifest).await;

    assert_eq!(report.counts.downloaded, 1);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("series/talk.txt")).unwrap(),
        "Para one\n\nPara two\nline two\n\nend"
    );
}
