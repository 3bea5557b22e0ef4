//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the review site and its listing
//! API, and run the full crawl cycle end-to-end.

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tomato_harvest::config::{parse_config, Config};
use tomato_harvest::crawler::crawl;
use tomato_harvest::output::{RunOutcome, REQUIRED_FIELDS};
use tomato_harvest::storage::{RunStatus, SqliteStorage};
use tomato_harvest::ConfigError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration against the mock site
fn create_test_config(
    base_url: &str,
    start_urls: &[&str],
    max_results: u64,
    output_format: &str,
    output_path: &Path,
) -> Config {
    let seeds: Vec<String> = start_urls.iter().map(|u| format!("\"{}\"", u)).collect();
    let toml = format!(
        r#"
start-urls = [{seeds}]

[site]
base-url = "{base_url}"

[crawler]
max-results = {max_results}
max-concurrent-pages = 4
request-timeout-secs = 5
max-retries = 0
retry-delay-ms = 1

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"

[output]
format = "{output_format}"
path = "{output_path}"
"#,
        seeds = seeds.join(", "),
        base_url = base_url,
        max_results = max_results,
        output_format = output_format,
        output_path = output_path.display(),
    );

    parse_config(&toml).expect("Failed to parse test config")
}

fn movie_page(title: &str) -> String {
    format!(
        r#"<html><body>
            <div data-qa="score-panel" tomatometerscore="91" audiencescore="85">
                <h1 data-qa="score-panel-title">{title}</h1>
            </div>
            <p data-qa="movie-info-synopsis">Synopsis of {title}</p>
            <a data-qa="cast-crew-item-link">Lead Actor</a>
            <li data-qa="movie-info-item">
                <b data-qa="movie-info-item-label">Genre:</b>
                <span data-qa="movie-info-item-value">Drama</span>
            </li>
        </body></html>"#,
        title = title
    )
}

fn show_page(title: &str) -> String {
    format!(
        r#"<html><body>
            <h1 data-qa="score-panel-series-title">{title}</h1>
            <span data-qa="tomatometer">97%</span>
            <span data-qa="audience-score">90%</span>
            <div id="movieSynopsis">Synopsis of {title}</div>
            <span data-qa="cast-item-name">Lead Actor</span>
            <season-list-item>Season 1</season-list-item>
        </body></html>"#,
        title = title
    )
}

async fn mount_movie(server: &MockServer, slug: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/m/{}", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_string(movie_page(slug)))
        .mount(server)
        .await;
}

fn read_jsonl(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect()
}

#[tokio::test]
async fn test_listing_respects_result_limit() {
    let server = MockServer::start().await;

    let list: Vec<Value> = (0..10)
        .map(|i| json!({ "mediaUrl": format!("/m/movie_{}", i) }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/napi/browse/movies_at_home"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grid": { "list": list },
            "pageInfo": { "endCursor": null, "hasNextPage": false }
        })))
        .expect(1)
        .mount(&server)
        .await;

    for i in 0..10 {
        mount_movie(&server, &format!("movie_{}", i)).await;
    }

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("dataset.jsonl");
    let config = create_test_config(
        &server.uri(),
        &[&format!("{}/browse/movies_at_home", server.uri())],
        5,
        "jsonl",
        &output,
    );

    let summary = crawl(&config, "hash").await.expect("Crawl failed");

    assert_eq!(summary.outcome, RunOutcome::BudgetReached);
    assert_eq!(summary.planned, 10);
    assert_eq!(summary.listing_pages, 1);
    assert!(summary.records_emitted <= 5);

    let records = read_jsonl(&output);
    assert_eq!(records.len() as u64, summary.records_emitted);
    for record in &records {
        for field in REQUIRED_FIELDS {
            assert!(record.get(field).is_some(), "Missing field {}", field);
        }
        assert_eq!(record["tomatometer"], "91");
        assert_eq!(record["genre"], "Drama");
    }
}

#[tokio::test]
async fn test_generic_page_harvests_detail_links() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
                <a href="/m/alien">Alien</a>
                <a href="/m/alien/reviews">Alien reviews</a>
                <a href="{}/tv/severance/s01">Severance</a>
                <a href="https://evil.example/m/x">Elsewhere</a>
                <a href="/news">News</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&server)
        .await;

    mount_movie(&server, "alien").await;
    Mock::given(method("GET"))
        .and(path("/tv/severance"))
        .respond_with(ResponseTemplate::new(200).set_body_string(show_page("Severance")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("dataset.jsonl");
    let config = create_test_config(&base_url, &[&format!("{}/", base_url)], 100, "jsonl", &output);

    let summary = crawl(&config, "hash").await.expect("Crawl failed");

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.links_harvested, 2);
    assert_eq!(summary.records_emitted, 2);

    let records = read_jsonl(&output);
    let mut titles: Vec<&str> = records
        .iter()
        .filter_map(|r| r["title"].as_str())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Severance", "alien"]);

    let show = records
        .iter()
        .find(|r| r["title"] == "Severance")
        .unwrap();
    assert_eq!(show["seasons"], "1");
    assert_eq!(show["audience score"], "90");
    assert_eq!(show["url"], format!("{}/tv/severance", base_url));
}

#[tokio::test]
async fn test_foreign_seed_produces_no_work() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("dataset.jsonl");
    let config = create_test_config(&server.uri(), &["https://evil.example/m/x"], 100, "jsonl", &output);

    let summary = crawl(&config, "hash").await.expect("Crawl failed");

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.records_emitted, 0);
    assert_eq!(summary.urls_rejected, 1);
    assert!(read_jsonl(&output).is_empty());
}

#[tokio::test]
async fn test_failed_listing_does_not_stop_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/napi/browse/tv_series_browse"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_movie(&server, "alien").await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("dataset.jsonl");
    let config = create_test_config(
        &server.uri(),
        &["/browse/tv_series_browse", "/m/alien"],
        100,
        "jsonl",
        &output,
    );

    let summary = crawl(&config, "hash").await.expect("Crawl failed");

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.listing_failures, 1);
    assert_eq!(summary.records_emitted, 1);
}

#[tokio::test]
async fn test_sqlite_dataset_records_run() {
    let server = MockServer::start().await;
    mount_movie(&server, "alien").await;
    mount_movie(&server, "aliens").await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("dataset.db");
    let config = create_test_config(&server.uri(), &["/m/alien", "/m/aliens"], 100, "sqlite", &output);

    let summary = crawl(&config, "config-hash").await.expect("Crawl failed");
    assert_eq!(summary.records_emitted, 2);

    let storage = SqliteStorage::new(&output).expect("Failed to open dataset");
    assert_eq!(storage.count_records().unwrap(), 2);
    assert_eq!(
        storage.count_records_by_kind().unwrap(),
        vec![("MOVIE".to_string(), 2)]
    );

    let run = storage.get_latest_run().unwrap().expect("Run missing");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "config-hash");
    assert_eq!(run.max_results, 100);
}

#[test]
fn test_missing_start_urls_is_input_error() {
    let result = parse_config("[crawler]\nmax-results = 5\n");
    assert!(matches!(result, Err(ConfigError::MissingStartUrls)));

    let result = parse_config("start-urls = \"https://www.rottentomatoes.com/m/alien\"\n");
    assert!(matches!(result, Err(ConfigError::StartUrlsNotList(_))));
}
