//! Integration tests for the crawler
//!
//! These tests drive the full crawl cycle end-to-end against an in-memory
//! browser engine serving HTML fixtures.

mod support;

use pagewalker::config::Config;
use pagewalker::output::write_results;
use pagewalker::{BrowserError, Crawler, Link, VisitResult, VisitState, WalkerError};
use std::collections::HashSet;
use std::time::Duration;
use support::FakeSite;
use tokio_util::sync::CancellationToken;

const START: &str = "https://example.com/";

/// Creates a test configuration with the given depth and page cap
fn create_test_config(depth: u32, max_pages: usize) -> Config {
    let mut config = Config::default();
    config.crawl.depth = depth;
    config.crawl.max_pages = max_pages;
    config.crawl.delay_ms = 10; // Very short for testing
    config
}

fn links_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">Link {}</a>"#, href, href))
        .collect();
    format!(
        "<html><body><main><h1>Index</h1><p>Welcome</p>{}</main></body></html>",
        anchors
    )
}

fn leaf_page(title: &str) -> String {
    format!(
        "<html><body><article><h1>{}</h1><p>Body of {}</p></article></body></html>",
        title, title
    )
}

async fn scrape(site: &FakeSite, config: Config) -> Vec<VisitResult> {
    Crawler::new(config, site.engine())
        .expect("valid config")
        .scrape(START)
        .await
        .expect("crawl should complete")
}

#[tokio::test(start_paused = true)]
async fn test_depth_zero_visits_only_start_page() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/a", "/b"]))
        .page("https://example.com/a", &leaf_page("A"))
        .page("https://example.com/b", &leaf_page("B"));

    let results = scrape(&site, create_test_config(0, 50)).await;

    assert_eq!(results.len(), 1);
    let seed = &results[0];
    assert_eq!(seed.url, "https://example.com");
    assert_eq!(seed.depth, 0);
    assert!(seed.error.is_none());
    assert!(seed.text.contains("Index"));
    assert!(seed.text.contains("Welcome"));
    assert_eq!(
        seed.links,
        vec![
            Link::new("https://example.com/a", "Link /a"),
            Link::new("https://example.com/b", "Link /b"),
        ]
    );
    assert_eq!(site.visits(), vec!["https://example.com".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_max_pages_caps_results() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/1", "/2", "/3", "/4", "/5"]))
        .page("https://example.com/1", &leaf_page("1"))
        .page("https://example.com/2", &leaf_page("2"))
        .page("https://example.com/3", &leaf_page("3"))
        .page("https://example.com/4", &leaf_page("4"))
        .page("https://example.com/5", &leaf_page("5"));

    let results = scrape(&site, create_test_config(1, 3)).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].depth, 0);
    assert!(results[1..].iter().all(|r| r.depth == 1));
    assert!(results.iter().all(|r| r.is_success()));

    let visited: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert!(visited.contains("https://example.com/1"));
    assert!(visited.contains("https://example.com/2"));
}

#[tokio::test(start_paused = true)]
async fn test_breadth_first_depths() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/a", "/b"]))
        .page("https://example.com/a", &links_page(&["/a/deep"]))
        .page("https://example.com/b", &links_page(&["/b/deep", "/a"]))
        .page("https://example.com/a/deep", &leaf_page("A deep"))
        .page("https://example.com/b/deep", &links_page(&["/too-deep"]));

    let results = scrape(&site, create_test_config(2, 50)).await;

    let depths: Vec<u32> = results.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 2, 2]);
    assert!(!site
        .visits()
        .contains(&"https://example.com/too-deep".to_string()));
}

fn slow_and_fast_site() -> FakeSite {
    FakeSite::new()
        .page(START, &links_page(&["/slow", "/fast"]))
        .page("https://example.com/slow", &links_page(&["/s1"]))
        .page("https://example.com/fast", &links_page(&["/f1"]))
        .page("https://example.com/s1", &leaf_page("S1"))
        .page("https://example.com/f1", &leaf_page("F1"))
        .with_delay_for("https://example.com/slow", Duration::from_secs(3))
}

#[tokio::test(start_paused = true)]
async fn test_batch_results_arrive_in_completion_order() {
    let site = slow_and_fast_site();

    let results = scrape(&site, create_test_config(2, 50)).await;

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls[..3],
        [
            "https://example.com",
            "https://example.com/fast",
            "https://example.com/slow",
        ]
    );
    let last_batch: HashSet<&str> = urls[3..].iter().copied().collect();
    assert_eq!(
        last_batch,
        HashSet::from(["https://example.com/s1", "https://example.com/f1"])
    );
}

#[tokio::test(start_paused = true)]
async fn test_links_expanded_in_scheduling_order() {
    let site = slow_and_fast_site();

    // Room for one more page after the second batch; /slow was scheduled
    // first, so its link wins even though /fast finished earlier.
    let results = scrape(&site, create_test_config(2, 4)).await;

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com",
            "https://example.com/fast",
            "https://example.com/slow",
            "https://example.com/s1",
        ]
    );
    assert!(!site.visits().contains(&"https://example.com/f1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_seed_navigation_failure() {
    let site = FakeSite::new().failing(START, "net::ERR_CONNECTION_REFUSED");

    let results = scrape(&site, create_test_config(2, 50)).await;

    assert_eq!(results.len(), 1);
    let seed = &results[0];
    assert_eq!(seed.state(), VisitState::Failed);
    assert!(seed
        .error
        .as_deref()
        .unwrap()
        .contains("net::ERR_CONNECTION_REFUSED"));
    assert!(seed.text.is_empty());
    assert!(seed.links.is_empty());
    assert!(site.session_closed());
}

#[tokio::test(start_paused = true)]
async fn test_failed_page_does_not_stop_crawl() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/broken", "/ok"]))
        .failing("https://example.com/broken", "net::ERR_EMPTY_RESPONSE")
        .page("https://example.com/ok", &leaf_page("OK"));

    let results = scrape(&site, create_test_config(1, 50)).await;

    assert_eq!(results.len(), 3);
    let failed: Vec<&VisitResult> = results.iter().filter(|r| !r.is_success()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].url, "https://example.com/broken");
    assert_eq!(failed[0].depth, 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_timeout_becomes_error_record() {
    let site = FakeSite::new()
        .page(START, &leaf_page("Slow"))
        .with_load_delay(Duration::from_secs(60));

    let results = scrape(&site, create_test_config(0, 50)).await;

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].error.as_deref(),
        Some("Navigation timed out after 30000ms")
    );
}

#[tokio::test(start_paused = true)]
async fn test_links_deduplicated_scoped_and_filtered() {
    let site = FakeSite::new()
        .page(
            START,
            &links_page(&[
                "/a",
                "/a/",
                "https://WWW.example.com/a#top",
                "https://other.org/x",
                "https://blog.example.com/",
                "/report.pdf",
                "/photo.JPG?size=large",
                "mailto:team@example.com",
                "#main",
            ]),
        )
        .page("https://example.com/a", &leaf_page("A"));

    let results = scrape(&site, create_test_config(1, 50)).await;

    let hrefs: Vec<&str> = results[0].links.iter().map(|l| l.href.as_str()).collect();
    assert_eq!(
        hrefs,
        vec![
            "https://example.com/a",
            "https://other.org/x",
            "https://blog.example.com",
            "https://example.com/report.pdf",
            "https://example.com/photo.JPG?size=large",
        ]
    );

    assert_eq!(
        site.visits(),
        vec![
            "https://example.com".to_string(),
            "https://example.com/a".to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_url_visited_twice() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/a", "/b"]))
        .page("https://example.com/a", &links_page(&["/", "/b", "/a"]))
        .page("https://example.com/b", &links_page(&["/a", "/"]));

    let results = scrape(&site, create_test_config(3, 50)).await;

    assert_eq!(results.len(), 3);
    let visits = site.visits();
    let unique: HashSet<&String> = visits.iter().collect();
    assert_eq!(unique.len(), visits.len());
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_bound() {
    let hrefs: Vec<String> = (0..8).map(|i| format!("/p{}", i)).collect();
    let href_refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

    let mut site = FakeSite::new()
        .page(START, &links_page(&href_refs))
        .with_load_delay(Duration::from_millis(100));
    for href in &hrefs {
        site = site.page(&format!("https://example.com{}", href), &leaf_page(href));
    }

    let mut config = create_test_config(1, 50);
    config.crawl.concurrency = 2;
    config.crawl.batch_size = 10;

    let results = scrape(&site, config).await;

    assert_eq!(results.len(), 9);
    assert_eq!(site.max_open_pages(), 2);
    assert_eq!(site.open_pages(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_small_batches_still_visit_everything() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/a", "/b", "/c"]))
        .page("https://example.com/a", &leaf_page("A"))
        .page("https://example.com/b", &leaf_page("B"))
        .page("https://example.com/c", &leaf_page("C"));

    let mut config = create_test_config(1, 50);
    config.crawl.batch_size = 1;
    config.crawl.concurrency = 1;

    let results = scrape(&site, config).await;
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com",
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_relative_links_follow_redirect_target() {
    let site = FakeSite::new()
        .redirect(START, "https://example.com/docs/")
        .page("https://example.com/docs/", &links_page(&["intro"]));

    let results = scrape(&site, create_test_config(0, 50)).await;

    assert_eq!(results[0].url, "https://example.com");
    assert_eq!(results[0].links[0].href, "https://example.com/docs/intro");
}

#[tokio::test(start_paused = true)]
async fn test_tables_included_when_enabled() {
    let html = r#"<html><body><p>Prices</p><table>
        <thead><tr><th>Item</th><th>Price</th></tr></thead>
        <tbody><tr><td>Tea</td><td>3</td></tr><tr><td></td><td></td></tr></tbody>
        </table></body></html>"#;
    let site = FakeSite::new().page(START, html);

    let without = scrape(&site, create_test_config(0, 50)).await;
    assert!(without[0].tables.is_none());

    let mut config = create_test_config(0, 50);
    config.extraction.include_tables = true;
    let with = scrape(&site, config).await;

    let tables = with[0].tables.as_ref().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].headers, vec![vec!["Item", "Price"]]);
    assert_eq!(tables[0].rows, vec![vec!["Tea", "3"]]);
}

#[tokio::test(start_paused = true)]
async fn test_automation_runs_on_every_page() {
    let site = FakeSite::new()
        .page(
            START,
            r#"<html><body><button id="more">More</button><a href="/a">A</a></body></html>"#,
        )
        .page("https://example.com/a", &leaf_page("A"));

    let mut config = create_test_config(1, 50);
    config.automation.click_selectors = vec!["#more".to_string(), "#missing".to_string()];
    config.automation.script = Some("window.__seen = true;".to_string());

    let results = scrape(&site, config).await;

    assert_eq!(results.len(), 2);
    assert_eq!(site.clicks(), vec!["#more".to_string()]);

    let scripts = site.scripts();
    assert_eq!(scripts.len(), 2);
    assert!(scripts.iter().all(|s| s.contains("window.__seen = true;")));
}

#[tokio::test(start_paused = true)]
async fn test_failing_custom_script_keeps_page() {
    let site = FakeSite::new().page(START, &leaf_page("Home"));

    let mut config = create_test_config(0, 50);
    config.automation.script = Some("throw new Error('nope')".to_string());

    let results = scrape(&site, config).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].is_success());
    assert!(results[0].text.contains("Home"));
}

#[tokio::test]
async fn test_script_file_reread_for_each_crawl() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "window.run = 1;").unwrap();

    let site = FakeSite::new().page(START, &leaf_page("Home"));
    let mut config = create_test_config(0, 50);
    config.automation.script_file = Some(file.path().to_path_buf());
    let crawler = Crawler::new(config, site.engine()).unwrap();

    crawler.scrape(START).await.unwrap();
    std::fs::write(file.path(), "window.run = 2;").unwrap();
    crawler.scrape(START).await.unwrap();

    let scripts = site.scripts();
    assert_eq!(scripts.len(), 2);
    assert!(scripts[0].contains("window.run = 1;"));
    assert!(scripts[1].contains("window.run = 2;"));
}

#[tokio::test(start_paused = true)]
async fn test_page_open_failure_is_recorded() {
    let site = FakeSite::new()
        .page(START, &leaf_page("Home"))
        .with_failing_new_page();

    let results = scrape(&site, create_test_config(1, 50)).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].error.as_deref().unwrap().contains("target crashed"));
    assert!(site.session_closed());
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_propagates() {
    let site = FakeSite::new()
        .page(START, &leaf_page("Home"))
        .with_failing_launch();

    let result = Crawler::new(create_test_config(0, 50), site.engine())
        .unwrap()
        .scrape(START)
        .await;

    assert!(matches!(
        result,
        Err(WalkerError::Browser(BrowserError::Launch(_)))
    ));
    assert!(site.visits().is_empty());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let site = FakeSite::new();
    let mut config = create_test_config(0, 50);
    config.crawl.concurrency = 0;

    assert!(matches!(
        Crawler::new(config, site.engine()),
        Err(WalkerError::Config(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start() {
    let site = FakeSite::new().page(START, &leaf_page("Home"));
    let crawler = Crawler::new(create_test_config(0, 50), site.engine()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let results = crawler.scrape_with_cancel(START, cancel).await.unwrap();

    assert!(results.is_empty());
    assert!(site.session_closed());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_visit() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/a"]))
        .page("https://example.com/a", &leaf_page("A"))
        .with_load_delay(Duration::from_secs(5));
    let crawler = Crawler::new(create_test_config(1, 50), site.engine()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let (results, _) = tokio::join!(crawler.scrape_with_cancel(START, cancel), async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });
    let results = results.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error.as_deref(), Some("crawl cancelled"));
    assert_eq!(site.open_pages(), 0);
    assert!(site.session_closed());
}

#[tokio::test(start_paused = true)]
async fn test_results_written_as_json_stream() {
    let site = FakeSite::new()
        .page(START, &links_page(&["/a"]))
        .page("https://example.com/a", &leaf_page("A"));

    let results = scrape(&site, create_test_config(1, 50)).await;

    let mut out = Vec::new();
    write_results(&mut out, &results).unwrap();
    let text = String::from_utf8(out).unwrap();

    let records: Vec<serde_json::Value> = text
        .split("\n\n")
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| serde_json::from_str(chunk).unwrap())
        .collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["url"], "https://example.com");
    assert_eq!(records[0]["depth"], 0);
    assert_eq!(records[1]["depth"], 1);
    assert!(records[0].get("error").is_none());
    assert!(records[0].get("tables").is_none());
}
