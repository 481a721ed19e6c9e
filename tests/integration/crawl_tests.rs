//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a real SQLite file.

use link_spider::config::{Config, CrawlerConfig, OutputConfig, TlsConfig, UserAgentConfig};
use link_spider::crawler::{
    CrawlEngine, EngineSettings, HtmlAnchorExtractor, HttpFetcher, StartMode, StopReason,
};
use link_spider::state::{CrawlState, PageStatus, StatusKind, FETCH_ERROR_SENTINEL};
use link_spider::storage::{GraphStore, SqliteStorage};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given seed
fn create_test_config(seed: &str, db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed: Some(seed.to_string()),
            max_pages: 0,
            workers: 2,
            fetch_timeout: 5,
        },
        tls: TlsConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    }
}

fn create_engine(config: &Config) -> CrawlEngine<SqliteStorage> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .expect("Failed to open database");
    let fetcher = HttpFetcher::from_config(config).expect("Failed to build client");
    CrawlEngine::new(
        storage,
        fetcher,
        HtmlAnchorExtractor,
        EngineSettings::from_config(&config.crawler),
    )
}

async fn mount_html(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn outgoing(engine: &CrawlEngine<SqliteStorage>, url: &str) -> HashSet<String> {
    engine
        .read_store(|store| {
            let Some(page) = store.get_page_by_url(url)? else {
                return Ok(HashSet::new());
            };
            store
                .get_outgoing_links(page.id)?
                .into_iter()
                .map(|link| store.get_page(link.to_id).map(|p| p.url))
                .collect()
        })
        .unwrap()
}

fn status(engine: &CrawlEngine<SqliteStorage>, url: &str) -> Option<PageStatus> {
    engine
        .read_store(|store| store.get_page_by_url(url))
        .unwrap()
        .map(|page| page.status)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        200,
        r#"<html><body>
            <a href="/page1">Page 1</a>
            <a href="page2#intro">Page 2</a>
            <a href="https://elsewhere.example.org/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/page1", 200, r#"<a href="/">Home</a>"#).await;
    mount_html(&server, "/page2", 200, r#"<a href="/page1">Page 1</a>"#).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir.path().join("spider.sqlite"));
    let mut engine = create_engine(&config);

    let mode = engine.start(config.crawler.seed.as_deref()).unwrap();
    assert_eq!(
        mode,
        StartMode::Seeded {
            seed: base.clone(),
            scope: Some(base.clone()),
        }
    );

    let outcome = engine.run_steps(0, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.stop, StopReason::Drained);
    assert_eq!(outcome.fetched, 3);
    assert_eq!(engine.state(), CrawlState::Drained);

    assert_eq!(
        outgoing(&engine, &base),
        HashSet::from([format!("{}/page1", base), format!("{}/page2", base)])
    );
    assert_eq!(
        outgoing(&engine, &format!("{}/page1", base)),
        HashSet::from([base.clone()])
    );
    assert_eq!(status(&engine, "https://elsewhere.example.org"), None);
    assert!(matches!(
        status(&engine, &format!("{}/page2", base)),
        Some(PageStatus::Fetched(_))
    ));
}

#[tokio::test]
async fn test_non_html_page_is_removed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        200,
        r#"<a href="/report.pdf">Report</a><a href="/about">About</a>"#,
    )
    .await;
    mount_html(&server, "/about", 200, "<p>about</p>").await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir.path().join("spider.sqlite"));
    let mut engine = create_engine(&config);
    engine.start(config.crawler.seed.as_deref()).unwrap();

    let outcome = engine.run_steps(0, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.disqualified, 1);
    assert_eq!(status(&engine, &format!("{}/report.pdf", base)), None);
    assert_eq!(
        outgoing(&engine, &base),
        HashSet::from([format!("{}/about", base)])
    );
}

#[tokio::test]
async fn test_http_errors_are_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        200,
        r#"<a href="/gone">Gone</a><a href="/broken">Broken</a>"#,
    )
    .await;
    mount_html(&server, "/gone", 404, r#"<a href="/secret">Secret</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir.path().join("spider.sqlite"));
    let mut engine = create_engine(&config);
    engine.start(config.crawler.seed.as_deref()).unwrap();

    let outcome = engine.run_steps(0, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.fetched, 1);
    assert_eq!(outcome.failed, 2);
    assert_eq!(
        status(&engine, &format!("{}/gone", base)),
        Some(PageStatus::Failed(404))
    );
    assert_eq!(
        status(&engine, &format!("{}/broken", base)),
        Some(PageStatus::Failed(500))
    );
    // Error pages are never parsed
    assert_eq!(status(&engine, &format!("{}/secret", base)), None);
}

#[tokio::test]
async fn test_unreachable_seed_records_sentinel() {
    // Bind then drop a listener so the port refuses connections
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &dir.path().join("spider.sqlite"));
    let mut engine = create_engine(&config);
    engine.start(config.crawler.seed.as_deref()).unwrap();

    let outcome = engine.run_steps(0, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.stop, StopReason::Drained);
    assert_eq!(
        status(&engine, &base),
        Some(PageStatus::Failed(FETCH_ERROR_SENTINEL))
    );
}

#[tokio::test]
async fn test_resume_after_reopening_database() {
    let server = MockServer::start().await;
    let base = server.uri();

    let hub: String = (1..=5)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_html(&server, "/", 200, &hub).await;
    for i in 1..=5 {
        mount_html(&server, &format!("/p{}", i), 200, r#"<a href="/">Home</a>"#).await;
    }

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("spider.sqlite");
    let config = create_test_config(&base, &db_path);

    {
        let mut engine = create_engine(&config);
        engine.start(config.crawler.seed.as_deref()).unwrap();
        let outcome = engine.run_steps(3, &CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.stop, StopReason::BudgetExhausted);
    }

    // A different seed must not matter while pages are pending
    let resumed_config = create_test_config("https://other.example.org/", &db_path);
    let mut engine = create_engine(&resumed_config);
    let mode = engine.start(resumed_config.crawler.seed.as_deref()).unwrap();
    assert!(matches!(mode, StartMode::Resumed { pending: 3, .. }));
    assert_eq!(engine.scopes(), [base.clone()]);

    let outcome = engine.run_steps(0, &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.fetched, 3);
    assert_eq!(outcome.stop, StopReason::Drained);

    let store = engine.into_store().unwrap();
    assert_eq!(store.count_pages(StatusKind::Fetched).unwrap(), 6);
    assert_eq!(store.count_pages(StatusKind::Pending).unwrap(), 0);
    assert_eq!(store.count_links().unwrap(), 10);
    assert!(store.get_page_by_url("https://other.example.org").unwrap().is_none());
}
