use report_harvester::config::{Config, FetcherConfig, OutputConfig, ScraperConfig, SourceConfig};
use report_harvester::report::{PLACEHOLDER_IMAGE, UNKNOWN_DATE};
use report_harvester::scrape::Politeness;
use report_harvester::storage::{ReportStore, SqliteReportStore, StorageError, StorageResult};
use report_harvester::{
    default_registry, fingerprint, run_scrape, Fetcher, Orchestrator, StoredReport, TaskStage,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Two well-formed articles and one without any link
const COUNTRY_LISTING: &str = r#"<html><body>
    <article>
      <img data-src="/img/a.jpg" src="/img/a-small.jpg">
      <a href="/news/a">Alpha report</a>
      <time datetime="2024-03-01">1 March</time>
    </article>
    <article>
      <a href="/news/b">Bravo report</a>
    </article>
    <article>
      <h3>Gamma report with no link</h3>
    </article>
</body></html>"#;

/// Creates scraper settings with pacing disabled for testing
fn test_settings() -> ScraperConfig {
    ScraperConfig {
        max_concurrent_tasks: 4,
        politeness_min_ms: 0,
        politeness_max_ms: 0,
        run_deadline_secs: None,
    }
}

/// Creates a test configuration with the given sources and database
fn create_test_config(sources: BTreeMap<String, Vec<String>>, db_path: &str) -> Config {
    Config {
        fetcher: FetcherConfig {
            timeout_secs: 5,
            ..FetcherConfig::default()
        },
        scraper: test_settings(),
        output: OutputConfig {
            database_path: db_path.to_string(),
            page_size: 100,
        },
        sources,
    }
}

fn test_orchestrator(store: Arc<dyn ReportStore>) -> Orchestrator {
    let fetcher = Fetcher::from_config(&FetcherConfig::default()).expect("Failed to build fetcher");
    Orchestrator::new(fetcher, default_registry(), store, &test_settings())
        .with_politeness(Politeness::none())
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Responder that notes when each request arrived
struct ArrivalLog {
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for ArrivalLog {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200).set_body_string(COUNTRY_LISTING)
    }
}

fn stored_ids(store: &dyn ReportStore) -> BTreeSet<String> {
    store
        .list_all()
        .expect("Failed to list reports")
        .into_iter()
        .map(|r| r.id)
        .collect()
}

/// Store that rejects every report whose title starts with "Rejected"
struct SelectiveStore {
    inner: SqliteReportStore,
}

impl ReportStore for SelectiveStore {
    fn ping(&self) -> StorageResult<()> {
        self.inner.ping()
    }

    fn upsert(&self, id: &str, report: &StoredReport) -> StorageResult<()> {
        if report.title.starts_with("Rejected") {
            return Err(StorageError::Rejected {
                id: id.to_string(),
                reason: "write quota exceeded".to_string(),
            });
        }
        self.inner.upsert(id, report)
    }

    fn get(&self, id: &str) -> StorageResult<Option<StoredReport>> {
        self.inner.get(id)
    }

    fn count(&self) -> StorageResult<u64> {
        self.inner.count()
    }

    fn list_all(&self) -> StorageResult<Vec<StoredReport>> {
        self.inner.list_all()
    }

    fn list_recent(&self, limit: usize) -> StorageResult<Vec<StoredReport>> {
        self.inner.list_recent(limit)
    }

    fn filter_by_source_and_date(
        &self,
        source: &str,
        date: &str,
    ) -> StorageResult<Vec<StoredReport>> {
        self.inner.filter_by_source_and_date(source, date)
    }
}

#[tokio::test]
async fn test_malformed_block_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/feed", 200, COUNTRY_LISTING).await;

    let store = Arc::new(SqliteReportStore::open_in_memory().expect("Failed to open store"));
    let sources = SourceConfig::new().with_source("UA", [format!("{}/feed", base_url)]);

    let summary = test_orchestrator(store.clone())
        .run(&sources)
        .await
        .expect("Scrape failed");

    assert_eq!(summary.stored, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.count().unwrap(), 2);

    // Documents are keyed by the fingerprint of title and resolved link
    let alpha_link = format!("{}/news/a", base_url);
    let alpha = store
        .get(&fingerprint("Alpha report", &alpha_link))
        .unwrap()
        .expect("Alpha report missing");
    assert_eq!(alpha.link, alpha_link);
    assert_eq!(alpha.date, "March 01, 2024");
    assert_eq!(alpha.source, "UA");
    assert_eq!(alpha.image_url, format!("{}/img/a.jpg", base_url));

    let bravo_link = format!("{}/news/b", base_url);
    let bravo = store
        .get(&fingerprint("Bravo report", &bravo_link))
        .unwrap()
        .expect("Bravo report missing");
    assert_eq!(bravo.date, UNKNOWN_DATE);
    assert_eq!(bravo.image_url, PLACEHOLDER_IMAGE);
}

#[tokio::test]
async fn test_repeated_runs_are_idempotent() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/feed", 200, COUNTRY_LISTING).await;

    let store = Arc::new(SqliteReportStore::open_in_memory().expect("Failed to open store"));
    let sources =
        SourceConfig::new().with_source("PL", [format!("{}/feed", mock_server.uri())]);
    let orchestrator = test_orchestrator(store.clone());

    orchestrator.run(&sources).await.expect("First run failed");
    let first_ids = stored_ids(store.as_ref());

    let second = orchestrator.run(&sources).await.expect("Second run failed");
    let second_ids = stored_ids(store.as_ref());

    assert_eq!(second.stored, 2);
    assert_eq!(first_ids, second_ids);
    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test]
async fn test_failed_fetch_does_not_affect_other_tasks() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/good", 200, COUNTRY_LISTING).await;
    mount_page(&mock_server, "/broken", 500, "internal error").await;

    let store = Arc::new(SqliteReportStore::open_in_memory().expect("Failed to open store"));
    let sources = SourceConfig::new()
        .with_source(
            "TR",
            [format!("{}/broken", base_url), format!("{}/good", base_url)],
        )
        .with_source("BY", [format!("{}/missing", base_url)]);

    let summary = test_orchestrator(store.clone())
        .run(&sources)
        .await
        .expect("Scrape failed");

    assert_eq!(summary.tasks, 3);
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.failed, 2);

    let tr = summary.source("TR").expect("TR tally missing");
    assert_eq!(tr.tasks, 2);
    assert_eq!(tr.stored, 2);
    assert_eq!(tr.failed, 1);

    let by = summary.source("BY").expect("BY tally missing");
    assert_eq!(by.failed, 1);
    assert_eq!(by.stored, 0);

    assert_eq!(summary.failures.len(), 2);
    let broken = summary
        .failure(&format!("{}/broken", base_url))
        .expect("Broken page not recorded");
    assert_eq!(broken.source, "TR");
    assert_eq!(broken.stage, TaskStage::Fetching);

    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test]
async fn test_rejected_write_counts_as_failure() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/feed",
        200,
        r#"<article><a href="/keep">Kept report</a></article>
           <article><a href="/drop">Rejected report</a></article>"#,
    )
    .await;

    let store = Arc::new(SelectiveStore {
        inner: SqliteReportStore::open_in_memory().expect("Failed to open store"),
    });
    let sources =
        SourceConfig::new().with_source("CSTO", [format!("{}/feed", mock_server.uri())]);

    let summary = test_orchestrator(store.clone())
        .run(&sources)
        .await
        .expect("Scrape failed");

    assert_eq!(summary.stored, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_empty_listing_is_reported() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/quiet", 200, "<html><body>Nothing today</body></html>").await;

    let store = Arc::new(SqliteReportStore::open_in_memory().expect("Failed to open store"));
    let sources =
        SourceConfig::new().with_source("RU", [format!("{}/quiet", mock_server.uri())]);

    let summary = test_orchestrator(store)
        .run(&sources)
        .await
        .expect("Scrape failed");

    assert_eq!(summary.failed, 0);
    assert_eq!(summary.source("RU").unwrap().empty, 1);
}

#[tokio::test]
async fn test_run_scrape_persists_to_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(
        &mock_server,
        "/tag/war/",
        200,
        r#"<article class="tagCard">
             <h2 class="tagCard__title"><a href="/news/grid-repairs">Grid repairs continue</a></h2>
             <time datetime="2024-11-02T06:00:00Z">2 Nov</time>
           </article>"#,
    )
    .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("reports.db");
    let mut sources = BTreeMap::new();
    sources.insert(
        "KYIVINDEPENDENT".to_string(),
        vec![format!("{}/tag/war/", base_url)],
    );
    let config = create_test_config(sources, db_path.to_str().unwrap());

    let store = SqliteReportStore::open(&db_path).expect("Failed to open store");
    let summary = run_scrape(&config, Arc::new(store))
        .await
        .expect("Scrape failed");
    assert_eq!(summary.stored, 1);

    // Reopen and query the read side
    let store = SqliteReportStore::open(&db_path).expect("Failed to reopen store");
    let reports = store
        .filter_by_source_and_date("Kyiv Independent", "November 02, 2024")
        .unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].title, "Grid repairs continue");
    assert_eq!(reports[0].link, format!("{}/news/grid-repairs", base_url));
}

#[tokio::test]
async fn test_same_source_spacing_holds_with_one_permit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A slow page from another source holds the only permit for a while
    Mock::given(method("GET"))
        .and(path("/by/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(COUNTRY_LISTING)
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&mock_server)
        .await;

    let arrivals = Arc::new(Mutex::new(Vec::new()));
    for route in ["/ua/1", "/ua/2"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ArrivalLog {
                arrivals: Arc::clone(&arrivals),
            })
            .mount(&mock_server)
            .await;
    }

    let settings = ScraperConfig {
        max_concurrent_tasks: 1,
        ..test_settings()
    };
    let fetcher = Fetcher::from_config(&FetcherConfig::default()).expect("Failed to build fetcher");
    let store = Arc::new(SqliteReportStore::open_in_memory().expect("Failed to open store"));
    let gap = Duration::from_millis(500);
    let orchestrator = Orchestrator::new(fetcher, default_registry(), store.clone(), &settings)
        .with_politeness(Politeness::new(gap, gap));

    let sources = SourceConfig::new()
        .with_source("BY", [format!("{}/by/slow", base_url)])
        .with_source(
            "UA",
            [format!("{}/ua/1", base_url), format!("{}/ua/2", base_url)],
        );

    let summary = orchestrator.run(&sources).await.expect("Scrape failed");
    assert_eq!(summary.tasks, 3);
    assert_eq!(summary.failed, 0);

    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 2);

    // Small allowance for request latency jitter
    let spacing = arrivals[1].duration_since(arrivals[0]);
    assert!(
        spacing >= gap - Duration::from_millis(50),
        "UA requests only {:?} apart",
        spacing
    );
}
