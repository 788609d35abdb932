//! End-to-end extraction over fixture pages with in-memory fetcher and sleeper
use std::sync::Arc;
use std::time::Duration;

use profile_scout_lib::domain::{DegradedReason, ExtractionOutcome, ScrapeRequest};
use profile_scout_lib::infrastructure::{FetchError, HttpClient, HttpClientConfig, ScraperConfig};
use profile_scout_lib::test_utils::{RecordingSleeper, StaticPageFetcher, search_page};
use profile_scout_lib::{ExtractionError, ProfileExtractor};
use proptest::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const BOX_ROWS: &str = include_str!("fixtures/box_rows.html");
const LINKS_ONLY: &str = include_str!("fixtures/links_only.html");
const NO_RESULTS: &str = include_str!("fixtures/no_results.html");

fn extractor_with(fetcher: StaticPageFetcher) -> (ProfileExtractor, Arc<StaticPageFetcher>, Arc<RecordingSleeper>) {
    let fetcher = Arc::new(fetcher);
    let sleeper = Arc::new(RecordingSleeper::new());
    let extractor = ProfileExtractor::new(ScraperConfig::default(), fetcher.clone(), sleeper.clone())
        .expect("default configuration is valid");
    (extractor, fetcher, sleeper)
}

fn identifiers(outcome: &ExtractionOutcome) -> Vec<&str> {
    outcome.records().iter().map(|r| r.identifier()).collect()
}

#[tokio::test]
async fn duplicate_rows_keep_first_occurrence() {
    let (extractor, _, _) =
        extractor_with(StaticPageFetcher::new().with_page(1, search_page(&["alice", "bob", "alice"])));

    let outcome = extractor.extract(&ScrapeRequest::new("javascript", 1)).await.unwrap();

    assert!(!outcome.is_degraded());
    assert_eq!(identifiers(&outcome), vec!["alice", "bob"]);
    assert_eq!(outcome.records()[0].display_name(), "alice display");
}

#[tokio::test]
async fn duplicates_across_pages_are_dropped() {
    let (extractor, _, sleeper) = extractor_with(
        StaticPageFetcher::new()
            .with_page(1, search_page(&["alice", "bob"]))
            .with_page(2, search_page(&["bob", "carol"])),
    );

    let outcome = extractor.extract(&ScrapeRequest::new("javascript", 2)).await.unwrap();

    assert_eq!(identifiers(&outcome), vec!["alice", "bob", "carol"]);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(3_000)]);
}

#[tokio::test]
async fn box_rows_use_later_container_selector() {
    let (extractor, _, _) = extractor_with(StaticPageFetcher::new().with_page(1, BOX_ROWS));

    let outcome = extractor.extract(&ScrapeRequest::new("rust developer", 1)).await.unwrap();

    assert_eq!(identifiers(&outcome), vec!["dana", "fox"]);
    let dana = &outcome.records()[0];
    assert_eq!(dana.display_name(), "Dana Scully");
    assert_eq!(dana.bio(), "Systems programmer, Rust and embedded");
    assert_eq!(dana.location(), "Boston, MA");
    assert_eq!(dana.profile_url(), "https://github.com/dana");

    let fox = &outcome.records()[1];
    assert_eq!(fox.display_name(), "Fox Mulder");
    assert_eq!(fox.location(), "");
}

#[tokio::test]
async fn link_scan_runs_when_no_container_matches() {
    let (extractor, _, _) = extractor_with(StaticPageFetcher::new().with_page(1, LINKS_ONLY));

    let outcome = extractor.extract(&ScrapeRequest::new("rust", 1)).await.unwrap();

    assert_eq!(identifiers(&outcome), vec!["walter", "john"]);
    assert_eq!(outcome.records()[0].display_name(), "Walter Skinner");
    assert_eq!(outcome.records()[1].display_name(), "john");
    assert!(
        outcome
            .records()
            .iter()
            .all(|r| r.bio() == "Profile extracted using fallback method")
    );
}

#[tokio::test]
async fn blocked_first_page_returns_placeholders() {
    let (extractor, fetcher, sleeper) = extractor_with(StaticPageFetcher::new().with_error(
        1,
        FetchError::Blocked { status: 403, url: "https://github.com/search".into() },
    ));

    let outcome = extractor.extract(&ScrapeRequest::new("rust", 3)).await.unwrap();

    assert_eq!(identifiers(&outcome), vec!["sample-dev1", "sample-dev2", "sample-dev3"]);
    match &outcome {
        ExtractionOutcome::Degraded { reason, .. } => {
            assert_eq!(*reason, DegradedReason::Blocked { page: 1, status: 403 });
        }
        other => panic!("expected degraded outcome, got {other:?}"),
    }
    assert_eq!(fetcher.requested_pages(), vec![1]);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn empty_run_returns_placeholders() {
    let (extractor, _, _) = extractor_with(
        StaticPageFetcher::new()
            .with_page(1, NO_RESULTS)
            .with_page(2, NO_RESULTS),
    );

    let outcome = extractor.extract(&ScrapeRequest::new("zzzz", 2)).await.unwrap();

    assert_eq!(identifiers(&outcome), vec!["sample-dev1", "sample-dev2", "sample-dev3"]);
    assert!(outcome.records().iter().all(|r| r.is_placeholder()));
    assert!(matches!(
        outcome,
        ExtractionOutcome::Degraded { reason: DegradedReason::NothingFound { pages: 2 }, .. }
    ));
}

#[tokio::test]
async fn server_error_surfaces_as_failure() {
    let (extractor, _, _) = extractor_with(
        StaticPageFetcher::new()
            .with_page(1, search_page(&["alice"]))
            .with_error(2, FetchError::HttpStatus { status: 502, url: "https://github.com/search".into() }),
    );

    let err = extractor.extract(&ScrapeRequest::new("rust", 2)).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Transport { page: 2, .. }));
    assert!(err.to_string().starts_with("profile extraction failed: "));
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn page_count_is_clamped() {
    let (extractor, fetcher, sleeper) = extractor_with(StaticPageFetcher::new().with_page(1, search_page(&["alice"])));

    extractor.extract(&ScrapeRequest::new("rust", 12)).await.unwrap();

    assert_eq!(fetcher.requested_pages(), vec![1, 2, 3, 4, 5]);
    assert_eq!(sleeper.delays().len(), 4);
}

#[tokio::test]
async fn empty_http_response_falls_back_to_placeholders() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let _ = socket.shutdown().await;
    });

    let config = ScraperConfig {
        base_url: format!("http://{addr}"),
        ..ScraperConfig::default()
    };
    let client = HttpClient::with_config(HttpClientConfig::from_scraper_config(&config)).unwrap();
    let extractor = ProfileExtractor::new(config, Arc::new(client), Arc::new(RecordingSleeper::new())).unwrap();

    let outcome = extractor.extract(&ScrapeRequest::new("x", 1)).await.unwrap();

    assert!(matches!(
        outcome,
        ExtractionOutcome::Degraded { reason: DegradedReason::NothingFound { pages: 1 }, .. }
    ));
    assert_eq!(identifiers(&outcome), vec!["sample-dev1", "sample-dev2", "sample-dev3"]);
}

proptest! {
    #[test]
    fn extraction_never_repeats_identifiers(ids in proptest::collection::vec("[a-e]", 1..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (extractor, _, _) = extractor_with(StaticPageFetcher::new().with_page(1, search_page(&refs)));

        let outcome = runtime.block_on(extractor.extract(&ScrapeRequest::new("x", 1))).unwrap();

        let mut expected: Vec<&str> = Vec::new();
        for id in &refs {
            if !expected.contains(id) {
                expected.push(id);
            }
        }
        prop_assert_eq!(identifiers(&outcome), expected);
    }
}
