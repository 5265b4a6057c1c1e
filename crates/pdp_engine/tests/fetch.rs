use std::time::Duration;

use pdp_engine::{
    network_retry_wait, pushback_backoff, transient_retry_wait, FetchError, FetchOutcome,
    FetchSettings, Fetcher, PdpFetcher,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings with the backoff zeroed out so retry tests don't sleep.
fn fast_settings(max_retries: u32) -> FetchSettings {
    FetchSettings {
        max_retries,
        backoff_base: 0.0,
        backoff_cap: 0.0,
        backoff_jitter_min: 0.0,
        backoff_jitter_max: 0.0,
        request_timeout: Duration::from_secs(5),
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn success_is_terminal_on_first_attempt() {
    job_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdp/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = PdpFetcher::new(fast_settings(7)).unwrap();
    let report = fetcher.fetch(&format!("{}/pdp/1", server.uri())).await.unwrap();

    assert_eq!(
        report.outcome,
        FetchOutcome::Success {
            body: "<html>ok</html>".to_string()
        }
    );
    assert_eq!(report.attempts, 1);
    assert!(!report.pushback);
}

#[tokio::test]
async fn not_found_is_terminal_and_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdp/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PdpFetcher::new(fast_settings(7)).unwrap();
    let report = fetcher
        .fetch(&format!("{}/pdp/missing", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.outcome, FetchOutcome::NotFound);
    assert_eq!(report.attempts, 1);
    assert!(!report.pushback);
}

#[tokio::test]
async fn rate_limited_twice_then_success_marks_pushback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdp/hot"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pdp/hot"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .mount(&server)
        .await;

    let fetcher = PdpFetcher::new(fast_settings(7)).unwrap();
    let report = fetcher.fetch(&format!("{}/pdp/hot", server.uri())).await.unwrap();

    assert_eq!(
        report.outcome,
        FetchOutcome::Success {
            body: "body".to_string()
        }
    );
    assert_eq!(report.attempts, 3);
    assert!(report.pushback);
}

#[tokio::test]
async fn forbidden_counts_as_pushback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdp/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pdp/blocked"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = PdpFetcher::new(fast_settings(7)).unwrap();
    let report = fetcher
        .fetch(&format!("{}/pdp/blocked", server.uri()))
        .await
        .unwrap();

    assert!(report.pushback);
    assert_eq!(report.attempts, 2);
}

#[tokio::test]
async fn persistent_rate_limiting_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdp/wall"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = PdpFetcher::new(fast_settings(3)).unwrap();
    let report = fetcher.fetch(&format!("{}/pdp/wall", server.uri())).await.unwrap();

    assert_eq!(
        report.outcome,
        FetchOutcome::Failed {
            last_status: Some(429)
        }
    );
    assert_eq!(report.attempts, 3);
    assert!(report.pushback);
}

#[tokio::test]
async fn server_error_retries_without_pushback_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdp/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pdp/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let fetcher = PdpFetcher::new(fast_settings(7)).unwrap();
    let report = fetcher
        .fetch(&format!("{}/pdp/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        FetchOutcome::Success {
            body: "recovered".to_string()
        }
    );
    assert_eq!(report.attempts, 2);
    assert!(!report.pushback);
}

#[tokio::test]
async fn network_error_exhausts_with_no_status() {
    // Port 1 is unassigned; connection is refused immediately.
    let fetcher = PdpFetcher::new(fast_settings(1)).unwrap();
    let report = fetcher.fetch("http://127.0.0.1:1/pdp/1").await.unwrap();

    assert_eq!(report.outcome, FetchOutcome::Failed { last_status: None });
    assert_eq!(report.attempts, 1);
    assert!(!report.pushback);
}

#[tokio::test]
async fn invalid_url_is_a_setup_error() {
    let fetcher = PdpFetcher::new(fast_settings(7)).unwrap();
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}

#[test]
fn wait_schedules_match_the_fixed_parameters() {
    assert_eq!(network_retry_wait(0), 2.0);
    assert_eq!(network_retry_wait(2), 4.5);
    assert_eq!(transient_retry_wait(0), 1.5);
    assert_eq!(transient_retry_wait(3), 3.0);

    assert_eq!(pushback_backoff(0, 4.0, 90.0), 4.0);
    assert_eq!(pushback_backoff(1, 4.0, 90.0), 8.0);
    assert_eq!(pushback_backoff(4, 4.0, 90.0), 64.0);
    // Growth is capped.
    assert_eq!(pushback_backoff(5, 4.0, 90.0), 90.0);
    assert_eq!(pushback_backoff(20, 4.0, 90.0), 90.0);
}
