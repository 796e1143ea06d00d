//! Pushgateway client tests against a mock HTTP gateway.

use backend_metrics::config::{MetricsConfig, PushgatewayConfig};
use backend_metrics::domain::MetricsError;
use backend_metrics::infrastructure::observability::{
    Metrics, PushgatewayClient, TEXT_CONTENT_TYPE,
};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn metrics() -> Metrics {
    Metrics::new(&MetricsConfig {
        collect_process_metrics: false,
        ..MetricsConfig::default()
    })
    .expect("Failed to create metrics")
}

fn client(url: String, metrics: Metrics) -> PushgatewayClient {
    PushgatewayClient::new(&PushgatewayConfig::default().with_url(url), metrics)
        .expect("Failed to create client")
}

/// The single request the gateway received
async fn only_request(server: &MockServer) -> Request {
    let mut requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1, "{:?}", requests);
    requests.remove(0)
}

/// An address nothing listens on
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[tokio::test]
async fn test_push_uses_default_job_and_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics/job/test-backend"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = metrics();
    metrics
        .http_requests_total
        .with_label_values(&["GET", "/x", "200"])
        .inc();

    let outcome = client(server.uri(), metrics).push_metrics(None).await;

    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(outcome.job(), "test-backend");

    let request = only_request(&server).await;
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.url.path(), "/metrics/job/test-backend");
    assert_eq!(
        request
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some(TEXT_CONTENT_TYPE)
    );

    let body = String::from_utf8(request.body).unwrap();
    assert!(body.contains("# TYPE http_requests_total counter"));
    assert!(body.contains("app=\"test-backend\""));
}

#[tokio::test]
async fn test_push_of_fresh_registry_carries_every_family() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = client(server.uri(), metrics()).push_metrics(None).await;
    assert!(outcome.is_success(), "{}", outcome);

    let body = String::from_utf8(only_request(&server).await.body).unwrap();
    assert_eq!(body.lines().filter(|l| l.starts_with("# TYPE ")).count(), 14);
    assert!(body.contains("# TYPE queue_depth gauge"));
}

#[tokio::test]
async fn test_push_tags_explicit_job_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics/job/nightly-job"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(server.uri(), metrics())
        .push_metrics(Some("nightly-job"))
        .await;

    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(outcome.job(), "nightly-job");
    assert_eq!(only_request(&server).await.url.path(), "/metrics/job/nightly-job");
}

#[tokio::test]
async fn test_rejected_push_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("text format parsing error\n"))
        .mount(&server)
        .await;
    let client = client(server.uri(), metrics());

    let err = client.try_push(None).await.unwrap_err();
    match err {
        MetricsError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "text format parsing error");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_gateway_is_reported_not_raised() {
    let addr = closed_addr().await;
    let client = client(format!("http://{}", addr), metrics());

    let outcome = client.push_metrics(None).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.job(), "test-backend");
    assert!(outcome.reason().is_some_and(|r| r.contains("transport error")));
}

/// Collects formatted log lines in memory
#[derive(Clone, Default)]
struct CapturedLogs {
    lines: Arc<Mutex<Vec<String>>>,
}

struct CapturedLogsWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl io::Write for CapturedLogsWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let msg = String::from_utf8_lossy(buf).to_string();
        self.lines.lock().unwrap().push(msg);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogsWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedLogsWriter {
            lines: self.lines.clone(),
        }
    }
}

#[tokio::test]
async fn test_unreachable_gateway_logs_exactly_one_error() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("backend_metrics=error"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(logs.clone())
                .with_ansi(false),
        );
    let _guard = tracing::subscriber::set_default(subscriber);

    let addr = closed_addr().await;
    let outcome = client(format!("http://{}", addr), metrics())
        .push_metrics(None)
        .await;

    let reason = outcome.reason().expect("push should fail").to_string();
    let lines = logs.lines.lock().unwrap().clone();
    let failures: Vec<&String> = lines.iter().filter(|l| l.contains("push failed")).collect();

    assert_eq!(failures.len(), 1, "{:?}", lines);
    assert!(failures[0].contains("ERROR"));
    assert!(failures[0].contains(&reason));
}
