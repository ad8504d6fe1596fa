// ABOUTME: Integration tests for the functional verifier and the HTTP client.
// ABOUTME: Covers health waiting, create/read-back integrity and best-effort cleanup.

mod support;

use deployline::diagnostics::WarningKind;
use deployline::pipeline::{StageError, StageResult};
use deployline::poll::PollPolicy;
use deployline::verify::{
    ApiClient, ApiMethod, ApiRequest, ApiResponse, FunctionalVerifier, HttpClient, HttpError,
    NewProduct,
};
use std::time::Duration;
use support::fake_api::FakeApi;
use support::http_server::serve_once;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const BASE: &str = "http://imp-product-catalog.staging.svc.cluster.local:80";

fn health(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(Duration::from_secs(5), max_attempts)
}

mod functional {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn creates_reads_back_and_cleans_up() {
        let api = FakeApi::new().unhealthy_for(2);
        let verifier = FunctionalVerifier::new(&api, health(24), NewProduct::default());

        let result = verifier.verify(BASE, &CancellationToken::new()).await;

        let record = match result {
            StageResult::Success(record) => record,
            other => panic!("expected success, got {other:?}"),
        };
        assert_eq!(record.identifier(), Some("prod-1"));
        assert_eq!(record.name.as_deref(), Some("deployline-verification-product"));
        assert_eq!(api.stored(), 0);

        let methods: Vec<ApiMethod> = api.requests().into_iter().map(|(m, _)| m).collect();
        assert_eq!(
            methods,
            vec![
                ApiMethod::Get,
                ApiMethod::Get,
                ApiMethod::Get,
                ApiMethod::Post,
                ApiMethod::Get,
                ApiMethod::Delete,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unhealthy_service_is_a_hard_failure() {
        let api = FakeApi::new().unhealthy_for(10);
        let verifier = FunctionalVerifier::new(&api, health(3), NewProduct::default());

        let result = verifier.verify(BASE, &CancellationToken::new()).await;

        match result.error() {
            Some(StageError::NotReady { attempts, .. }) => assert_eq!(*attempts, 3),
            other => panic!("expected NotReady, got {other:?}"),
        }
        assert!(
            api.requests()
                .iter()
                .all(|(m, url)| *m == ApiMethod::Get && url.ends_with("/health"))
        );
    }

    #[tokio::test]
    async fn blank_identifier_fails_verification() {
        let api = FakeApi::new().with_blank_ids();
        let verifier = FunctionalVerifier::new(&api, health(1), NewProduct::default());

        let result = verifier.verify(BASE, &CancellationToken::new()).await;

        assert!(matches!(result.error(), Some(StageError::NoIdentifier)));
        assert_eq!(
            result.error().map(ToString::to_string).as_deref(),
            Some("no identifier returned")
        );
    }

    #[tokio::test]
    async fn mismatched_name_is_an_integrity_violation() {
        let api = FakeApi::new().renaming_on_read("something-else");
        let verifier = FunctionalVerifier::new(&api, health(1), NewProduct::default());

        let result = verifier.verify(BASE, &CancellationToken::new()).await;

        match result.error() {
            Some(StageError::IntegrityViolation {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(*field, "name");
                assert_eq!(expected, "deployline-verification-product");
                assert_eq!(actual, "something-else");
            }
            other => panic!("expected integrity violation, got {other:?}"),
        }
        // Test data is still removed after a mismatch.
        assert_eq!(api.stored(), 0);
    }

    #[tokio::test]
    async fn failed_cleanup_is_only_a_warning() {
        let api = FakeApi::new().failing_deletes();
        let verifier = FunctionalVerifier::new(&api, health(1), NewProduct::default());

        let result = verifier.verify(BASE, &CancellationToken::new()).await;

        assert!(result.is_warning());
        assert_eq!(result.warnings()[0].kind, WarningKind::CleanupFailed);
    }

    #[tokio::test]
    async fn cancelled_before_start_sends_nothing() {
        let api = FakeApi::new();
        let verifier = FunctionalVerifier::new(&api, health(24), NewProduct::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = verifier.verify(BASE, &cancel).await;

        assert!(matches!(result, StageResult::HardFailure(StageError::Cancelled)));
        assert!(api.requests().is_empty());
    }
}

/// Catalog that stores nothing and answers with its own field types.
struct LooseSchemaApi;

#[async_trait::async_trait]
impl ApiClient for LooseSchemaApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let record = r#"{"id":"abc","name":"p1","description":"d","price":"9.99","created_at":1700000000}"#;
        let (status, body) = match request.method {
            ApiMethod::Get if request.url.ends_with("/health") => (200, "ok"),
            ApiMethod::Post | ApiMethod::Get => (200, record),
            ApiMethod::Delete => (204, ""),
        };
        Ok(ApiResponse {
            status,
            body: bytes::Bytes::from_static(body.as_bytes()),
        })
    }
}

mod schema {
    use super::*;

    #[tokio::test]
    async fn non_canonical_field_types_still_verify() {
        let payload = NewProduct {
            name: "p1".to_string(),
            description: "d".to_string(),
            price: 9.99,
        };
        let verifier = FunctionalVerifier::new(LooseSchemaApi, health(1), payload);

        let result = verifier.verify("http://svc", &CancellationToken::new()).await;

        match result {
            StageResult::Success(record) => assert_eq!(record.identifier(), Some("abc")),
            other => panic!("expected success, got {other:?}"),
        }
    }
}

mod http_client {
    use super::*;

    #[tokio::test]
    async fn sends_json_post_and_reads_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 201 Created\r\ncontent-type: application/json\r\ncontent-length: 13\r\nconnection: close\r\n\r\n{\"id\":\"abc\"}\n",
        )
        .await;

        let client = HttpClient::new(Duration::from_secs(5));
        let request =
            ApiRequest::post_json(format!("{base}/products"), &NewProduct::default()).unwrap();
        let response = client.send(request).await.unwrap();

        assert_eq!(response.status, 201);
        assert!(response.is_success());
        let head = server.await.unwrap();
        assert!(head.starts_with("POST /products HTTP/1.1"));
        assert!(head.to_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn rejects_https_urls() {
        let client = HttpClient::new(Duration::from_secs(5));

        let err = client
            .send(ApiRequest::get("https://example.com/health"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[tokio::test]
    async fn reaches_ipv6_loopback() {
        // Hosts without IPv6 loopback have nothing to test.
        let Ok(listener) = TcpListener::bind("[::1]:0").await else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
        });

        let client = HttpClient::new(Duration::from_secs(5));
        let response = client
            .send(ApiRequest::get(format!("http://[::1]:{port}/health")))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(Duration::from_secs(5));
        let result = client.send(ApiRequest::get(format!("http://{addr}/health"))).await;

        assert!(result.is_err());
    }
}
