use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::config::NotionConfig;
use crate::record::SubscriptionRecord;

use super::types::{ApiErrorBody, QueryBody, QueryResponse};
use super::{FetchError, SubscriptionSource};

/// Reads subscription records from a Notion database.
#[derive(Clone)]
pub struct NotionSource {
    http: HttpClient,
    cfg: NotionConfig,
}

impl NotionSource {
    pub fn new(cfg: NotionConfig) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(FetchError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    #[cfg(test)]
    fn with_http(cfg: NotionConfig, http: HttpClient) -> Self {
        Self { http, cfg }
    }

    fn resolve_token(&self) -> Result<&str, FetchError> {
        self.cfg.token.as_deref().ok_or(FetchError::MissingToken)
    }

    fn endpoint(&self) -> Result<String, FetchError> {
        let db = self.cfg.database_id.as_deref().ok_or(FetchError::MissingDatabase)?;
        Ok(format!(
            "{}/databases/{}/query",
            self.cfg.base_url.trim_end_matches('/'),
            db
        ))
    }
}

#[async_trait]
impl SubscriptionSource for NotionSource {
    async fn fetch_records(&self) -> Result<Vec<SubscriptionRecord>, FetchError> {
        let token = self.resolve_token()?;
        let endpoint = self.endpoint()?;

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(token)
            .header("Notion-Version", &self.cfg.notion_version)
            .json(&QueryBody::live_by_renewal())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;

        if !status.is_success() {
            let api_err = serde_json::from_slice::<ApiErrorBody>(&bytes).ok();
            return Err(FetchError::Api {
                status,
                error: api_err.unwrap_or_default(),
            });
        }

        let parsed: QueryResponse = serde_json::from_slice(&bytes).map_err(FetchError::Decode)?;
        if parsed.has_more {
            debug!(results = parsed.results.len(), "more results available; only the first page is read");
        }
        Ok(parsed.results.iter().map(|p| p.to_record()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn cfg(base_url: String) -> NotionConfig {
        NotionConfig {
            token: Some("secret_test".into()),
            database_id: Some("db123".into()),
            base_url,
            notion_version: "2022-06-28".into(),
            timeout: Duration::from_secs(5),
        }
    }

    // loopback only; ignore any proxy configured in the environment
    fn local_source(base: String) -> NotionSource {
        let http = HttpClient::builder().no_proxy().timeout(Duration::from_secs(5)).build().unwrap();
        NotionSource::with_http(cfg(base), http)
    }

    // Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{}/v1", addr), handle)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(head_end) = text.find("\r\n\r\n") else { return false };
        let content_length = text[..head_end]
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok()).flatten()
            })
            .unwrap_or(0);
        buf.len() >= head_end + 4 + content_length
    }

    #[test]
    fn endpoint_joins_base_and_database() {
        let src = NotionSource::new(cfg("https://api.notion.com/v1/".into())).unwrap();
        assert_eq!(src.endpoint().unwrap(), "https://api.notion.com/v1/databases/db123/query");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_io() {
        let mut c = cfg("http://127.0.0.1:9/v1".into());
        c.token = None;
        let src = NotionSource::new(c.clone()).unwrap();
        assert!(matches!(src.fetch_records().await, Err(FetchError::MissingToken)));

        c.token = Some("t".into());
        c.database_id = None;
        let src = NotionSource::new(c).unwrap();
        assert!(matches!(src.fetch_records().await, Err(FetchError::MissingDatabase)));
    }

    #[tokio::test]
    async fn fetches_and_maps_pages() {
        let body = r#"{"object":"list","results":[
            {"id":"p1","properties":{"Name":{"title":[{"plain_text":"Netflix"}]},"Cost":{"number":15.49}}},
            {"id":"p2","properties":{}}
        ],"has_more":false}"#;
        let (base, server) = serve_once("200 OK", body).await;
        let src = local_source(base);

        let records = src.fetch_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Netflix");
        assert_eq!(records[0].cost, 15.49);
        assert_eq!(records[1].name, "Untitled");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /v1/databases/db123/query"));
        assert!(request.contains("authorization: bearer secret_test"));
        assert!(request.contains("notion-version: 2022-06-28"));
        assert!(request.contains("\"does_not_equal\":\"cancelled\""));
    }

    #[tokio::test]
    async fn non_success_decodes_api_error() {
        let body = r#"{"object":"error","status":401,"code":"unauthorized","message":"API token is invalid."}"#;
        let (base, server) = serve_once("401 Unauthorized", body).await;
        let src = local_source(base);

        match src.fetch_records().await {
            Err(FetchError::Api { status, error }) => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(error.code.as_deref(), Some("unauthorized"));
                assert_eq!(error.message, "API token is invalid.");
            }
            other => panic!("expected api error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", "not json").await;
        let src = local_source(base);
        assert!(matches!(src.fetch_records().await, Err(FetchError::Decode(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn slow_server_is_a_timeout_and_refused_connection_is_http() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(sock);
        });
        let http = HttpClient::builder().no_proxy().timeout(Duration::from_millis(200)).build().unwrap();
        let src = NotionSource::with_http(cfg(format!("http://{}/v1", addr)), http);
        let err = src.fetch_records().await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout), "got {err:?}");
        assert_eq!(err.kind(), "network");
        server.abort();

        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/v1", closed.local_addr().unwrap());
        drop(closed);
        let err = local_source(base).fetch_records().await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "got {err:?}");
    }
}
