use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use pitwall_core::{ApiRequest, ApiResponse, Backend, FetchError, Method};

/// Talks to the dashboard server over HTTP. Status and body are passed
/// through untouched; the pipelines decide what counts as a failure.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let url = self.url(request);
        debug!("{} {url}", request.method().as_str());

        let builder = match request.method() {
            Method::Get => self.client.get(&url).query(&request.params),
            Method::Post => self.client.post(&url).form(&request.params),
        };
        let response = builder.send().await.map_err(network_failure)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(network_failure)?;
        Ok(ApiResponse::new(status, body))
    }
}

fn network_failure(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Network(format!("request timed out: {err}"))
    } else {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use pitwall_core::{Endpoint, FailureKind, Selection};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Accepts one connection, records the request head and answers with
    /// `reply`.
    async fn serve_once(
        reply: &'static str,
    ) -> Result<(String, JoinHandle<String>), Box<dyn Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let handle = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                return String::new();
            };
            let mut received = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !request_complete(&received) {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => received.extend_from_slice(&chunk[..read]),
                }
            }
            let _ = stream.write_all(reply.as_bytes()).await;
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&received).to_string()
        });
        Ok((base_url, handle))
    }

    fn request_complete(received: &[u8]) -> bool {
        let Some(head_end) = received
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
        else {
            return false;
        };
        let head = String::from_utf8_lossy(&received[..head_end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        received.len() >= head_end + 4 + body_len
    }

    #[test]
    fn joins_the_base_url_without_doubling_slashes() -> Result<(), Box<dyn Error>> {
        let backend = HttpBackend::new("http://127.0.0.1:5000/", Duration::from_secs(1))?;
        let request = ApiRequest::for_selection(
            Endpoint::TyreStrategy,
            &Selection::new("2023", Some("Bahrain Grand Prix".to_string())),
        );

        assert_eq!(backend.url(&request), "http://127.0.0.1:5000/tyre_strategy");
        Ok(())
    }

    #[tokio::test]
    async fn calendar_is_a_get_with_the_year_in_the_query() -> Result<(), Box<dyn Error>> {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 22\r\nConnection: close\r\n\r\n[\"Bahrain Grand Prix\"]",
        )
        .await?;
        let backend = HttpBackend::new(&base_url, Duration::from_secs(5))?;

        let response = backend.send(&ApiRequest::events("2023")).await?;
        let head = server.await?;

        assert!(head.starts_with("GET /events?year=2023 HTTP/1.1"), "{head}");
        assert_eq!(response.status, 200);
        assert_eq!(response.body.trim(), "[\"Bahrain Grand Prix\"]");
        Ok(())
    }

    #[tokio::test]
    async fn error_statuses_are_passed_through() -> Result<(), Box<dyn Error>> {
        let (base_url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await?;
        let backend = HttpBackend::new(&base_url, Duration::from_secs(5))?;
        let request = ApiRequest::for_selection(
            Endpoint::Results,
            &Selection::new("2023", Some("Bahrain Grand Prix".to_string())),
        );

        let response = backend.send(&request).await?;
        let head = server.await?;

        assert!(head.starts_with("POST /results HTTP/1.1"), "{head}");
        assert!(head
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
        assert_eq!(response.status, 500);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_failure() -> Result<(), Box<dyn Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        drop(listener);
        let backend = HttpBackend::new(&base_url, Duration::from_secs(5))?;

        let err = backend.send(&ApiRequest::events("2023")).await;

        assert_eq!(err.map_err(|err| err.kind()), Err(FailureKind::NetworkFailure));
        Ok(())
    }
}
