use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use super::models::{ApiConfig, PreviewReply, PreviewResponse};
use crate::utils::resolve_reference;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Server answered with HTTP status {0}")]
    Status(StatusCode),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Upper bound on the buffer reserved up front from `Content-Length`.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self { config, http }
    }

    fn base_url(&self) -> Result<Url> {
        let mut base = self.config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url()?.join(path)?)
    }

    /// Make a reference from a preview response absolute.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        Ok(resolve_reference(&self.base_url()?, reference)?)
    }

    /// `POST /preview` with the submitted URL.
    ///
    /// The status code is not inspected: resolvers answer 400/500 together
    /// with an `{ "error": ... }` body, which is a regular rejection.
    pub async fn preview(&self, video_url: &str) -> Result<PreviewReply> {
        let endpoint = self.endpoint("preview")?;
        tracing::debug!(%endpoint, video_url, "requesting preview");

        let response = self
            .http
            .post(endpoint)
            .form(&[("url", video_url)])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let parsed: PreviewResponse = serde_json::from_slice(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("JSON decode error (HTTP {}): {}", status, e))
        })?;

        parsed.into_reply()
    }

    /// `POST /download` with a previously resolved URL.
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        video_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<Bytes>>)> {
        let endpoint = self.endpoint("download")?;
        tracing::debug!(%endpoint, video_url, "requesting download");

        let response = self
            .http
            .post(endpoint)
            .form(&[("url", video_url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }

    /// Download the whole binary body of `/download` into memory.
    pub async fn download(&self, video_url: &str) -> Result<Bytes> {
        let (total_size, stream) = self.download_file_stream(video_url).await?;

        // The header is only a hint; the buffer grows past it if needed.
        let capacity = total_size.map_or(0, |n| n.min(MAX_PREALLOC) as usize);
        let body = stream
            .try_fold(BytesMut::with_capacity(capacity), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?;

        tracing::debug!(bytes = body.len(), "download body received");
        Ok(body.freeze())
    }

    /// Fetch a preview asset such as the thumbnail image.
    pub async fn fetch_asset(&self, asset_url: &str) -> Result<Bytes> {
        let url = self.resolve(asset_url)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        })
    }

    #[test]
    fn test_resolve_relative_reference() {
        let client = ApiClient::new(ApiConfig {
            base_url: "http://localhost:5000".to_string(),
            ..ApiConfig::default()
        });
        assert_eq!(
            client.resolve("/v1.mp4").unwrap().as_str(),
            "http://localhost:5000/v1.mp4"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = ApiClient::new(ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        });
        assert!(matches!(
            client.resolve("/v1.mp4"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_preview_sends_form_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/preview")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::UrlEncoded(
                "url".to_string(),
                "https://example.com/video1".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"thumbnail": "/t1.jpg", "url": "/v1.mp4"}"#)
            .create_async()
            .await;

        let reply = client_for(&server)
            .preview("https://example.com/video1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            reply,
            PreviewReply::Ready {
                title: None,
                thumbnail: Some("/t1.jpg".to_string()),
                url: "/v1.mp4".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_preview_error_body_with_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/preview")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Invalid or missing TikTok URL"}"#)
            .create_async()
            .await;

        let reply = client_for(&server).preview("https://bad.url").await.unwrap();
        assert_eq!(
            reply,
            PreviewReply::Rejected("Invalid or missing TikTok URL".to_string())
        );
    }

    #[tokio::test]
    async fn test_preview_non_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/preview")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let result = client_for(&server).preview("https://example.com/video1").await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_download_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/download")
            .match_body(Matcher::UrlEncoded(
                "url".to_string(),
                "https://example.com/video1".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_body(b"\x00\x00\x00\x18ftypmp42")
            .create_async()
            .await;

        let body = client_for(&server)
            .download("https://example.com/video1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(&body[..], b"\x00\x00\x00\x18ftypmp42");
    }

    #[tokio::test]
    async fn test_download_error_status_is_not_parsed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/download")
            .with_status(500)
            .with_body("Download failed")
            .create_async()
            .await;

        let result = client_for(&server).download("https://example.com/video1").await;
        assert!(matches!(
            result,
            Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[tokio::test]
    async fn test_download_with_oversized_content_length() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000000000000\r\n\r\nabc")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = ApiClient::new(ApiConfig {
            base_url: format!("http://{}/", addr),
            ..ApiConfig::default()
        });
        let result = client.download("https://example.com/video1").await;

        server.await.unwrap();
        assert!(matches!(result, Err(ApiError::RequestError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = ApiClient::new(ApiConfig {
            base_url: "http://127.0.0.1:1/".to_string(),
            ..ApiConfig::default()
        });
        assert!(matches!(
            client.preview("https://example.com/video1").await,
            Err(ApiError::RequestError(_))
        ));
    }
}
