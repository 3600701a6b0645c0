use serde::{Deserialize, Serialize};

use super::client::{ApiError, Result};

/// Body of a `/preview` response.
///
/// Resolvers differ in what they send next to the two references (`title`,
/// `success`), so every field is optional and the shape is decided by
/// [`PreviewResponse::into_reply`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// What the server said about a submitted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewReply {
    Ready {
        title: Option<String>,
        thumbnail: Option<String>,
        url: String,
    },
    Rejected(String),
}

impl PreviewResponse {
    pub fn into_reply(self) -> Result<PreviewReply> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Ok(PreviewReply::Rejected(error));
        }

        match self.url.filter(|u| !u.is_empty()) {
            Some(url) => Ok(PreviewReply::Ready {
                title: self.title.filter(|t| !t.is_empty()),
                thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
                url,
            }),
            None if self.success == Some(false) => {
                Ok(PreviewReply::Rejected("No extractor worked.".to_string()))
            }
            None => Err(ApiError::InvalidResponse(
                "preview response has neither `url` nor `error`".to_string(),
            )),
        }
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address of the resolver serving `/preview` and `/download`.
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<PreviewReply> {
        serde_json::from_str::<PreviewResponse>(body)
            .unwrap()
            .into_reply()
    }

    #[test]
    fn test_success_shape() {
        let reply = parse(r#"{"thumbnail": "/t1.jpg", "url": "/v1.mp4"}"#).unwrap();
        assert_eq!(
            reply,
            PreviewReply::Ready {
                title: None,
                thumbnail: Some("/t1.jpg".to_string()),
                url: "/v1.mp4".to_string(),
            }
        );
    }

    #[test]
    fn test_success_with_extra_fields_and_null_thumbnail() {
        let reply =
            parse(r#"{"success": true, "title": "clip", "thumbnail": null, "url": "/v1.mp4"}"#)
                .unwrap();
        assert_eq!(
            reply,
            PreviewReply::Ready {
                title: Some("clip".to_string()),
                thumbnail: None,
                url: "/v1.mp4".to_string(),
            }
        );
    }

    #[test]
    fn test_error_wins_over_references() {
        let reply = parse(r#"{"error": "Invalid URL", "url": "/v1.mp4"}"#).unwrap();
        assert_eq!(reply, PreviewReply::Rejected("Invalid URL".to_string()));

        let reply = parse(r#"{"success": false, "error": "Invalid URL"}"#).unwrap();
        assert_eq!(reply, PreviewReply::Rejected("Invalid URL".to_string()));
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let reply = parse(r#"{"error": "", "thumbnail": "/t1.jpg", "url": "/v1.mp4"}"#).unwrap();
        assert!(matches!(reply, PreviewReply::Ready { .. }));
    }

    #[test]
    fn test_missing_references() {
        assert!(matches!(parse("{}"), Err(ApiError::InvalidResponse(_))));
        assert_eq!(
            parse(r#"{"success": false}"#).unwrap(),
            PreviewReply::Rejected("No extractor worked.".to_string())
        );
    }
}
