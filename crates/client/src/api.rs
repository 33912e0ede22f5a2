//! HTTP wrapper around the heritage backend endpoints.
//!
//! Each method performs exactly one request and either returns the parsed
//! body or an [`ApiError`]. There are no retries and no caching; callers
//! own every state update.

use heritage_core::models::{
    HeritageContent, HeritageEntry, HeritageUpdate, ImageRecord, QuizItem, QuizUpdate,
};
use heritage_core::types::DbId;
use reqwest::StatusCode;
use serde::Deserialize;

/// HTTP client for a single backend origin.
#[derive(Debug, Clone)]
pub struct HeritageApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("{message} (status: {status})")]
    Status {
        status: u16,
        /// The backend's `detail` text, or a per-operation default.
        message: String,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Error body shape used by the backend (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HeritageApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Backend origin, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Images are served by reference under the backend origin.
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, filename)
    }

    // ---- images ----

    /// `GET /image/all`
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError> {
        tracing::debug!("Fetching image list");
        let response = self.client.get(self.url("/image/all")).send().await?;
        Self::parse_response(response, "failed to fetch images").await
    }

    /// `POST /image/upload` as multipart with the file in field `image`.
    pub async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        tracing::debug!(filename, size = bytes.len(), "Uploading image");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(self.url("/image/upload"))
            .multipart(form)
            .send()
            .await?;

        Self::check_status(response, "failed to upload image").await
    }

    /// `DELETE /image/delete/{image_id}`
    pub async fn delete_image(&self, image_id: DbId) -> Result<(), ApiError> {
        tracing::debug!(image_id, "Deleting image");
        let response = self
            .client
            .delete(self.url(&format!("/image/delete/{image_id}")))
            .send()
            .await?;

        Self::check_status(response, "failed to delete image").await
    }

    // ---- analysis ----

    /// `POST /heritage/view/{image_id}`
    ///
    /// A 404 means the image has not been analyzed yet and yields empty
    /// content rather than an error.
    pub async fn fetch_analysis(&self, image_id: DbId) -> Result<HeritageContent, ApiError> {
        tracing::debug!(image_id, "Fetching analysis");
        let response = self
            .client
            .post(self.url(&format!("/heritage/view/{image_id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(image_id, "Image not analyzed yet");
            return Ok(HeritageContent::default());
        }
        Self::parse_response(response, "failed to fetch analysis").await
    }

    /// `POST /heritage/preview/{image_id}`: run the analysis and persist it.
    pub async fn analyze_image(&self, image_id: DbId) -> Result<HeritageContent, ApiError> {
        tracing::debug!(image_id, "Requesting analysis");
        let response = self
            .client
            .post(self.url(&format!("/heritage/preview/{image_id}")))
            .send()
            .await?;

        Self::parse_response(response, "failed to analyze image").await
    }

    /// `PUT /heritage/update/{image_id}` with the whole analysis envelope.
    pub async fn update_analysis(
        &self,
        image_id: DbId,
        content: &HeritageContent,
    ) -> Result<HeritageContent, ApiError> {
        tracing::debug!(image_id, entries = content.content.len(), "Saving analysis");
        let response = self
            .client
            .put(self.url(&format!("/heritage/update/{image_id}")))
            .json(content)
            .send()
            .await?;

        Self::parse_response(response, "failed to save analysis").await
    }

    // ---- heritage entries ----

    /// `GET /heritage/all`
    pub async fn list_heritages(&self) -> Result<Vec<HeritageEntry>, ApiError> {
        tracing::debug!("Fetching heritage list");
        let response = self.client.get(self.url("/heritage/all")).send().await?;
        Self::parse_response(response, "failed to fetch heritage entries").await
    }

    /// `GET /heritage/detail/{heritage_id}`
    pub async fn fetch_heritage(&self, heritage_id: DbId) -> Result<HeritageEntry, ApiError> {
        tracing::debug!(heritage_id, "Fetching heritage detail");
        let response = self
            .client
            .get(self.url(&format!("/heritage/detail/{heritage_id}")))
            .send()
            .await?;

        Self::parse_response(response, "failed to fetch heritage entry").await
    }

    /// `PUT /heritage/update/{heritage_id}` with every editable field.
    pub async fn update_heritage(
        &self,
        heritage_id: DbId,
        update: &HeritageUpdate,
    ) -> Result<HeritageEntry, ApiError> {
        tracing::debug!(heritage_id, "Saving heritage entry");
        let response = self
            .client
            .put(self.url(&format!("/heritage/update/{heritage_id}")))
            .json(update)
            .send()
            .await?;

        Self::parse_response(response, "failed to save heritage entry").await
    }

    // ---- quizzes ----

    /// `POST /heritage/quiz/{heritage_id}`
    ///
    /// The response shape is not relied on; callers re-fetch the quiz list.
    pub async fn generate_quiz(&self, heritage_id: DbId) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(heritage_id, "Requesting quiz generation");
        let response = self
            .client
            .post(self.url(&format!("/heritage/quiz/{heritage_id}")))
            .send()
            .await?;

        Self::parse_response(response, "failed to generate quiz").await
    }

    /// `GET /quiz/heritage/{heritage_id}`
    ///
    /// A 404 means no quiz exists for the entry yet.
    pub async fn list_quizzes(&self, heritage_id: DbId) -> Result<Vec<QuizItem>, ApiError> {
        tracing::debug!(heritage_id, "Fetching quizzes");
        let response = self
            .client
            .get(self.url(&format!("/quiz/heritage/{heritage_id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        Self::parse_response(response, "failed to fetch quizzes").await
    }

    /// `PUT /quiz/update/{quiz_id}`
    pub async fn update_quiz(
        &self,
        quiz_id: DbId,
        update: &QuizUpdate,
    ) -> Result<QuizItem, ApiError> {
        tracing::debug!(quiz_id, "Saving quiz");
        let response = self
            .client
            .put(self.url(&format!("/quiz/update/{quiz_id}")))
            .json(update)
            .send()
            .await?;

        Self::parse_response(response, "failed to save quiz").await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ensure the response has a success status code. On failure the
    /// backend's `detail` text is preferred over `fallback`.
    async fn ensure_success(
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(detail),
            }) if !detail.is_empty() => detail,
            _ => fallback.to_string(),
        };

        tracing::warn!(status = status.as_u16(), %message, "Backend request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response, fallback).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response, fallback: &str) -> Result<(), ApiError> {
        Self::ensure_success(response, fallback).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HeritageApi::new("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.image_url("a.jpg"), "http://localhost:8000/a.jpg");
    }

    #[test]
    fn status_error_message_includes_code() {
        let err = ApiError::Status {
            status: 500,
            message: "failed to save heritage entry".into(),
        };
        assert_eq!(err.to_string(), "failed to save heritage entry (status: 500)");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_not_found());
    }
}
