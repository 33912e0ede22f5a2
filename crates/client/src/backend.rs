//! Backend abstraction consumed by the console controllers.

use async_trait::async_trait;
use heritage_core::models::{
    HeritageContent, HeritageEntry, HeritageUpdate, ImageRecord, QuizItem, QuizUpdate,
};
use heritage_core::types::DbId;

use crate::api::{ApiError, HeritageApi};

/// Every operation the console performs against the backend.
///
/// [`HeritageApi`] is the production implementation. Implementations must
/// not cache; each call is one round trip.
#[async_trait]
pub trait HeritageBackend: Send + Sync {
    fn image_url(&self, filename: &str) -> String;

    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError>;
    async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<(), ApiError>;
    async fn delete_image(&self, image_id: DbId) -> Result<(), ApiError>;

    /// Empty content when the image has not been analyzed.
    async fn fetch_analysis(&self, image_id: DbId) -> Result<HeritageContent, ApiError>;
    async fn analyze_image(&self, image_id: DbId) -> Result<HeritageContent, ApiError>;
    async fn update_analysis(
        &self,
        image_id: DbId,
        content: &HeritageContent,
    ) -> Result<HeritageContent, ApiError>;

    async fn list_heritages(&self) -> Result<Vec<HeritageEntry>, ApiError>;
    async fn fetch_heritage(&self, heritage_id: DbId) -> Result<HeritageEntry, ApiError>;
    async fn update_heritage(
        &self,
        heritage_id: DbId,
        update: &HeritageUpdate,
    ) -> Result<HeritageEntry, ApiError>;

    async fn generate_quiz(&self, heritage_id: DbId) -> Result<serde_json::Value, ApiError>;
    /// Empty when the entry has no quiz yet.
    async fn list_quizzes(&self, heritage_id: DbId) -> Result<Vec<QuizItem>, ApiError>;
    async fn update_quiz(&self, quiz_id: DbId, update: &QuizUpdate) -> Result<QuizItem, ApiError>;
}

#[async_trait]
impl HeritageBackend for HeritageApi {
    fn image_url(&self, filename: &str) -> String {
        HeritageApi::image_url(self, filename)
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError> {
        HeritageApi::list_images(self).await
    }

    async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        HeritageApi::upload_image(self, filename, bytes).await
    }

    async fn delete_image(&self, image_id: DbId) -> Result<(), ApiError> {
        HeritageApi::delete_image(self, image_id).await
    }

    async fn fetch_analysis(&self, image_id: DbId) -> Result<HeritageContent, ApiError> {
        HeritageApi::fetch_analysis(self, image_id).await
    }

    async fn analyze_image(&self, image_id: DbId) -> Result<HeritageContent, ApiError> {
        HeritageApi::analyze_image(self, image_id).await
    }

    async fn update_analysis(
        &self,
        image_id: DbId,
        content: &HeritageContent,
    ) -> Result<HeritageContent, ApiError> {
        HeritageApi::update_analysis(self, image_id, content).await
    }

    async fn list_heritages(&self) -> Result<Vec<HeritageEntry>, ApiError> {
        HeritageApi::list_heritages(self).await
    }

    async fn fetch_heritage(&self, heritage_id: DbId) -> Result<HeritageEntry, ApiError> {
        HeritageApi::fetch_heritage(self, heritage_id).await
    }

    async fn update_heritage(
        &self,
        heritage_id: DbId,
        update: &HeritageUpdate,
    ) -> Result<HeritageEntry, ApiError> {
        HeritageApi::update_heritage(self, heritage_id, update).await
    }

    async fn generate_quiz(&self, heritage_id: DbId) -> Result<serde_json::Value, ApiError> {
        HeritageApi::generate_quiz(self, heritage_id).await
    }

    async fn list_quizzes(&self, heritage_id: DbId) -> Result<Vec<QuizItem>, ApiError> {
        HeritageApi::list_quizzes(self, heritage_id).await
    }

    async fn update_quiz(&self, quiz_id: DbId, update: &QuizUpdate) -> Result<QuizItem, ApiError> {
        HeritageApi::update_quiz(self, quiz_id, update).await
    }
}
