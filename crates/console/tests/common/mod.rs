//! In-memory [`HeritageBackend`] for page and command tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use heritage_client::{ApiError, HeritageBackend};
use heritage_core::models::{
    HeritageContent, HeritageEntry, HeritageUpdate, ImageRecord, QuizItem, QuizUpdate,
};
use heritage_core::types::DbId;

#[derive(Default)]
struct State {
    next_id: DbId,
    images: Vec<ImageRecord>,
    analyses: HashMap<DbId, HeritageContent>,
    /// What `analyze_image` will extract per image.
    pending: HashMap<DbId, Vec<HeritageEntry>>,
    heritages: Vec<HeritageEntry>,
    quizzes: Vec<QuizItem>,
    failing: HashSet<&'static str>,
    calls: Vec<&'static str>,
}

/// Fake backend keeping everything in memory. Operations named in
/// [`FakeBackend::fail`] answer 500 until [`FakeBackend::recover`].
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

pub fn entry(id: DbId, title: &str) -> HeritageEntry {
    HeritageEntry {
        id,
        title: title.to_string(),
        description: Some(format!("About {title}")),
        summary: None,
        simple_summary: None,
        criteria: Some(vec![1, 4]),
        unesco_tag: Some("文化遺産".to_string()),
        country: Some(vec!["日本".to_string()]),
        region: Some(vec!["アジア".to_string()]),
        feature: None,
    }
}

pub fn quiz(id: DbId, heritage_id: DbId) -> QuizItem {
    QuizItem {
        id,
        heritage_id,
        question: format!("Question {id}?"),
        options: vec!["A".to_string(), "B".to_string()],
        answer: "A".to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
        }
    }

    pub fn with_image(&self, id: DbId, filename: &str) {
        self.state.lock().unwrap().images.push(ImageRecord {
            id,
            filename: filename.to_string(),
            timestamp: "2024-05-01T10:00:00".to_string(),
        });
    }

    /// Remove an image behind the console's back.
    pub fn drop_image(&self, id: DbId) {
        let mut state = self.state.lock().unwrap();
        state.images.retain(|img| img.id != id);
        state.analyses.remove(&id);
    }

    pub fn with_analysis(&self, image_id: DbId, entries: Vec<HeritageEntry>) {
        let mut state = self.state.lock().unwrap();
        state.heritages.extend(entries.iter().cloned());
        state
            .analyses
            .insert(image_id, HeritageContent { content: entries });
    }

    pub fn with_pending_analysis(&self, image_id: DbId, entries: Vec<HeritageEntry>) {
        self.state.lock().unwrap().pending.insert(image_id, entries);
    }

    pub fn with_heritage(&self, entry: HeritageEntry) {
        self.state.lock().unwrap().heritages.push(entry);
    }

    pub fn with_quiz(&self, item: QuizItem) {
        self.state.lock().unwrap().quizzes.push(item);
    }

    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    /// How many times `operation` was called.
    pub fn calls(&self, operation: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.iter().filter(|c| **c == operation).count()
    }

    pub fn heritage(&self, id: DbId) -> Option<HeritageEntry> {
        let state = self.state.lock().unwrap();
        state.heritages.iter().find(|e| e.id == id).cloned()
    }

    pub fn image_count(&self) -> usize {
        self.state.lock().unwrap().images.len()
    }

    fn enter(&self, operation: &'static str) -> Result<std::sync::MutexGuard<'_, State>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{operation} failed"),
            });
        }
        Ok(state)
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl HeritageBackend for FakeBackend {
    fn image_url(&self, filename: &str) -> String {
        format!("http://fake/{filename}")
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError> {
        let state = self.enter("list_images")?;
        Ok(state.images.clone())
    }

    async fn upload_image(&self, filename: &str, _bytes: Vec<u8>) -> Result<(), ApiError> {
        let mut state = self.enter("upload_image")?;
        state.next_id += 1;
        let id = state.next_id;
        state.images.push(ImageRecord {
            id,
            filename: filename.to_string(),
            timestamp: "2024-06-01T09:00:00".to_string(),
        });
        Ok(())
    }

    async fn delete_image(&self, image_id: DbId) -> Result<(), ApiError> {
        let mut state = self.enter("delete_image")?;
        let before = state.images.len();
        state.images.retain(|img| img.id != image_id);
        if state.images.len() == before {
            return Err(not_found("Image"));
        }
        state.analyses.remove(&image_id);
        Ok(())
    }

    async fn fetch_analysis(&self, image_id: DbId) -> Result<HeritageContent, ApiError> {
        let state = self.enter("fetch_analysis")?;
        Ok(state.analyses.get(&image_id).cloned().unwrap_or_default())
    }

    async fn analyze_image(&self, image_id: DbId) -> Result<HeritageContent, ApiError> {
        let mut state = self.enter("analyze_image")?;
        let entries = state.pending.remove(&image_id).unwrap_or_default();
        state.heritages.extend(entries.iter().cloned());
        let content = HeritageContent { content: entries };
        state.analyses.insert(image_id, content.clone());
        Ok(content)
    }

    async fn update_analysis(
        &self,
        image_id: DbId,
        content: &HeritageContent,
    ) -> Result<HeritageContent, ApiError> {
        let mut state = self.enter("update_analysis")?;
        for updated in &content.content {
            if let Some(slot) = state.heritages.iter_mut().find(|e| e.id == updated.id) {
                *slot = updated.clone();
            }
        }
        state.analyses.insert(image_id, content.clone());
        Ok(content.clone())
    }

    async fn list_heritages(&self) -> Result<Vec<HeritageEntry>, ApiError> {
        let state = self.enter("list_heritages")?;
        Ok(state.heritages.clone())
    }

    async fn fetch_heritage(&self, heritage_id: DbId) -> Result<HeritageEntry, ApiError> {
        let state = self.enter("fetch_heritage")?;
        state
            .heritages
            .iter()
            .find(|e| e.id == heritage_id)
            .cloned()
            .ok_or_else(|| not_found("Heritage"))
    }

    async fn update_heritage(
        &self,
        heritage_id: DbId,
        update: &HeritageUpdate,
    ) -> Result<HeritageEntry, ApiError> {
        let mut state = self.enter("update_heritage")?;
        let slot = state
            .heritages
            .iter_mut()
            .find(|e| e.id == heritage_id)
            .ok_or_else(|| not_found("Heritage"))?;
        *slot = HeritageEntry {
            id: heritage_id,
            title: update.title.clone(),
            description: update.description.clone(),
            summary: update.summary.clone(),
            simple_summary: update.simple_summary.clone(),
            criteria: update.criteria.clone(),
            unesco_tag: update.unesco_tag.clone(),
            country: update.country.clone(),
            region: update.region.clone(),
            feature: update.feature.clone(),
        };
        Ok(slot.clone())
    }

    async fn generate_quiz(&self, heritage_id: DbId) -> Result<serde_json::Value, ApiError> {
        let mut state = self.enter("generate_quiz")?;
        state.next_id += 1;
        let item = quiz(state.next_id, heritage_id);
        state.quizzes.push(item.clone());
        Ok(serde_json::json!({ "content": [item.question] }))
    }

    async fn list_quizzes(&self, heritage_id: DbId) -> Result<Vec<QuizItem>, ApiError> {
        let state = self.enter("list_quizzes")?;
        Ok(state
            .quizzes
            .iter()
            .filter(|q| q.heritage_id == heritage_id)
            .cloned()
            .collect())
    }

    async fn update_quiz(&self, quiz_id: DbId, update: &QuizUpdate) -> Result<QuizItem, ApiError> {
        let mut state = self.enter("update_quiz")?;
        let slot = state
            .quizzes
            .iter_mut()
            .find(|q| q.id == quiz_id)
            .ok_or_else(|| not_found("Quiz"))?;
        slot.question = update.question.clone();
        slot.options = update.options.clone();
        slot.answer = update.answer.clone();
        Ok(slot.clone())
    }
}
