//! Entities exchanged with the heritage backend.
//!
//! The backend owns all of these; the console only holds transient copies.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// An uploaded image. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: DbId,
    pub filename: String,
    /// Upload time as formatted by the backend.
    pub timestamp: String,
}

/// One heritage site extracted from an image by analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeritageEntry {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub simple_summary: Option<Vec<String>>,
    /// UNESCO inscription criteria, 1 through 10.
    #[serde(default)]
    pub criteria: Option<Vec<u32>>,
    /// UNESCO classification (cultural, natural, mixed).
    #[serde(default)]
    pub unesco_tag: Option<String>,
    #[serde(default)]
    pub country: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<Vec<String>>,
    #[serde(default)]
    pub feature: Option<Vec<String>>,
}

/// Full-field replacement payload for a heritage entry: every editable
/// field, without the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeritageUpdate {
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub simple_summary: Option<Vec<String>>,
    pub criteria: Option<Vec<u32>>,
    pub unesco_tag: Option<String>,
    pub country: Option<Vec<String>>,
    pub region: Option<Vec<String>>,
    pub feature: Option<Vec<String>>,
}

impl HeritageEntry {
    /// Strip the id, producing the body of an update request.
    pub fn to_update(&self) -> HeritageUpdate {
        HeritageUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            summary: self.summary.clone(),
            simple_summary: self.simple_summary.clone(),
            criteria: self.criteria.clone(),
            unesco_tag: self.unesco_tag.clone(),
            country: self.country.clone(),
            region: self.region.clone(),
            feature: self.feature.clone(),
        }
    }

    pub fn has_criterion(&self, criterion: u32) -> bool {
        self.criteria
            .as_deref()
            .is_some_and(|c| c.contains(&criterion))
    }

    pub fn has_region(&self, tag: &str) -> bool {
        contains_tag(self.region.as_deref(), tag)
    }

    pub fn has_feature(&self, tag: &str) -> bool {
        contains_tag(self.feature.as_deref(), tag)
    }
}

fn contains_tag(tags: Option<&[String]>, tag: &str) -> bool {
    tags.is_some_and(|t| t.iter().any(|s| s == tag))
}

/// Envelope the analysis endpoints use: one image yields zero or more
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeritageContent {
    #[serde(default)]
    pub content: Vec<HeritageEntry>,
}

impl HeritageContent {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A multiple-choice question belonging to a heritage entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: DbId,
    pub heritage_id: DbId,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
}

/// Full-field replacement payload for a quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizUpdate {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizItem {
    pub fn to_update(&self) -> QuizUpdate {
        QuizUpdate {
            question: self.question.clone(),
            options: self.options.clone(),
            answer: self.answer.clone(),
        }
    }
}

/// Replace the element whose id matches `updated.id`.
///
/// Returns `true` when an element was replaced. Ids are unique within a
/// collection, so at most one element changes.
pub fn replace_by_id<T, F>(items: &mut [T], updated: &T, id_of: F) -> bool
where
    T: Clone,
    F: Fn(&T) -> DbId,
{
    let target = id_of(updated);
    match items.iter_mut().find(|item| id_of(item) == target) {
        Some(slot) => {
            *slot = updated.clone();
            true
        }
        None => false,
    }
}
