//! Client-local working copies of entities under edit.
//!
//! A draft is cloned from the cached entity when editing starts and only
//! ever touches its own copy. Field changes arrive as raw widget input and
//! go through [`crate::codec`]; tag fields can only be toggled, and only to
//! values from the injected [`Vocabulary`].

use crate::codec::{parse_int_list, parse_lines, parse_string_list, parse_text};
use crate::error::CoreError;
use crate::models::{HeritageEntry, HeritageUpdate, QuizItem, QuizUpdate};
use crate::types::DbId;
use crate::vocabulary::{TagKind, Vocabulary};

/// One edit to a heritage draft, as produced by an input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeritageChange {
    Title(String),
    Description(String),
    Summary(String),
    /// Newline-separated bullet points.
    SimpleSummary(String),
    /// Comma-separated criteria numbers.
    Criteria(String),
    /// `None` clears the classification.
    UnescoTag(Option<String>),
    /// Comma-separated country names.
    Country(String),
    ToggleRegion(String),
    ToggleFeature(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeritageDraft {
    working: HeritageEntry,
}

impl HeritageDraft {
    pub fn new(entry: &HeritageEntry) -> Self {
        Self {
            working: entry.clone(),
        }
    }

    pub fn id(&self) -> DbId {
        self.working.id
    }

    pub fn entry(&self) -> &HeritageEntry {
        &self.working
    }

    /// Apply a single widget change. Tag changes outside the vocabulary are
    /// rejected and leave the draft untouched.
    pub fn apply(&mut self, change: HeritageChange, vocab: &Vocabulary) -> Result<(), CoreError> {
        let draft = &mut self.working;
        match change {
            HeritageChange::Title(title) => draft.title = title,
            HeritageChange::Description(text) => draft.description = parse_text(&text),
            HeritageChange::Summary(text) => draft.summary = parse_text(&text),
            HeritageChange::SimpleSummary(text) => draft.simple_summary = parse_lines(&text),
            HeritageChange::Criteria(text) => {
                draft.criteria = parse_int_list(&text).and_then(|values| {
                    let kept: Vec<u32> = values
                        .into_iter()
                        .filter(|c| vocab.is_criterion(*c))
                        .collect();
                    (!kept.is_empty()).then_some(kept)
                });
            }
            HeritageChange::UnescoTag(tag) => {
                if let Some(tag) = &tag {
                    vocab.ensure(TagKind::Unesco, tag)?;
                }
                draft.unesco_tag = tag;
            }
            HeritageChange::Country(text) => draft.country = parse_string_list(&text, ','),
            HeritageChange::ToggleRegion(tag) => {
                vocab.ensure(TagKind::Region, &tag)?;
                toggle_tag(&mut draft.region, tag);
            }
            HeritageChange::ToggleFeature(tag) => {
                vocab.ensure(TagKind::Feature, &tag)?;
                toggle_tag(&mut draft.feature, tag);
            }
        }
        Ok(())
    }

    pub fn to_update(&self) -> HeritageUpdate {
        self.working.to_update()
    }
}

/// Flip membership of `tag`; an emptied list becomes `None`.
fn toggle_tag(tags: &mut Option<Vec<String>>, tag: String) {
    let mut current = tags.take().unwrap_or_default();
    if let Some(pos) = current.iter().position(|t| *t == tag) {
        current.remove(pos);
    } else {
        current.push(tag);
    }
    *tags = (!current.is_empty()).then_some(current);
}

/// One edit to a quiz draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizChange {
    Question(String),
    /// Newline-separated answer options.
    Options(String),
    Answer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    working: QuizItem,
}

impl QuizDraft {
    pub fn new(item: &QuizItem) -> Self {
        Self {
            working: item.clone(),
        }
    }

    pub fn id(&self) -> DbId {
        self.working.id
    }

    pub fn item(&self) -> &QuizItem {
        &self.working
    }

    pub fn apply(&mut self, change: QuizChange) {
        match change {
            QuizChange::Question(text) => self.working.question = text,
            // Options are not nullable on the wire.
            QuizChange::Options(text) => {
                self.working.options = parse_lines(&text).unwrap_or_default();
            }
            QuizChange::Answer(text) => self.working.answer = text,
        }
    }

    pub fn to_update(&self) -> QuizUpdate {
        self.working.to_update()
    }
}
