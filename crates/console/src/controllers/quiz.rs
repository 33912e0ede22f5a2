//! Quiz items of one heritage entry.
//!
//! Generation is tracked per parent entry rather than per controller, so a
//! slow generation for one entry leaves every other entry interactive.

use std::collections::HashSet;

use heritage_client::{ApiError, HeritageBackend};
use heritage_core::draft::{QuizChange, QuizDraft};
use heritage_core::models::{replace_by_id, QuizItem, QuizUpdate};
use heritage_core::types::DbId;

use crate::error::Rejected;
use crate::ticket::{Selection, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    Idle,
    Loading,
    Ready,
    Editing(QuizDraft),
    Saving(QuizDraft),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCommit {
    pub ticket: Ticket,
    pub quiz_id: DbId,
    pub update: QuizUpdate,
}

#[derive(Debug)]
pub struct QuizController {
    /// The parent heritage entry.
    selection: Selection,
    state: QuizState,
    quizzes: Option<Vec<QuizItem>>,
    generating: HashSet<DbId>,
    /// Set when a refresh could not run because a draft was open.
    stale: bool,
    error: Option<String>,
}

impl Default for QuizController {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizController {
    pub fn new() -> Self {
        Self {
            selection: Selection::default(),
            state: QuizState::Idle,
            quizzes: None,
            generating: HashSet::new(),
            stale: false,
            error: None,
        }
    }

    pub fn heritage_id(&self) -> Option<DbId> {
        self.selection.current()
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// `None` until the list for the current entry has been fetched.
    pub fn quizzes(&self) -> Option<&[QuizItem]> {
        self.quizzes.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> Option<&QuizDraft> {
        match &self.state {
            QuizState::Editing(draft) | QuizState::Saving(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn is_generating(&self, heritage_id: DbId) -> bool {
        self.generating.contains(&heritage_id)
    }

    /// The cached list predates a successful generation.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// A fetch or save is in flight for the attached entry. Generation is
    /// tracked separately by [`Self::is_generating`].
    pub fn is_busy(&self) -> bool {
        matches!(self.state, QuizState::Loading | QuizState::Saving(_))
    }

    // ---- selection and loading ----

    /// Point the controller at `heritage_id` without fetching. Re-attaching
    /// to the same entry keeps what was loaded.
    pub fn attach(&mut self, heritage_id: DbId) {
        if self.selection.current() == Some(heritage_id) {
            return;
        }
        self.selection.open(heritage_id);
        self.quizzes = None;
        self.stale = false;
        self.error = None;
        self.state = QuizState::Idle;
    }

    pub fn close(&mut self) {
        self.selection.close();
        self.quizzes = None;
        self.stale = false;
        self.error = None;
        self.state = QuizState::Idle;
    }

    /// Start a fetch of the attached entry's quizzes.
    pub fn begin_load(&mut self) -> Result<Ticket, Rejected> {
        match &self.state {
            QuizState::Idle | QuizState::Ready => {}
            QuizState::Editing(_) => return Err(Rejected::DraftActive),
            _ => return Err(Rejected::Busy),
        }
        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;
        self.state = QuizState::Loading;
        self.error = None;
        Ok(ticket)
    }

    /// Like [`Self::begin_load`] but yields no ticket once the list is
    /// cached and fresh.
    pub fn begin_lazy_load(&mut self) -> Result<Option<Ticket>, Rejected> {
        if self.quizzes.is_some() && !self.stale {
            return Ok(None);
        }
        self.begin_load().map(Some)
    }

    pub fn apply_load(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<QuizItem>, ApiError>,
    ) -> bool {
        if !self.selection.is_current(&ticket) || self.state != QuizState::Loading {
            tracing::debug!(heritage_id = ticket.target, "Dropping stale quiz list");
            return false;
        }
        match result {
            Ok(quizzes) => {
                tracing::debug!(
                    heritage_id = ticket.target,
                    count = quizzes.len(),
                    "Quizzes loaded"
                );
                self.quizzes = Some(quizzes);
                self.stale = false;
            }
            Err(e) => {
                tracing::warn!(heritage_id = ticket.target, error = %e, "Quiz fetch failed");
                self.error = Some(e.to_string());
            }
        }
        self.state = QuizState::Ready;
        true
    }

    /// Fetch the attached entry's quizzes unless they are already cached.
    pub async fn ensure_loaded<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), Rejected> {
        if let Some(ticket) = self.begin_lazy_load()? {
            let result = backend.list_quizzes(ticket.target).await;
            self.apply_load(ticket, result);
        }
        Ok(())
    }

    pub async fn reload<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), Rejected> {
        let ticket = self.begin_load()?;
        let result = backend.list_quizzes(ticket.target).await;
        self.apply_load(ticket, result);
        Ok(())
    }

    /// Run the refresh a generation had to defer, once no draft is open.
    pub async fn refresh_if_stale<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<bool, Rejected> {
        if !self.stale || !matches!(self.state, QuizState::Idle | QuizState::Ready) {
            return Ok(false);
        }
        self.reload(backend).await?;
        Ok(true)
    }

    // ---- generation ----

    pub fn begin_generate(&mut self, heritage_id: DbId) -> Result<(), Rejected> {
        if !self.generating.insert(heritage_id) {
            return Err(Rejected::AlreadyGenerating(heritage_id));
        }
        if self.selection.current() == Some(heritage_id) {
            self.error = None;
        }
        Ok(())
    }

    /// Returns `true` when generation succeeded for the attached entry and
    /// its list should be re-fetched.
    pub fn finish_generate(
        &mut self,
        heritage_id: DbId,
        result: Result<serde_json::Value, ApiError>,
    ) -> bool {
        self.generating.remove(&heritage_id);
        let attached = self.selection.current() == Some(heritage_id);

        match result {
            Ok(response) => {
                tracing::info!(heritage_id, "Quiz generated");
                tracing::debug!(heritage_id, %response, "Quiz generation response");
                attached
            }
            Err(e) => {
                tracing::warn!(heritage_id, error = %e, "Quiz generation failed");
                if attached {
                    self.error = Some(e.to_string());
                }
                false
            }
        }
    }

    /// Generate a quiz for `heritage_id` and refresh the list if that entry
    /// is still attached. Returns `true` when the list was refreshed.
    ///
    /// With a draft open the list is marked stale instead, and refreshed
    /// once the draft is cancelled or saved.
    pub async fn generate<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
        heritage_id: DbId,
    ) -> Result<bool, Rejected> {
        self.begin_generate(heritage_id)?;
        let result = backend.generate_quiz(heritage_id).await;
        if !self.finish_generate(heritage_id, result) {
            return Ok(false);
        }
        match self.reload(backend).await {
            Ok(()) => Ok(true),
            Err(rejected) => {
                tracing::info!(heritage_id, %rejected, "Quiz refresh deferred");
                self.stale = true;
                Ok(false)
            }
        }
    }

    // ---- editing ----

    pub fn start_edit(&mut self, quiz_id: DbId) -> Result<(), Rejected> {
        match &self.state {
            QuizState::Ready => {}
            QuizState::Editing(_) => return Err(Rejected::DraftActive),
            QuizState::Idle => return Err(Rejected::NoSelection),
            _ => return Err(Rejected::Busy),
        }
        let item = self
            .quizzes
            .as_deref()
            .and_then(|items| items.iter().find(|q| q.id == quiz_id))
            .ok_or(Rejected::UnknownItem(quiz_id))?;

        self.state = QuizState::Editing(QuizDraft::new(item));
        self.error = None;
        Ok(())
    }

    pub fn change_edit(&mut self, change: QuizChange) -> Result<(), Rejected> {
        match &mut self.state {
            QuizState::Editing(draft) => {
                draft.apply(change);
                Ok(())
            }
            QuizState::Saving(_) => Err(Rejected::Busy),
            _ => Err(Rejected::NotEditing),
        }
    }

    pub fn cancel_edit(&mut self) -> Result<(), Rejected> {
        match &self.state {
            QuizState::Editing(_) => {
                self.state = QuizState::Ready;
                Ok(())
            }
            QuizState::Saving(_) => Err(Rejected::Busy),
            _ => Err(Rejected::NotEditing),
        }
    }

    pub fn begin_commit(&mut self) -> Result<QuizCommit, Rejected> {
        let draft = match &self.state {
            QuizState::Editing(draft) => draft.clone(),
            QuizState::Saving(_) => return Err(Rejected::Busy),
            _ => return Err(Rejected::NotEditing),
        };
        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;
        let commit = QuizCommit {
            ticket,
            quiz_id: draft.id(),
            update: draft.to_update(),
        };

        self.error = None;
        self.state = QuizState::Saving(draft);
        Ok(commit)
    }

    pub fn finish_commit(&mut self, ticket: Ticket, result: Result<QuizItem, ApiError>) -> bool {
        if !self.selection.is_current(&ticket) {
            tracing::debug!(heritage_id = ticket.target, "Dropping stale quiz save");
            return false;
        }
        let QuizState::Saving(draft) = &self.state else {
            return false;
        };

        match result {
            Ok(saved) => {
                tracing::info!(
                    quiz_id = saved.id,
                    heritage_id = ticket.target,
                    "Quiz saved"
                );
                if let Some(items) = self.quizzes.as_mut() {
                    replace_by_id(items, &saved, |q| q.id);
                }
                self.state = QuizState::Ready;
            }
            Err(e) => {
                tracing::warn!(quiz_id = draft.id(), error = %e, "Saving quiz failed");
                self.error = Some(e.to_string());
                self.state = QuizState::Editing(draft.clone());
            }
        }
        true
    }

    pub async fn commit_edit<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), Rejected> {
        let commit = self.begin_commit()?;
        let result = backend.update_quiz(commit.quiz_id, &commit.update).await;
        self.finish_commit(commit.ticket, result);
        self.refresh_if_stale(backend).await?;
        Ok(())
    }
}
