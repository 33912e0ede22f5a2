//! Analysis view for the selected image.
//!
//! Drives the detail/edit cycle of the image manager: fetch the stored
//! analysis, run a new one, edit an extracted entry, and delete the image.
//! Every transition is a method on [`AnalysisController`]; a method that is
//! not legal in the current [`AnalysisState`] returns [`Rejected`] and
//! changes nothing.
//!
//! Network work is split into `begin_*` (validate and move to the pending
//! state, returning a [`Ticket`]) and `finish_*`/`apply_*` (apply the
//! response if the ticket still matches the selection). The async methods
//! chain the two around one backend call.

use std::sync::Arc;

use heritage_client::{ApiError, HeritageBackend};
use heritage_core::draft::{HeritageChange, HeritageDraft};
use heritage_core::models::{HeritageContent, HeritageEntry};
use heritage_core::types::DbId;
use heritage_core::vocabulary::Vocabulary;

use crate::error::Rejected;
use crate::ticket::{Selection, Ticket};

/// What a settled selection is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisView {
    /// No analysis stored: offer "analyze" instead of edit controls.
    NotAnalyzed,
    /// The extracted entries.
    Entries,
    /// The image itself, with the analysis kept in the cache.
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Loading,
    Ready(AnalysisView),
    Analyzing { resume: AnalysisView },
    Editing(HeritageDraft),
    Saving(HeritageDraft),
    Deleting { resume: Box<AnalysisState> },
}

impl AnalysisState {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Analyzing { .. } | Self::Saving(_) | Self::Deleting { .. }
        )
    }
}

/// Body of an analysis save: the cached envelope with the draft swapped in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisCommit {
    pub ticket: Ticket,
    pub content: HeritageContent,
}

#[derive(Debug)]
pub struct AnalysisController {
    selection: Selection,
    state: AnalysisState,
    cache: Option<HeritageContent>,
    error: Option<String>,
    vocabulary: Arc<Vocabulary>,
}

impl AnalysisController {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            selection: Selection::default(),
            state: AnalysisState::Idle,
            cache: None,
            error: None,
            vocabulary,
        }
    }

    pub fn image_id(&self) -> Option<DbId> {
        self.selection.current()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Entries fetched for the current image, whether or not on screen.
    pub fn cached_entries(&self) -> Option<&[HeritageEntry]> {
        self.cache.as_ref().map(|c| c.content.as_slice())
    }

    /// Entries to display, if the entry view is showing.
    pub fn visible_entries(&self) -> Option<&[HeritageEntry]> {
        match self.state {
            AnalysisState::Ready(AnalysisView::Entries)
            | AnalysisState::Editing(_)
            | AnalysisState::Saving(_) => self.cached_entries(),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&HeritageDraft> {
        match &self.state {
            AnalysisState::Editing(draft) | AnalysisState::Saving(draft) => Some(draft),
            _ => None,
        }
    }

    // ---- selection ----

    /// Switch to `image_id`, discarding any draft, cache and error.
    pub fn open(&mut self, image_id: DbId) -> Ticket {
        if let Some(draft) = self.draft() {
            tracing::debug!(entry_id = draft.id(), "Discarding draft on selection change");
        }
        self.cache = None;
        self.error = None;
        self.state = AnalysisState::Loading;
        self.selection.open(image_id)
    }

    pub fn close(&mut self) {
        self.selection.close();
        self.cache = None;
        self.error = None;
        self.state = AnalysisState::Idle;
    }

    /// Apply a fetched analysis. Returns `false` if the response was stale.
    pub fn apply_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<HeritageContent, ApiError>,
    ) -> bool {
        if !self.selection.is_current(&ticket) || self.state != AnalysisState::Loading {
            tracing::debug!(image_id = ticket.target, "Dropping stale analysis response");
            return false;
        }

        match result {
            Ok(content) if !content.is_empty() => {
                tracing::debug!(
                    image_id = ticket.target,
                    entries = content.content.len(),
                    "Analysis loaded"
                );
                self.cache = Some(content);
                self.state = AnalysisState::Ready(AnalysisView::Entries);
            }
            Ok(_) => {
                self.cache = None;
                self.state = AnalysisState::Ready(AnalysisView::NotAnalyzed);
            }
            Err(e) => {
                tracing::warn!(image_id = ticket.target, error = %e, "Analysis fetch failed");
                self.error = Some(e.to_string());
                let view = if self.cache.is_some() {
                    AnalysisView::Image
                } else {
                    AnalysisView::NotAnalyzed
                };
                self.state = AnalysisState::Ready(view);
            }
        }
        true
    }

    /// Select an image and fetch its analysis.
    pub async fn load<B: HeritageBackend + ?Sized>(&mut self, backend: &B, image_id: DbId) {
        let ticket = self.open(image_id);
        let result = backend.fetch_analysis(image_id).await;
        self.apply_fetch(ticket, result);
    }

    // ---- view toggles ----

    /// Hide the entries and show the image; the cache is kept.
    pub fn back_to_image(&mut self) -> Result<(), Rejected> {
        match &self.state {
            AnalysisState::Ready(AnalysisView::Entries) | AnalysisState::Editing(_) => {
                self.state = AnalysisState::Ready(AnalysisView::Image);
                Ok(())
            }
            AnalysisState::Ready(_) => Ok(()),
            AnalysisState::Idle => Err(Rejected::NoSelection),
            _ => Err(Rejected::Busy),
        }
    }

    /// Show the entries again. Served from the cache when possible;
    /// otherwise returns a ticket and moves to `Loading` so the caller
    /// fetches.
    pub fn show_analysis(&mut self) -> Result<Option<Ticket>, Rejected> {
        match &self.state {
            AnalysisState::Ready(_) => {}
            AnalysisState::Idle => return Err(Rejected::NoSelection),
            AnalysisState::Editing(_) => return Err(Rejected::DraftActive),
            _ => return Err(Rejected::Busy),
        }

        self.error = None;
        if self.cache.is_some() {
            self.state = AnalysisState::Ready(AnalysisView::Entries);
            return Ok(None);
        }

        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;
        self.state = AnalysisState::Loading;
        Ok(Some(ticket))
    }

    pub async fn redisplay<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), Rejected> {
        if let Some(ticket) = self.show_analysis()? {
            let result = backend.fetch_analysis(ticket.target).await;
            self.apply_fetch(ticket, result);
        }
        Ok(())
    }

    // ---- analysis ----

    pub fn begin_analyze(&mut self) -> Result<Ticket, Rejected> {
        let resume = match &self.state {
            AnalysisState::Ready(view) => *view,
            AnalysisState::Idle => return Err(Rejected::NoSelection),
            AnalysisState::Editing(_) => return Err(Rejected::DraftActive),
            _ => return Err(Rejected::Busy),
        };
        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;

        self.error = None;
        self.state = AnalysisState::Analyzing { resume };
        Ok(ticket)
    }

    /// Returns `true` when the analysis succeeded; the controller is then
    /// `Loading` and the caller must re-fetch with the same ticket so the
    /// view reflects what was persisted.
    pub fn finish_analyze(
        &mut self,
        ticket: Ticket,
        result: Result<HeritageContent, ApiError>,
    ) -> bool {
        if !self.selection.is_current(&ticket) {
            tracing::debug!(image_id = ticket.target, "Dropping stale analyze response");
            return false;
        }
        let AnalysisState::Analyzing { resume } = self.state else {
            return false;
        };

        match result {
            Ok(content) => {
                tracing::info!(
                    image_id = ticket.target,
                    entries = content.content.len(),
                    "Analysis completed"
                );
                self.state = AnalysisState::Loading;
                true
            }
            Err(e) => {
                tracing::warn!(image_id = ticket.target, error = %e, "Analysis failed");
                self.error = Some(e.to_string());
                self.state = AnalysisState::Ready(resume);
                false
            }
        }
    }

    pub async fn analyze<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), Rejected> {
        let ticket = self.begin_analyze()?;
        let result = backend.analyze_image(ticket.target).await;
        if self.finish_analyze(ticket, result) {
            let refreshed = backend.fetch_analysis(ticket.target).await;
            self.apply_fetch(ticket, refreshed);
        }
        Ok(())
    }

    // ---- editing ----

    /// Clone the cached entry `entry_id` into a draft.
    pub fn start_edit(&mut self, entry_id: DbId) -> Result<(), Rejected> {
        match &self.state {
            AnalysisState::Ready(AnalysisView::Entries) => {}
            AnalysisState::Editing(_) => return Err(Rejected::DraftActive),
            AnalysisState::Idle => return Err(Rejected::NoSelection),
            AnalysisState::Ready(_) => return Err(Rejected::UnknownItem(entry_id)),
            _ => return Err(Rejected::Busy),
        }
        let entry = self
            .cached_entries()
            .and_then(|entries| entries.iter().find(|e| e.id == entry_id))
            .ok_or(Rejected::UnknownItem(entry_id))?;

        self.state = AnalysisState::Editing(HeritageDraft::new(entry));
        self.error = None;
        Ok(())
    }

    pub fn change_edit(&mut self, change: HeritageChange) -> Result<(), Rejected> {
        match &mut self.state {
            AnalysisState::Editing(draft) => {
                draft.apply(change, &self.vocabulary)?;
                Ok(())
            }
            AnalysisState::Saving(_) => Err(Rejected::Busy),
            _ => Err(Rejected::NotEditing),
        }
    }

    pub fn cancel_edit(&mut self) -> Result<(), Rejected> {
        match &self.state {
            AnalysisState::Editing(_) => {
                self.state = AnalysisState::Ready(AnalysisView::Entries);
                Ok(())
            }
            AnalysisState::Saving(_) => Err(Rejected::Busy),
            _ => Err(Rejected::NotEditing),
        }
    }

    /// Move to `Saving` and build the envelope to persist.
    pub fn begin_commit(&mut self) -> Result<AnalysisCommit, Rejected> {
        let draft = match &self.state {
            AnalysisState::Editing(draft) => draft.clone(),
            AnalysisState::Saving(_) => return Err(Rejected::Busy),
            _ => return Err(Rejected::NotEditing),
        };
        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;

        let mut content = self.cache.clone().unwrap_or_default();
        for entry in &mut content.content {
            if entry.id == draft.id() {
                *entry = draft.entry().clone();
            }
        }

        self.error = None;
        self.state = AnalysisState::Saving(draft);
        Ok(AnalysisCommit { ticket, content })
    }

    /// On success the saved envelope becomes the cache and the draft is
    /// cleared; on failure the draft is kept and the error surfaced.
    pub fn finish_commit(
        &mut self,
        ticket: Ticket,
        result: Result<HeritageContent, ApiError>,
    ) -> bool {
        if !self.selection.is_current(&ticket) {
            tracing::debug!(image_id = ticket.target, "Dropping stale save response");
            return false;
        }
        let AnalysisState::Saving(draft) = &self.state else {
            return false;
        };

        match result {
            Ok(saved) => {
                tracing::info!(
                    image_id = ticket.target,
                    entry_id = draft.id(),
                    "Analysis entry saved"
                );
                self.cache = Some(saved);
                self.state = AnalysisState::Ready(AnalysisView::Entries);
            }
            Err(e) => {
                tracing::warn!(
                    image_id = ticket.target,
                    error = %e,
                    "Saving analysis entry failed"
                );
                self.error = Some(e.to_string());
                self.state = AnalysisState::Editing(draft.clone());
            }
        }
        true
    }

    pub async fn commit_edit<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<(), Rejected> {
        let commit = self.begin_commit()?;
        let result = backend
            .update_analysis(commit.ticket.target, &commit.content)
            .await;
        self.finish_commit(commit.ticket, result);
        Ok(())
    }

    // ---- deletion ----

    pub fn begin_delete(&mut self) -> Result<Ticket, Rejected> {
        if self.state.is_busy() {
            return Err(Rejected::Busy);
        }
        if self.state == AnalysisState::Idle {
            return Err(Rejected::NoSelection);
        }
        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;

        let resume = std::mem::replace(&mut self.state, AnalysisState::Idle);
        self.state = AnalysisState::Deleting {
            resume: Box::new(resume),
        };
        self.error = None;
        Ok(ticket)
    }

    /// Returns `true` when the image was deleted; the controller is then
    /// closed. On failure the previous state is restored.
    pub fn finish_delete(&mut self, ticket: Ticket, result: Result<(), ApiError>) -> bool {
        if !self.selection.is_current(&ticket)
            || !matches!(self.state, AnalysisState::Deleting { .. })
        {
            return false;
        }
        let AnalysisState::Deleting { resume } =
            std::mem::replace(&mut self.state, AnalysisState::Idle)
        else {
            return false;
        };

        match result {
            Ok(()) => {
                tracing::info!(image_id = ticket.target, "Image deleted");
                self.close();
                true
            }
            Err(e) => {
                tracing::warn!(image_id = ticket.target, error = %e, "Image deletion failed");
                self.state = *resume;
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn entry(id: DbId, title: &str) -> HeritageEntry {
        HeritageEntry {
            id,
            title: title.into(),
            description: None,
            summary: None,
            simple_summary: None,
            criteria: Some(vec![1]),
            unesco_tag: None,
            country: None,
            region: None,
            feature: None,
        }
    }

    fn content(entries: Vec<HeritageEntry>) -> HeritageContent {
        HeritageContent { content: entries }
    }

    fn failure() -> ApiError {
        ApiError::Status {
            status: 500,
            message: "failed to save analysis".into(),
        }
    }

    fn loaded(entries: Vec<HeritageEntry>) -> AnalysisController {
        let mut ctl = AnalysisController::new(Arc::new(Vocabulary::standard()));
        let ticket = ctl.open(1);
        assert!(ctl.apply_fetch(ticket, Ok(content(entries))));
        ctl
    }

    // ---- fetching ----

    #[test]
    fn empty_analysis_offers_analyze() {
        let ctl = loaded(vec![]);
        assert_eq!(ctl.state(), &AnalysisState::Ready(AnalysisView::NotAnalyzed));
        assert!(ctl.visible_entries().is_none());
    }

    #[test]
    fn stale_fetch_is_dropped() {
        let mut ctl = AnalysisController::new(Arc::new(Vocabulary::standard()));
        let first = ctl.open(1);
        let second = ctl.open(2);

        assert!(!ctl.apply_fetch(first, Ok(content(vec![entry(10, "old")]))));
        assert_eq!(ctl.state(), &AnalysisState::Loading);

        assert!(ctl.apply_fetch(second, Ok(content(vec![entry(20, "new")]))));
        assert_eq!(ctl.cached_entries().unwrap()[0].id, 20);
    }

    #[test]
    fn back_to_image_keeps_cache_for_show_analysis() {
        let mut ctl = loaded(vec![entry(10, "Kyoto")]);

        ctl.back_to_image().unwrap();
        assert_eq!(ctl.state(), &AnalysisState::Ready(AnalysisView::Image));
        assert!(ctl.visible_entries().is_none());

        assert_eq!(ctl.show_analysis(), Ok(None));
        assert_eq!(ctl.visible_entries().map(|e| e.len()), Some(1));
    }

    // ---- analyze ----

    #[test]
    fn analyze_while_editing_is_rejected() {
        let mut ctl = loaded(vec![entry(10, "Kyoto")]);
        ctl.start_edit(10).unwrap();
        assert_eq!(ctl.begin_analyze(), Err(Rejected::DraftActive));
    }

    #[test]
    fn analyze_success_requires_refetch() {
        let mut ctl = loaded(vec![]);
        let ticket = ctl.begin_analyze().unwrap();
        assert_eq!(ctl.begin_analyze(), Err(Rejected::Busy));

        assert!(ctl.finish_analyze(ticket, Ok(content(vec![entry(10, "Nara")]))));
        assert_eq!(ctl.state(), &AnalysisState::Loading);

        assert!(ctl.apply_fetch(ticket, Ok(content(vec![entry(10, "Nara")]))));
        assert_eq!(ctl.state(), &AnalysisState::Ready(AnalysisView::Entries));
    }

    #[test]
    fn analyze_failure_restores_view() {
        let mut ctl = loaded(vec![]);
        let ticket = ctl.begin_analyze().unwrap();

        assert!(!ctl.finish_analyze(ticket, Err(failure())));
        assert_eq!(ctl.state(), &AnalysisState::Ready(AnalysisView::NotAnalyzed));
        assert!(ctl.error().is_some());
    }

    // ---- editing ----

    #[test]
    fn commit_replaces_only_the_edited_entry() {
        let mut ctl = loaded(vec![entry(10, "A"), entry(11, "B")]);
        ctl.start_edit(11).unwrap();
        ctl.change_edit(HeritageChange::Title("B2".into())).unwrap();

        let commit = ctl.begin_commit().unwrap();
        assert_eq!(commit.content.content[0].title, "A");
        assert_eq!(commit.content.content[1].title, "B2");
        assert_eq!(ctl.change_edit(HeritageChange::Title("x".into())), Err(Rejected::Busy));

        assert!(ctl.finish_commit(commit.ticket, Ok(commit.content.clone())));
        assert_eq!(ctl.cached_entries().unwrap()[1].title, "B2");
        assert!(ctl.draft().is_none());
    }

    #[test]
    fn failed_commit_keeps_draft() {
        let mut ctl = loaded(vec![entry(10, "A")]);
        ctl.start_edit(10).unwrap();
        ctl.change_edit(HeritageChange::Title("A2".into())).unwrap();

        let commit = ctl.begin_commit().unwrap();
        ctl.finish_commit(commit.ticket, Err(failure()));

        assert_matches!(ctl.state(), AnalysisState::Editing(d) if d.entry().title == "A2");
        assert_eq!(ctl.cached_entries().unwrap()[0].title, "A");
        assert_eq!(ctl.error(), Some("failed to save analysis (status: 500)"));
    }

    #[test]
    fn cancel_leaves_cache_untouched() {
        let mut ctl = loaded(vec![entry(10, "A")]);
        ctl.start_edit(10).unwrap();
        ctl.change_edit(HeritageChange::Title("changed".into())).unwrap();
        ctl.cancel_edit().unwrap();

        assert_eq!(ctl.cached_entries().unwrap()[0], entry(10, "A"));
        assert_eq!(ctl.cancel_edit(), Err(Rejected::NotEditing));
    }

    #[test]
    fn second_edit_is_rejected() {
        let mut ctl = loaded(vec![entry(10, "A"), entry(11, "B")]);
        ctl.start_edit(10).unwrap();
        assert_eq!(ctl.start_edit(11), Err(Rejected::DraftActive));
        assert_eq!(ctl.draft().map(|d| d.id()), Some(10));
    }

    #[test]
    fn switching_selection_discards_draft() {
        let mut ctl = loaded(vec![entry(10, "A")]);
        ctl.start_edit(10).unwrap();
        ctl.open(2);
        assert!(ctl.draft().is_none());
        assert!(ctl.cached_entries().is_none());
    }

    #[test]
    fn unknown_vocabulary_tag_is_rejected() {
        let mut ctl = loaded(vec![entry(10, "A")]);
        ctl.start_edit(10).unwrap();
        assert_matches!(
            ctl.change_edit(HeritageChange::ToggleRegion("Atlantis".into())),
            Err(Rejected::InvalidInput(_))
        );
    }

    // ---- deletion ----

    #[test]
    fn delete_success_closes_selection() {
        let mut ctl = loaded(vec![entry(10, "A")]);
        let ticket = ctl.begin_delete().unwrap();
        assert!(ctl.is_busy());

        assert!(ctl.finish_delete(ticket, Ok(())));
        assert_eq!(ctl.image_id(), None);
        assert_eq!(ctl.state(), &AnalysisState::Idle);
    }

    #[test]
    fn delete_failure_restores_previous_state() {
        let mut ctl = loaded(vec![entry(10, "A")]);
        ctl.start_edit(10).unwrap();
        let ticket = ctl.begin_delete().unwrap();

        assert!(!ctl.finish_delete(ticket, Err(failure())));
        assert_matches!(ctl.state(), AnalysisState::Editing(_));
        assert!(ctl.error().is_some());
    }
}
