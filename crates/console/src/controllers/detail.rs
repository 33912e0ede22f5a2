//! Single heritage entry: view, edit and commit.

use std::sync::Arc;

use heritage_client::{ApiError, HeritageBackend};
use heritage_core::draft::{HeritageChange, HeritageDraft};
use heritage_core::models::{HeritageEntry, HeritageUpdate};
use heritage_core::types::{parse_id, DbId};
use heritage_core::vocabulary::Vocabulary;

use crate::error::Rejected;
use crate::ticket::{Selection, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Idle,
    /// The requested id was not a positive integer.
    Invalid(String),
    Loading,
    NotFound(DbId),
    /// The fetch failed for another reason; see the error slot.
    Failed,
    Viewing,
    Editing(HeritageDraft),
    Saving(HeritageDraft),
}

#[derive(Debug)]
pub struct HeritageDetailController {
    selection: Selection,
    state: DetailState,
    entry: Option<HeritageEntry>,
    error: Option<String>,
    vocabulary: Arc<Vocabulary>,
}

impl HeritageDetailController {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            selection: Selection::default(),
            state: DetailState::Idle,
            entry: None,
            error: None,
            vocabulary,
        }
    }

    pub fn heritage_id(&self) -> Option<DbId> {
        self.selection.current()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn entry(&self) -> Option<&HeritageEntry> {
        self.entry.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> Option<&HeritageDraft> {
        match &self.state {
            DetailState::Editing(draft) | DetailState::Saving(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, DetailState::Loading | DetailState::Saving(_))
    }

    // ---- loading ----

    pub fn open(&mut self, heritage_id: DbId) -> Ticket {
        self.entry = None;
        self.error = None;
        self.state = DetailState::Loading;
        self.selection.open(heritage_id)
    }

    /// Open from user-supplied text such as a route segment. A malformed id
    /// lands in [`DetailState::Invalid`] and yields no ticket.
    pub fn open_raw(&mut self, raw: &str) -> Option<Ticket> {
        match parse_id(raw) {
            Ok(id) => Some(self.open(id)),
            Err(e) => {
                tracing::debug!(raw, error = %e, "Rejecting heritage id");
                self.close();
                self.state = DetailState::Invalid(raw.to_string());
                None
            }
        }
    }

    pub fn close(&mut self) {
        self.selection.close();
        self.entry = None;
        self.error = None;
        self.state = DetailState::Idle;
    }

    pub fn apply_load(&mut self, ticket: Ticket, result: Result<HeritageEntry, ApiError>) -> bool {
        if !self.selection.is_current(&ticket) || self.state != DetailState::Loading {
            tracing::debug!(heritage_id = ticket.target, "Dropping stale heritage response");
            return false;
        }

        match result {
            Ok(entry) => {
                self.entry = Some(entry);
                self.state = DetailState::Viewing;
            }
            Err(e) if e.is_not_found() => {
                self.state = DetailState::NotFound(ticket.target);
            }
            Err(e) => {
                tracing::warn!(heritage_id = ticket.target, error = %e, "Heritage fetch failed");
                self.error = Some(e.to_string());
                self.state = DetailState::Failed;
            }
        }
        true
    }

    pub async fn load<B: HeritageBackend + ?Sized>(&mut self, backend: &B, heritage_id: DbId) {
        let ticket = self.open(heritage_id);
        let result = backend.fetch_heritage(heritage_id).await;
        self.apply_load(ticket, result);
    }

    pub async fn load_raw<B: HeritageBackend + ?Sized>(&mut self, backend: &B, raw: &str) {
        if let Some(ticket) = self.open_raw(raw) {
            let result = backend.fetch_heritage(ticket.target).await;
            self.apply_load(ticket, result);
        }
    }

    /// Show an entry already held by the list without a round trip.
    pub fn show(&mut self, entry: HeritageEntry) -> Ticket {
        let ticket = self.open(entry.id);
        self.entry = Some(entry);
        self.state = DetailState::Viewing;
        ticket
    }

    // ---- editing ----

    pub fn start_edit(&mut self) -> Result<(), Rejected> {
        match &self.state {
            DetailState::Viewing => {}
            DetailState::Editing(_) => return Err(Rejected::DraftActive),
            DetailState::Loading | DetailState::Saving(_) => return Err(Rejected::Busy),
            _ => return Err(Rejected::NoSelection),
        }
        let entry = self.entry.as_ref().ok_or(Rejected::NoSelection)?;
        self.state = DetailState::Editing(HeritageDraft::new(entry));
        self.error = None;
        Ok(())
    }

    pub fn change_edit(&mut self, change: HeritageChange) -> Result<(), Rejected> {
        match &mut self.state {
            DetailState::Editing(draft) => Ok(draft.apply(change, &self.vocabulary)?),
            DetailState::Saving(_) => Err(Rejected::Busy),
            _ => Err(Rejected::NotEditing),
        }
    }

    pub fn cancel_edit(&mut self) -> Result<(), Rejected> {
        match &self.state {
            DetailState::Editing(_) => {
                self.state = DetailState::Viewing;
                Ok(())
            }
            DetailState::Saving(_) => Err(Rejected::Busy),
            _ => Err(Rejected::NotEditing),
        }
    }

    pub fn begin_commit(&mut self) -> Result<(Ticket, HeritageUpdate), Rejected> {
        let draft = match &self.state {
            DetailState::Editing(draft) => draft.clone(),
            DetailState::Saving(_) => return Err(Rejected::Busy),
            _ => return Err(Rejected::NotEditing),
        };
        let ticket = self.selection.ticket().ok_or(Rejected::NoSelection)?;
        let update = draft.to_update();

        self.error = None;
        self.state = DetailState::Saving(draft);
        Ok((ticket, update))
    }

    /// Apply a commit response. Returns the persisted entry whenever the
    /// backend accepted the change, even if the detail has moved on, so the
    /// caller can reconcile its list.
    pub fn finish_commit(
        &mut self,
        ticket: Ticket,
        result: Result<HeritageEntry, ApiError>,
    ) -> Option<HeritageEntry> {
        let current = self.selection.is_current(&ticket);
        let saving = match &self.state {
            DetailState::Saving(draft) if current => Some(draft.clone()),
            _ => None,
        };

        match (result, saving) {
            (Ok(saved), Some(_)) => {
                tracing::info!(heritage_id = saved.id, "Heritage entry saved");
                self.entry = Some(saved.clone());
                self.state = DetailState::Viewing;
                Some(saved)
            }
            (Ok(saved), None) => {
                tracing::debug!(heritage_id = ticket.target, "Save landed after selection changed");
                Some(saved)
            }
            (Err(e), Some(draft)) => {
                tracing::warn!(
                    heritage_id = ticket.target,
                    error = %e,
                    "Saving heritage entry failed"
                );
                self.error = Some(e.to_string());
                self.state = DetailState::Editing(draft);
                None
            }
            (Err(e), None) => {
                tracing::debug!(
                    heritage_id = ticket.target,
                    error = %e,
                    "Dropping stale save failure"
                );
                None
            }
        }
    }

    pub async fn commit_edit<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<Option<HeritageEntry>, Rejected> {
        let (ticket, update) = self.begin_commit()?;
        let result = backend.update_heritage(ticket.target, &update).await;
        Ok(self.finish_commit(ticket, result))
    }
}
