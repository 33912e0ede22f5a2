//! Heritage list: cached entries, client-side filter and title sort, and
//! the selection cursor over the visible rows.

use std::sync::Arc;

use heritage_client::{ApiError, HeritageBackend};
use heritage_core::collation::TitleCollator;
use heritage_core::cursor::SelectionCursor;
use heritage_core::filter::{filter_and_sort, HeritageFilter, SortOrder};
use heritage_core::models::{replace_by_id, HeritageEntry};
use heritage_core::types::DbId;
use heritage_core::vocabulary::Vocabulary;

use crate::error::Rejected;

#[derive(Debug)]
pub struct HeritageListController {
    entries: Vec<HeritageEntry>,
    filter: HeritageFilter,
    order: SortOrder,
    collator: TitleCollator,
    vocabulary: Arc<Vocabulary>,
    /// Index into [`Self::visible`], not into `entries`.
    cursor: SelectionCursor,
    loading: bool,
    error: Option<String>,
}

impl HeritageListController {
    pub fn new(collator: TitleCollator, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            entries: Vec::new(),
            filter: HeritageFilter::default(),
            order: SortOrder::default(),
            collator,
            vocabulary,
            cursor: SelectionCursor::default(),
            loading: false,
            error: None,
        }
    }

    pub fn entries(&self) -> &[HeritageEntry] {
        &self.entries
    }

    pub fn filter(&self) -> &HeritageFilter {
        &self.filter
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Cached entries passing the filter, in display order.
    pub fn visible(&self) -> Vec<&HeritageEntry> {
        filter_and_sort(&self.entries, &self.filter, &self.collator, self.order)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.cursor.index()
    }

    pub fn selected(&self) -> Option<&HeritageEntry> {
        let index = self.cursor.index()?;
        self.visible().get(index).copied()
    }

    pub fn selected_id(&self) -> Option<DbId> {
        self.selected().map(|e| e.id)
    }

    // ---- loading ----

    pub fn begin_load(&mut self) -> Result<(), Rejected> {
        if self.loading {
            return Err(Rejected::Busy);
        }
        self.loading = true;
        self.error = None;
        Ok(())
    }

    /// Replace the cache on success; on failure keep the stale cache.
    pub fn apply_load(&mut self, result: Result<Vec<HeritageEntry>, ApiError>) {
        self.loading = false;
        match result {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Heritage list loaded");
                let selected = self.selected_id();
                self.entries = entries;
                self.retarget(selected);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Heritage list load failed");
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn load<B: HeritageBackend + ?Sized>(&mut self, backend: &B) -> Result<(), Rejected> {
        self.begin_load()?;
        let result = backend.list_heritages().await;
        self.apply_load(result);
        Ok(())
    }

    // ---- filter and sort ----

    /// Replace the filter. The selection follows its entry if it is still
    /// visible and closes otherwise.
    ///
    /// A filter naming a tag or criterion outside the vocabulary is
    /// rejected and the current filter stays in place.
    pub fn set_filter(&mut self, filter: HeritageFilter) -> Result<(), Rejected> {
        filter.validate(&self.vocabulary)?;
        let selected = self.selected_id();
        self.filter = filter;
        self.retarget(selected);
        Ok(())
    }

    pub fn update_filter(
        &mut self,
        change: impl FnOnce(&mut HeritageFilter),
    ) -> Result<(), Rejected> {
        let mut filter = self.filter.clone();
        change(&mut filter);
        self.set_filter(filter)
    }

    pub fn toggle_sort(&mut self) -> SortOrder {
        let selected = self.selected_id();
        self.order = self.order.toggled();
        self.retarget(selected);
        self.order
    }

    fn retarget(&mut self, selected: Option<DbId>) {
        self.cursor.close();
        let Some(id) = selected else { return };
        let found = {
            let visible = self.visible();
            visible
                .iter()
                .position(|e| e.id == id)
                .map(|index| (index, visible.len()))
        };
        if let Some((index, len)) = found {
            self.cursor.select(index, len);
        }
    }

    // ---- cursor ----

    pub fn select(&mut self, index: usize) -> bool {
        let len = self.visible().len();
        self.cursor.select(index, len)
    }

    /// Select the visible row holding `heritage_id`.
    pub fn select_id(&mut self, heritage_id: DbId) -> bool {
        let position = self.visible().iter().position(|e| e.id == heritage_id);
        match position {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        let len = self.visible().len();
        self.cursor.next(len)
    }

    pub fn prev(&mut self) -> bool {
        self.cursor.prev()
    }

    pub fn close(&mut self) {
        self.cursor.close();
    }

    // ---- reconciliation ----

    /// Swap in a committed entry by id. Returns `false` if the entry is not
    /// cached.
    pub fn reconcile(&mut self, updated: &HeritageEntry) -> bool {
        let selected = self.selected_id();
        let replaced = replace_by_id(&mut self.entries, updated, |e| e.id);
        if replaced {
            self.retarget(selected);
        }
        replaced
    }
}
