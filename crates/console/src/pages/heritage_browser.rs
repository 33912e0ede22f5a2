//! Heritage browser page: filtered list, the detail panel of the selected
//! entry and its quizzes.

use std::sync::Arc;

use heritage_client::HeritageBackend;
use heritage_core::collation::TitleCollator;
use heritage_core::draft::{HeritageChange, QuizChange};
use heritage_core::filter::{HeritageFilter, SortOrder};
use heritage_core::types::DbId;
use heritage_core::vocabulary::Vocabulary;

use crate::controllers::{HeritageDetailController, HeritageListController, QuizController};
use crate::error::Rejected;

/// What the detail panel shows below the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailView {
    #[default]
    DetailsOnly,
    DetailsAndQuiz,
}

pub struct HeritageBrowser<B: HeritageBackend + ?Sized> {
    backend: Arc<B>,
    list: HeritageListController,
    detail: HeritageDetailController,
    quizzes: QuizController,
    view: DetailView,
}

impl<B: HeritageBackend + ?Sized> HeritageBrowser<B> {
    pub fn new(backend: Arc<B>, vocabulary: Arc<Vocabulary>, collator: TitleCollator) -> Self {
        Self {
            backend,
            list: HeritageListController::new(collator, Arc::clone(&vocabulary)),
            detail: HeritageDetailController::new(vocabulary),
            quizzes: QuizController::new(),
            view: DetailView::default(),
        }
    }

    pub fn list(&self) -> &HeritageListController {
        &self.list
    }

    pub fn detail(&self) -> &HeritageDetailController {
        &self.detail
    }

    pub fn quizzes(&self) -> &QuizController {
        &self.quizzes
    }

    pub fn view(&self) -> DetailView {
        self.view
    }

    pub fn error(&self) -> Option<&str> {
        self.quizzes
            .error()
            .or_else(|| self.detail.error())
            .or_else(|| self.list.error())
    }

    // ---- list ----

    pub async fn load_list(&mut self) -> Result<(), Rejected> {
        self.list.load(&*self.backend).await
    }

    pub fn set_filter(&mut self, filter: HeritageFilter) -> Result<(), Rejected> {
        self.list.set_filter(filter)
    }

    pub fn update_filter(
        &mut self,
        change: impl FnOnce(&mut HeritageFilter),
    ) -> Result<(), Rejected> {
        self.list.update_filter(change)
    }

    pub fn toggle_sort(&mut self) -> SortOrder {
        self.list.toggle_sort()
    }

    // ---- selection ----

    pub async fn select(&mut self, index: usize) -> Result<(), Rejected> {
        if !self.list.select(index) && self.list.selected_index() != Some(index) {
            return Err(Rejected::NoSelection);
        }
        self.open_selected().await;
        Ok(())
    }

    pub async fn next(&mut self) -> Result<bool, Rejected> {
        self.ensure_idle()?;
        if !self.list.next() {
            return Ok(false);
        }
        self.open_selected().await;
        Ok(true)
    }

    pub async fn prev(&mut self) -> Result<bool, Rejected> {
        self.ensure_idle()?;
        if !self.list.prev() {
            return Ok(false);
        }
        self.open_selected().await;
        Ok(true)
    }

    pub fn close(&mut self) {
        self.list.close();
        self.detail.close();
        self.quizzes.close();
        self.view = DetailView::DetailsOnly;
    }

    /// Open a detail from user-supplied text, independent of the list
    /// filter. The list cursor closes when the entry is not visible.
    pub async fn open_by_id(&mut self, raw: &str) {
        self.view = DetailView::DetailsOnly;
        self.detail.load_raw(&*self.backend, raw).await;
        match self.detail.heritage_id() {
            Some(id) => {
                if !self.list.select_id(id) {
                    self.list.close();
                }
                self.quizzes.attach(id);
            }
            None => {
                self.list.close();
                self.quizzes.close();
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), Rejected> {
        if self.detail.is_busy() || self.quizzes.is_busy() {
            return Err(Rejected::Busy);
        }
        Ok(())
    }

    async fn open_selected(&mut self) {
        let Some(id) = self.list.selected_id() else {
            return;
        };
        self.view = DetailView::DetailsOnly;
        self.quizzes.attach(id);
        self.detail.load(&*self.backend, id).await;
    }

    // ---- editing ----

    pub fn start_edit(&mut self) -> Result<(), Rejected> {
        self.detail.start_edit()
    }

    pub fn change_edit(&mut self, change: HeritageChange) -> Result<(), Rejected> {
        self.detail.change_edit(change)
    }

    pub fn cancel_edit(&mut self) -> Result<(), Rejected> {
        self.detail.cancel_edit()
    }

    /// Commit the draft and swap the saved entry into the list.
    pub async fn commit_edit(&mut self) -> Result<(), Rejected> {
        if let Some(saved) = self.detail.commit_edit(&*self.backend).await? {
            if !self.list.reconcile(&saved) {
                tracing::debug!(heritage_id = saved.id, "Saved entry not in list cache");
            }
        }
        Ok(())
    }

    // ---- quizzes ----

    /// Switch to the quiz view, fetching the list the first time.
    pub async fn show_quizzes(&mut self) -> Result<(), Rejected> {
        if self.quizzes.heritage_id().is_none() {
            return Err(Rejected::NoSelection);
        }
        self.view = DetailView::DetailsAndQuiz;
        self.quizzes.ensure_loaded(&*self.backend).await
    }

    pub fn hide_quizzes(&mut self) {
        self.view = DetailView::DetailsOnly;
    }

    /// Generate a quiz for `heritage_id`; the quiz view opens if that entry
    /// is still the open one when generation finishes.
    pub async fn generate_quiz(&mut self, heritage_id: DbId) -> Result<(), Rejected> {
        if self.quizzes.generate(&*self.backend, heritage_id).await? {
            self.view = DetailView::DetailsAndQuiz;
        }
        Ok(())
    }

    pub fn start_quiz_edit(&mut self, quiz_id: DbId) -> Result<(), Rejected> {
        self.quizzes.start_edit(quiz_id)
    }

    pub fn change_quiz_edit(&mut self, change: QuizChange) -> Result<(), Rejected> {
        self.quizzes.change_edit(change)
    }

    /// Drop the quiz draft, running any refresh a generation deferred.
    pub async fn cancel_quiz_edit(&mut self) -> Result<(), Rejected> {
        self.quizzes.cancel_edit()?;
        self.quizzes.refresh_if_stale(&*self.backend).await?;
        Ok(())
    }

    pub async fn commit_quiz_edit(&mut self) -> Result<(), Rejected> {
        self.quizzes.commit_edit(&*self.backend).await
    }
}
