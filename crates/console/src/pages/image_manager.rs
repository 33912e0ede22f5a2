//! Image manager page: image list plus the analysis panel of the selected
//! image.

use std::sync::Arc;

use heritage_client::HeritageBackend;
use heritage_core::draft::HeritageChange;
use heritage_core::models::ImageRecord;
use heritage_core::types::DbId;
use heritage_core::vocabulary::Vocabulary;

use crate::controllers::{AnalysisController, ImageListController};
use crate::error::Rejected;

pub struct ImageManager<B: HeritageBackend + ?Sized> {
    backend: Arc<B>,
    images: ImageListController,
    analysis: AnalysisController,
}

impl<B: HeritageBackend + ?Sized> ImageManager<B> {
    pub fn new(backend: Arc<B>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            backend,
            images: ImageListController::new(),
            analysis: AnalysisController::new(vocabulary),
        }
    }

    pub fn images(&self) -> &ImageListController {
        &self.images
    }

    pub fn analysis(&self) -> &AnalysisController {
        &self.analysis
    }

    pub fn image_url(&self, image: &ImageRecord) -> String {
        self.backend.image_url(&image.filename)
    }

    /// First error to show, analysis panel before the list.
    pub fn error(&self) -> Option<&str> {
        self.analysis.error().or_else(|| self.images.error())
    }

    pub async fn refresh(&mut self) -> Result<(), Rejected> {
        self.images.load(&*self.backend).await?;
        self.follow_reload();
        Ok(())
    }

    pub async fn upload(&mut self, filename: &str, bytes: Vec<u8>) -> Result<(), Rejected> {
        self.images.upload(&*self.backend, filename, bytes).await?;
        self.follow_reload();
        Ok(())
    }

    /// Close the analysis panel when its image vanished from the list.
    fn follow_reload(&mut self) {
        if self.images.selected_index().is_some() {
            return;
        }
        if let Some(image_id) = self.analysis.image_id() {
            tracing::debug!(image_id, "Selected image gone after reload");
            self.analysis.close();
        }
    }

    // ---- selection ----

    /// Open the image at `index`. Always allowed: any in-flight request for
    /// the previous image is superseded.
    pub async fn select(&mut self, index: usize) -> Result<(), Rejected> {
        let image_id = self
            .images
            .images()
            .get(index)
            .map(|img| img.id)
            .ok_or(Rejected::NoSelection)?;
        self.images.select(index);
        self.analysis.load(&*self.backend, image_id).await;
        Ok(())
    }

    pub async fn select_id(&mut self, image_id: DbId) -> Result<(), Rejected> {
        let index = self
            .images
            .position_of(image_id)
            .ok_or(Rejected::UnknownItem(image_id))?;
        self.select(index).await
    }

    pub async fn next(&mut self) -> Result<bool, Rejected> {
        self.ensure_idle()?;
        if !self.images.next() {
            return Ok(false);
        }
        self.open_selected().await;
        Ok(true)
    }

    pub async fn prev(&mut self) -> Result<bool, Rejected> {
        self.ensure_idle()?;
        if !self.images.prev() {
            return Ok(false);
        }
        self.open_selected().await;
        Ok(true)
    }

    pub fn close(&mut self) {
        self.images.close();
        self.analysis.close();
    }

    fn ensure_idle(&self) -> Result<(), Rejected> {
        if self.analysis.is_busy() {
            return Err(Rejected::Busy);
        }
        Ok(())
    }

    async fn open_selected(&mut self) {
        if let Some(image_id) = self.images.selected().map(|img| img.id) {
            self.analysis.load(&*self.backend, image_id).await;
        }
    }

    // ---- analysis panel ----

    pub async fn analyze(&mut self) -> Result<(), Rejected> {
        self.analysis.analyze(&*self.backend).await
    }

    pub async fn show_analysis(&mut self) -> Result<(), Rejected> {
        self.analysis.redisplay(&*self.backend).await
    }

    pub fn back_to_image(&mut self) -> Result<(), Rejected> {
        self.analysis.back_to_image()
    }

    pub fn start_edit(&mut self, entry_id: DbId) -> Result<(), Rejected> {
        self.analysis.start_edit(entry_id)
    }

    pub fn change_edit(&mut self, change: HeritageChange) -> Result<(), Rejected> {
        self.analysis.change_edit(change)
    }

    pub fn cancel_edit(&mut self) -> Result<(), Rejected> {
        self.analysis.cancel_edit()
    }

    pub async fn commit_edit(&mut self) -> Result<(), Rejected> {
        self.analysis.commit_edit(&*self.backend).await
    }

    /// Delete the selected image, then close the selection and reload the
    /// list.
    pub async fn delete(&mut self) -> Result<(), Rejected> {
        let ticket = self.analysis.begin_delete()?;
        let result = self.backend.delete_image(ticket.target).await;
        if self.analysis.finish_delete(ticket, result) {
            self.images.close();
            self.images.load(&*self.backend).await?;
        }
        Ok(())
    }
}
