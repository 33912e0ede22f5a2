//! Image list: the cached collection, the modal cursor and uploads.

use heritage_client::{ApiError, HeritageBackend};
use heritage_core::cursor::SelectionCursor;
use heritage_core::models::ImageRecord;
use heritage_core::types::DbId;

use crate::error::Rejected;

/// Collection-level activity. Only one may run at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListActivity {
    #[default]
    Idle,
    Loading,
    Uploading,
}

#[derive(Debug, Default)]
pub struct ImageListController {
    images: Vec<ImageRecord>,
    cursor: SelectionCursor,
    activity: ListActivity,
    error: Option<String>,
}

impl ImageListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn activity(&self) -> ListActivity {
        self.activity
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.cursor.index()
    }

    pub fn selected(&self) -> Option<&ImageRecord> {
        self.cursor.index().and_then(|i| self.images.get(i))
    }

    // ---- loading ----

    pub fn begin_load(&mut self) -> Result<(), Rejected> {
        if self.activity == ListActivity::Loading {
            return Err(Rejected::Busy);
        }
        self.activity = ListActivity::Loading;
        self.error = None;
        Ok(())
    }

    /// Replace the cache wholesale on success; keep the stale cache on
    /// failure. The cursor follows the selected image by id and closes if
    /// the image is gone.
    pub fn apply_load(&mut self, result: Result<Vec<ImageRecord>, ApiError>) {
        self.activity = ListActivity::Idle;
        match result {
            Ok(images) => {
                tracing::debug!(count = images.len(), "Image list loaded");
                let selected = self.selected().map(|img| img.id);
                self.images = images;
                self.cursor.close();
                if let Some(index) = selected.and_then(|id| self.position_of(id)) {
                    self.cursor.select(index, self.images.len());
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image list load failed");
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn load<B: HeritageBackend + ?Sized>(&mut self, backend: &B) -> Result<(), Rejected> {
        self.begin_load()?;
        let result = backend.list_images().await;
        self.apply_load(result);
        Ok(())
    }

    // ---- upload ----

    pub fn begin_upload(&mut self) -> Result<(), Rejected> {
        if self.activity != ListActivity::Idle {
            return Err(Rejected::Busy);
        }
        self.activity = ListActivity::Uploading;
        self.error = None;
        Ok(())
    }

    /// Returns `true` when the upload succeeded and the list should be
    /// reloaded.
    pub fn finish_upload(&mut self, result: Result<(), ApiError>) -> bool {
        self.activity = ListActivity::Idle;
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Image upload failed");
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Upload a file and refresh the list.
    pub async fn upload<B: HeritageBackend + ?Sized>(
        &mut self,
        backend: &B,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), Rejected> {
        self.begin_upload()?;
        let result = backend.upload_image(filename, bytes).await;
        if self.finish_upload(result) {
            tracing::info!(filename, "Image uploaded");
            self.load(backend).await?;
        }
        Ok(())
    }

    // ---- cursor ----

    pub fn select(&mut self, index: usize) -> bool {
        self.cursor.select(index, self.images.len())
    }

    pub fn next(&mut self) -> bool {
        self.cursor.next(self.images.len())
    }

    pub fn prev(&mut self) -> bool {
        self.cursor.prev()
    }

    pub fn close(&mut self) {
        self.cursor.close();
    }

    pub fn position_of(&self, image_id: DbId) -> Option<usize> {
        self.images.iter().position(|img| img.id == image_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i64) -> ImageRecord {
        ImageRecord {
            id,
            filename: format!("{id}.jpg"),
            timestamp: "2024-01-01T00:00:00".into(),
        }
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: 500,
            message: "failed to fetch images".into(),
        }
    }

    #[test]
    fn failed_reload_keeps_stale_cache() {
        let mut list = ImageListController::new();
        list.begin_load().unwrap();
        list.apply_load(Ok(vec![image(1), image(2)]));

        list.begin_load().unwrap();
        list.apply_load(Err(server_error()));

        assert_eq!(list.images().len(), 2);
        assert_eq!(list.error(), Some("failed to fetch images (status: 500)"));
        assert_eq!(list.activity(), ListActivity::Idle);
    }

    #[test]
    fn double_load_is_rejected() {
        let mut list = ImageListController::new();
        list.begin_load().unwrap();
        assert_eq!(list.begin_load(), Err(Rejected::Busy));
        assert_eq!(list.begin_upload(), Err(Rejected::Busy));
    }

    #[test]
    fn shrinking_list_drops_out_of_range_selection() {
        let mut list = ImageListController::new();
        list.apply_load(Ok(vec![image(1), image(2), image(3)]));
        assert!(list.select(2));

        list.apply_load(Ok(vec![image(1)]));
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn reload_keeps_cursor_on_the_same_image() {
        let mut list = ImageListController::new();
        list.apply_load(Ok(vec![image(1), image(2), image(3)]));
        assert!(list.select(1));

        list.apply_load(Ok(vec![image(2), image(3)]));
        assert_eq!(list.selected().map(|img| img.id), Some(2));
        assert_eq!(list.selected_index(), Some(0));

        list.apply_load(Ok(vec![image(3), image(4)]));
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn failed_upload_reports_and_skips_reload() {
        let mut list = ImageListController::new();
        list.begin_upload().unwrap();
        assert!(!list.finish_upload(Err(server_error())));
        assert!(list.error().is_some());
        assert_eq!(list.activity(), ListActivity::Idle);
    }
}
