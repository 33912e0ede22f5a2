//! Per-page state machines.
//!
//! Controllers hold no backend handle; each async method borrows one for
//! the duration of the call.

pub mod analysis;
pub mod detail;
pub mod heritages;
pub mod images;
pub mod quiz;

pub use analysis::{AnalysisController, AnalysisState, AnalysisView};
pub use detail::{DetailState, HeritageDetailController};
pub use heritages::HeritageListController;
pub use images::{ImageListController, ListActivity};
pub use quiz::{QuizController, QuizState};
