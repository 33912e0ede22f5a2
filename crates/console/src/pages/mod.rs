//! Pages composing controllers around one shared backend handle.

pub mod heritage_browser;
pub mod image_manager;

pub use heritage_browser::{DetailView, HeritageBrowser};
pub use image_manager::ImageManager;
