//! REST client for the heritage backend.
//!
//! [`api::HeritageApi`] wraps every backend endpoint in one typed async
//! method using [`reqwest`]. [`backend::HeritageBackend`] abstracts those
//! operations so the console controllers can also run against an
//! in-memory backend.

pub mod api;
pub mod backend;

pub use api::{ApiError, HeritageApi};
pub use backend::HeritageBackend;
