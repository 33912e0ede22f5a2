//! Domain layer of the heritage console.
//!
//! Entities, controlled vocabularies, input codecs, list filtering and the
//! selection cursor. This crate performs no I/O; the client and console
//! crates feed it data fetched from the backend.

pub mod codec;
pub mod collation;
pub mod cursor;
pub mod draft;
pub mod error;
pub mod filter;
pub mod models;
pub mod types;
pub mod vocabulary;
