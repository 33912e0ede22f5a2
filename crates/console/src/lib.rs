//! Heritage catalog console.
//!
//! Controllers ([`controllers`]) are explicit state machines over one
//! backend resource each; pages ([`pages`]) compose them around a shared
//! [`heritage_client::HeritageBackend`]. The `heritage-console` binary
//! drives the pages through [`commands`] and prints with [`render`].

pub mod commands;
pub mod config;
pub mod controllers;
pub mod error;
pub mod pages;
pub mod render;
pub mod ticket;

pub use error::Rejected;
