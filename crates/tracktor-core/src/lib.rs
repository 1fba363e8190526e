//! Core domain + application logic for tracktor.
//!
//! This crate is intentionally framework-agnostic. Telegram and the
//! Transmission daemon live behind ports (traits) implemented in adapter
//! crates; what lives here is the forum extractor, the descriptor cache,
//! and the torrent lifecycle state machine.

pub mod action;
pub mod config;
pub mod domain;
pub mod errors;
pub mod keyboard;
pub mod lifecycle;
pub mod logging;
pub mod ports;
pub mod render;
pub mod testing;
pub mod torrent;
pub mod tracker;

pub use errors::{Error, Result};
