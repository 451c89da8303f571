//! Core library for moltdash.
//!
//! - `core`: session state machine, activity events, card formatting, status view
//! - `client`: HTTP client for the agent dashboard server (status, SSE, suggestions)
//! - `stream` / `poller`: background tasks feeding the session inbox
//! - `config` / `logging`: ambient setup shared by every mode

pub mod client;
pub mod config;
pub mod core;
pub mod logging;
pub mod poller;
pub mod stream;
pub mod suggestions;
