//! alumni-sync - notification feed and live chat synchronization
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod app;
pub mod carousel;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod injection;
pub mod models;
pub mod notifications;
pub mod read_state;
pub mod traits;
