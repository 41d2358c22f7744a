// stylepipe/src/lib.rs
//! # Stylepipe CLI
//!
//! Command-line front end for `stylepipe-core`: builds stylesheet targets,
//! runs the selector deduplicator as a filter, and lists target contents.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
