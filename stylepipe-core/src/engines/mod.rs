// stylepipe-core/src/engines/mod.rs
//! This module contains the `StylesheetStage` implementations.
//!
//! Each stage is a separate file within this directory. A target's pipeline is
//! assembled from these in `pipeline.rs`: preprocess, then (optionally)
//! cleanup, then prefix.
//!
//! # License
//! MIT OR APACHE 2.0

pub mod cleanup_engine;
pub mod prefix_engine;
pub mod preprocess_engine;
