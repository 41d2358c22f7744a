//! Compilation of cleanup rules into back-reference capable regexes.
//!
//! Rules come from the pipeline configuration; the compiled set is cached so
//! that every file of every target shares one compilation.

pub mod compiler;
