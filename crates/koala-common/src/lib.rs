//! Common utilities for the Koala HTML parser.
//!
//! This crate provides shared infrastructure used by the parser crates:
//! - **Warning System** - deduplicated, colored terminal output for parse
//!   diagnostics and unsupported features

pub mod warning;
