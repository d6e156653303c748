//! Cadence CLI - headless player host
//!
//! Building blocks for the `cadence` binary: configuration loading, a
//! JSON-file track catalog, a console media element and the line command
//! parser.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod media;
