//! Infrastructure layer for the conversations manager.
//!
//! Contains implementations of the repository traits defined in `convs-core`
//! (SQLite storage), global configuration loading, and data directory
//! resolution.

pub mod config;
pub mod filesystem;
pub mod sqlite;
