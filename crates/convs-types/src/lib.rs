//! Shared domain types for the conversations manager.
//!
//! This crate contains the core domain types used across the workspace:
//! Bot, BotModule, story blocks, assessment questions, configuration and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod assessment;
pub mod bot;
pub mod config;
pub mod error;
pub mod event;
pub mod module;
pub mod story;
