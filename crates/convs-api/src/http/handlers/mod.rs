//! HTTP request handlers for the REST API.

pub mod bot;
pub mod module;
