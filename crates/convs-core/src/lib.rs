//! Business logic and repository trait definitions.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements. It depends only on `convs-types` -- never on
//! `convs-infra` or any database/IO crate.

pub mod event;
pub mod repository;
pub mod service;
