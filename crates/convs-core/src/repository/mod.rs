//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (convs-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod bot;
pub mod module;

#[cfg(test)]
pub(crate) mod mock;

/// Sort order for list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}
