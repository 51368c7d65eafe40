//! Error types for the petsim-pets crate.
//!
//! Pet and quest mutations cannot fail: stats clamp and quest counters
//! saturate. The only fallible operation is building an item catalog from
//! untrusted definitions.

/// Errors raised while validating an item catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no items at all.
    #[error("item catalog is empty")]
    EmptyCatalog,

    /// Two items share a name.
    #[error("duplicate item name: {0}")]
    DuplicateItem(String),

    /// An item cannot be used on any pet type.
    #[error("item {0} has no compatible pet types")]
    NoCompatiblePets(String),

    /// An item does not affect any stat.
    #[error("item {0} affects no stats")]
    NoAffectedStats(String),

    /// An item has zero potency.
    #[error("item {0} has zero potency")]
    ZeroPotency(String),
}
