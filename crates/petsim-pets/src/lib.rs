//! Pet, item, and quest entities for the pet simulation.
//!
//! Everything here is plain data with small invariant-preserving mutators.
//! Timing, locking, and notification live in `petsim-core`.
//!
//! # Modules
//!
//! - [`config`] -- Tunables for stats and quests ([`PetConfig`], [`QuestConfig`])
//! - [`error`] -- Catalog validation errors ([`CatalogError`])
//! - [`item`] -- Items and the static [`ItemCatalog`]
//! - [`pet`] -- The [`Pet`] entity, item use, and decay ticks
//! - [`quest`] -- [`SurvivalQuest`] progress and rewards

pub mod config;
pub mod error;
pub mod item;
pub mod pet;
pub mod quest;

pub use config::{PetConfig, QuestConfig, STAT_MAX};
pub use error::CatalogError;
pub use item::{Item, ItemCatalog, ItemDefinition, builtin_definitions};
pub use pet::{DecayTickResult, Pet, StatChange};
pub use quest::SurvivalQuest;
