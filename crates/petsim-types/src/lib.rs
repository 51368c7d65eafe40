//! Shared type definitions for the pet simulation.
//!
//! # Modules
//!
//! - [`ids`] -- Identifiers for pets, quests, and catalog items
//! - [`enums`] -- Pet types, stat kinds, and item categories
//! - [`structs`] -- Read snapshots of pets and quests
//! - [`events`] -- Notifications emitted by the engine

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

pub use enums::{ItemCategory, PetStat, PetType};
pub use events::{EventRecord, SimEvent};
pub use ids::{ItemId, PetId, QuestId};
pub use structs::{PetSnapshot, QuestSnapshot};
