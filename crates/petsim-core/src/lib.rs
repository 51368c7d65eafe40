//! Concurrent engine for the virtual pet simulation.
//!
//! Each live pet has its own Decay Process, and one global Quest Process
//! advances survival quests. Both mutate a single shared [`Registry`]; every
//! state transition is queued as an event and delivered to the registered
//! [`SimObserver`]s in order.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `petsim-config.yaml`.
//! - [`engine`] -- The [`Engine`] facade: builder, commands, shutdown.
//! - [`error`] -- [`EngineError`], the top-level error.
//! - [`events`] -- Observers and the event dispatcher.
//! - [`process`] -- The Decay and Quest Process loops.
//! - [`registry`] -- The lock-protected store of pets, quests, and points.
//! - [`shutdown`] -- The session-wide stop signal.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod process;
pub mod registry;
pub mod shutdown;

pub use config::{ConfigError, SimulationConfig};
pub use engine::{Engine, EngineBuilder, ShutdownReport};
pub use error::EngineError;
pub use events::{ChannelObserver, SimObserver, TracingObserver};
pub use registry::{ItemUseOutcome, Registry, RegistryError};
