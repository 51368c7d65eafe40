//! The engine facade: builder, commands, and lifecycle.
//!
//! An [`Engine`] owns the registry, the shutdown signal, every background
//! task, and the event dispatcher. It must be started and used from inside
//! a Tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), petsim_core::EngineError> {
//! use petsim_core::{ChannelObserver, Engine, SimulationConfig};
//! use petsim_types::PetType;
//!
//! let (observer, mut events) = ChannelObserver::channel();
//! let engine = Engine::builder(SimulationConfig::default())
//!     .observer(observer)
//!     .start()?;
//!
//! let rex = engine.adopt("Rex", PetType::Dog).await?;
//! let _ = engine.pet(rex).await;
//! let report = engine.shutdown().await;
//! assert_eq!(report.pets_alive, 1);
//! while let Some(record) = events.recv().await {
//!     println!("{:?}", record.event);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use petsim_pets::ItemCatalog;
use petsim_types::{ItemId, PetId, PetSnapshot, PetType, QuestSnapshot};
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::EngineError;
use crate::events::{SimObserver, spawn_dispatcher};
use crate::process::{self, ProcessExit};
use crate::registry::{ItemUseOutcome, Registry, RegistryError};
use crate::shutdown::ShutdownSignal;

/// Collects configuration and observers before the engine starts.
pub struct EngineBuilder {
    config: SimulationConfig,
    observers: Vec<Arc<dyn SimObserver>>,
}

impl EngineBuilder {
    /// Register an observer. Observers are called in registration order.
    #[must_use]
    pub fn observer(mut self, observer: impl SimObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Register an observer that is already shared.
    #[must_use]
    pub fn shared_observer(mut self, observer: Arc<dyn SimObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Validate the configuration, build the catalog, and start the event
    /// dispatcher and the Quest Process.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the configuration or catalog is invalid.
    pub fn start(self) -> Result<Engine, EngineError> {
        self.config.validate()?;
        let catalog = Arc::new(self.config.build_catalog()?);

        let (registry, events) = Registry::new(
            Arc::clone(&catalog),
            self.config.pets.clone(),
            self.config.quests.clone(),
        );
        let registry = Arc::new(registry);
        let shutdown = Arc::new(ShutdownSignal::new());

        let observer_count = self.observers.len();
        let dispatcher = spawn_dispatcher(events, self.observers);

        let mut tasks = JoinSet::new();
        tasks.spawn(process::run_quests(
            Arc::clone(&registry),
            Arc::clone(&shutdown),
            self.config.engine.quest_interval(),
        ));

        info!(
            decay_interval_ms = self.config.engine.decay_interval_ms,
            quest_interval_ms = self.config.engine.quest_interval_ms,
            items = catalog.len(),
            observers = observer_count,
            "Engine started"
        );

        Ok(Engine {
            config: self.config,
            catalog,
            registry,
            shutdown,
            tasks: Mutex::new(tasks),
            dispatcher: Mutex::new(Dispatcher::Running(dispatcher)),
        })
    }
}

/// Final state reported by [`Engine::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Pets alive when the registry closed.
    pub pets_alive: usize,
    /// Quests still active when the registry closed.
    pub quests_active: usize,
    /// Final point total.
    pub total_points: u64,
    /// Events delivered to observers over the engine's lifetime.
    pub events_delivered: u64,
}

/// Event dispatcher lifecycle. The delivered count is kept once known.
enum Dispatcher {
    Running(JoinHandle<u64>),
    Finished(u64),
}

/// A running simulation session.
pub struct Engine {
    config: SimulationConfig,
    catalog: Arc<ItemCatalog>,
    registry: Arc<Registry>,
    shutdown: Arc<ShutdownSignal>,
    tasks: Mutex<JoinSet<ProcessExit>>,
    dispatcher: Mutex<Dispatcher>,
}

impl Engine {
    /// Start building an engine.
    pub const fn builder(config: SimulationConfig) -> EngineBuilder {
        EngineBuilder {
            config,
            observers: Vec::new(),
        }
    }

    /// The configuration the engine was started with.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The item catalog.
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Adopt a pet: register it with its quest and start its Decay
    /// Process.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Closed`] after shutdown.
    pub async fn adopt(&self, name: &str, pet_type: PetType) -> Result<PetId, RegistryError> {
        // Held across registration so shutdown cannot drain the task set
        // between the pet appearing and its decay task being tracked.
        let mut tasks = self.tasks.lock().await;
        let pet_id = self.registry.adopt(name, pet_type).await?;

        tasks.spawn(process::run_decay(
            pet_id,
            Arc::clone(&self.registry),
            Arc::clone(&self.shutdown),
            self.config.engine.decay_interval(),
        ));
        while let Some(finished) = tasks.try_join_next() {
            log_task_exit(finished);
        }
        Ok(pet_id)
    }

    /// Use a catalog item on a live pet. Never fails; see
    /// [`ItemUseOutcome`] for the silent no-op cases.
    pub async fn use_item(&self, pet_id: PetId, item_id: ItemId) -> ItemUseOutcome {
        self.registry.use_item(pet_id, item_id).await
    }

    /// Snapshot of every live pet, in adoption order.
    pub async fn list_pets(&self) -> Vec<PetSnapshot> {
        self.registry.list_pets().await
    }

    /// Snapshot of one live pet.
    pub async fn pet(&self, pet_id: PetId) -> Option<PetSnapshot> {
        self.registry.pet(pet_id).await
    }

    /// Snapshot of every active quest, in registration order.
    pub async fn list_active_quests(&self) -> Vec<QuestSnapshot> {
        self.registry.list_active_quests().await
    }

    /// Points credited so far.
    pub async fn total_points(&self) -> u64 {
        self.registry.total_points().await
    }

    /// Whether [`Engine::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_requested()
    }

    /// Stop every background process and wait for them.
    ///
    /// Once this returns no further events are emitted and every event
    /// emitted before it has been delivered to the observers. Commands
    /// remain callable: reads return the final state, mutations are
    /// rejected. Calling it again returns the same counts.
    pub async fn shutdown(&self) -> ShutdownReport {
        info!("Engine shutdown requested");
        self.shutdown.request();
        let summary = self.registry.close().await;

        {
            let mut tasks = self.tasks.lock().await;
            while let Some(finished) = tasks.join_next().await {
                log_task_exit(finished);
            }
        }

        let events_delivered = {
            let mut dispatcher = self.dispatcher.lock().await;
            let delivered = match std::mem::replace(&mut *dispatcher, Dispatcher::Finished(0)) {
                Dispatcher::Running(handle) => handle.await.unwrap_or_else(|err| {
                    warn!(error = %err, "Event dispatcher failed");
                    0
                }),
                Dispatcher::Finished(delivered) => delivered,
            };
            *dispatcher = Dispatcher::Finished(delivered);
            delivered
        };

        let report = ShutdownReport {
            pets_alive: summary.pets_alive,
            quests_active: summary.quests_active,
            total_points: summary.total_points,
            events_delivered,
        };
        info!(
            pets_alive = report.pets_alive,
            quests_active = report.quests_active,
            total_points = report.total_points,
            events_delivered,
            "Engine stopped"
        );
        report
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown.request();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

fn log_task_exit(finished: Result<ProcessExit, tokio::task::JoinError>) {
    match finished {
        Ok(exit) => debug!(?exit, "Background process finished"),
        Err(err) => warn!(error = %err, "Background process failed"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use petsim_pets::ItemDefinition;
    use petsim_types::PetStat;

    use super::*;
    use crate::config::ConfigError;
    use crate::events::ChannelObserver;

    #[tokio::test(start_paused = true)]
    async fn start_rejects_invalid_config() {
        let mut config = SimulationConfig::default();
        config.engine.decay_interval_ms = 0;
        let err = Engine::builder(config).start().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                source: ConfigError::Invalid { .. }
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn start_rejects_empty_catalog() {
        let config = SimulationConfig {
            catalog: Some(Vec::<ItemDefinition>::new()),
            ..SimulationConfig::default()
        };
        let err = Engine::builder(config).start().unwrap_err();
        assert!(matches!(err, EngineError::Catalog { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn adopt_then_decay_through_engine() {
        let engine = Engine::builder(SimulationConfig::default()).start().unwrap();
        let id = engine.adopt("Rex", PetType::Dog).await.unwrap();

        tokio::time::sleep(Duration::from_millis(6_500)).await;
        let pet = engine.pet(id).await.unwrap();
        assert_eq!(pet.stat(PetStat::Hunger), 48);

        let report = engine.shutdown().await;
        assert_eq!(report.pets_alive, 1);
        assert_eq!(report.quests_active, 1);
        assert_eq!(report.events_delivered, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_shutdown_reports_the_same_counts() {
        let engine = Engine::builder(SimulationConfig::default()).start().unwrap();
        let _ = engine.adopt("Rex", PetType::Dog).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        let first = engine.shutdown().await;
        assert_eq!(first.events_delivered, 3);
        let second = engine.shutdown().await;
        assert_eq!(second, first);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_after_shutdown() {
        let (observer, mut rx) = ChannelObserver::channel();
        let engine = Engine::builder(SimulationConfig::default())
            .observer(observer)
            .start()
            .unwrap();
        let id = engine.adopt("Rex", PetType::Dog).await.unwrap();
        let first = engine.shutdown().await;
        assert!(engine.is_shut_down());

        assert_eq!(
            engine.adopt("Late", PetType::Cat).await,
            Err(RegistryError::Closed)
        );
        assert_eq!(
            engine.use_item(id, ItemId(1)).await,
            ItemUseOutcome::UnknownPet
        );
        assert_eq!(engine.list_pets().await.len(), 1);

        let second = engine.shutdown().await;
        assert_eq!(second, first);

        // No events ever happened, and the dispatcher has dropped the
        // observer so the channel is closed.
        assert!(rx.recv().await.is_none());
    }
}
