//! The shared store of live pets, active quests, and the point total.
//!
//! All state sits behind one [`tokio::sync::Mutex`]. Every operation takes
//! the lock once, does all of its reads, writes, and event publication, and
//! releases it. That gives the guarantees the rest of the engine relies on:
//!
//! - A pet that dies is removed in the same critical section that zeroed
//!   its stat, so no snapshot ever shows a dead pet and no item use can
//!   touch one.
//! - Crediting a quest's reward and removing it from the active set happen
//!   together, so a reward is never paid twice.
//! - Events are queued in the order the transitions happened.
//!
//! Closing the registry drops the event outbox. After that no operation
//! mutates state or emits events; reads keep returning the final state.

use std::sync::Arc;

use petsim_pets::{ItemCatalog, Pet, PetConfig, QuestConfig, StatChange, SurvivalQuest};
use petsim_types::{
    EventRecord, ItemId, PetId, PetSnapshot, PetStat, PetType, QuestId, QuestSnapshot, SimEvent,
};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::events::EventOutbox;

/// Errors from registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry was closed by shutdown.
    #[error("registry is closed")]
    Closed,

    /// Crediting a reward would overflow the point total.
    #[error("point total overflow crediting {reward} to {total}")]
    PointsOverflow {
        /// Total before the failed credit.
        total: u64,
        /// Reward that could not be credited.
        reward: u32,
    },
}

/// What happened when an item was used.
///
/// Only [`ItemUseOutcome::Applied`] changes state. The other variants are
/// silent no-ops: the pet may have died between the player's choice and
/// the command running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemUseOutcome {
    /// The item was applied; one change per affected stat.
    Applied {
        /// Stats written, in stat order.
        changes: Vec<StatChange>,
    },
    /// No live pet has this id.
    UnknownPet,
    /// No catalog item has this id.
    UnknownItem,
    /// The item cannot be used on this pet's type.
    IncompatibleItem,
}

/// What a decay tick did to a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayOutcome {
    /// Stats were lowered and the pet is still alive.
    Alive,
    /// The given stat reached 0; the pet was removed.
    Died(PetStat),
    /// The pet is no longer registered.
    Gone,
}

/// A quest completed by [`Registry::advance_quests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestCompletion {
    /// The completed quest.
    pub quest_id: QuestId,
    /// Its description.
    pub description: String,
    /// Points credited.
    pub reward: u32,
    /// Point total after crediting.
    pub total_points: u64,
}

/// Final counts captured when the registry closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseSummary {
    /// Pets still alive.
    pub pets_alive: usize,
    /// Quests still active.
    pub quests_active: usize,
    /// Final point total.
    pub total_points: u64,
}

/// Lock-protected registry contents.
#[derive(Debug)]
struct RegistryState {
    /// Live pets in adoption order.
    pets: Vec<Pet>,
    /// Active quests in registration order.
    quests: Vec<SurvivalQuest>,
    /// Points credited so far.
    total_points: u64,
    /// `None` once closed.
    outbox: Option<EventOutbox>,
}

/// The single shared simulation store.
#[derive(Debug)]
pub struct Registry {
    state: Mutex<RegistryState>,
    catalog: Arc<ItemCatalog>,
    pet_config: PetConfig,
    quest_config: QuestConfig,
}

impl Registry {
    /// Create an empty registry.
    ///
    /// Returns the receiver that every event will be queued on; hand it to
    /// a dispatcher or drain it directly.
    pub fn new(
        catalog: Arc<ItemCatalog>,
        pet_config: PetConfig,
        quest_config: QuestConfig,
    ) -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (outbox, rx) = EventOutbox::new();
        let registry = Self {
            state: Mutex::new(RegistryState {
                pets: Vec::new(),
                quests: Vec::new(),
                total_points: 0,
                outbox: Some(outbox),
            }),
            catalog,
            pet_config,
            quest_config,
        };
        (registry, rx)
    }

    /// The item catalog.
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Register a new pet and the survival quest for its type.
    ///
    /// Starting the pet's decay process is the caller's job.
    pub async fn adopt(&self, name: &str, pet_type: PetType) -> Result<PetId, RegistryError> {
        let mut state = self.state.lock().await;
        if state.outbox.is_none() {
            return Err(RegistryError::Closed);
        }

        let pet = Pet::new(name, pet_type, &self.pet_config);
        let pet_id = pet.id();
        state.pets.push(pet);

        let quest = SurvivalQuest::for_adoption(pet_type, &self.quest_config);
        let quest_id = quest.id();
        state.quests.push(quest);

        info!(%pet_id, name, %pet_type, %quest_id, "Pet adopted");
        Ok(pet_id)
    }

    /// Use a catalog item on a live pet.
    pub async fn use_item(&self, pet_id: PetId, item_id: ItemId) -> ItemUseOutcome {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(outbox) = state.outbox.as_mut() else {
            return ItemUseOutcome::UnknownPet;
        };
        let Some(pet) = state.pets.iter_mut().find(|pet| pet.id() == pet_id) else {
            debug!(%pet_id, "Item use on unknown pet ignored");
            return ItemUseOutcome::UnknownPet;
        };
        let Some(item) = self.catalog.get(item_id) else {
            debug!(%item_id, "Unknown item ignored");
            return ItemUseOutcome::UnknownItem;
        };
        let Some(changes) = pet.apply_item(item) else {
            debug!(%pet_id, item = %item.name, "Incompatible item ignored");
            return ItemUseOutcome::IncompatibleItem;
        };

        for change in &changes {
            outbox.publish(SimEvent::StatChanged {
                pet_id,
                stat: change.stat,
                value: change.value,
            });
        }
        debug!(%pet_id, item = %item.name, "Item used");
        ItemUseOutcome::Applied { changes }
    }

    /// Run one decay tick on a pet, removing it if it dies.
    pub async fn decay_pet(&self, pet_id: PetId) -> Result<DecayOutcome, RegistryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(outbox) = state.outbox.as_mut() else {
            return Err(RegistryError::Closed);
        };
        let Some(position) = state.pets.iter().position(|pet| pet.id() == pet_id) else {
            return Ok(DecayOutcome::Gone);
        };
        let Some(pet) = state.pets.get_mut(position) else {
            return Ok(DecayOutcome::Gone);
        };

        let result = pet.decay_tick(self.pet_config.decay_per_tick);
        for change in &result.changes {
            outbox.publish(SimEvent::StatChanged {
                pet_id,
                stat: change.stat,
                value: change.value,
            });
        }

        let Some(stat) = result.died_of else {
            return Ok(DecayOutcome::Alive);
        };

        let dead = state.pets.remove(position);
        outbox.publish(SimEvent::PetDied {
            pet_id,
            name: dead.name().to_owned(),
        });
        info!(%pet_id, name = dead.name(), %stat, "Pet died");
        Ok(DecayOutcome::Died(stat))
    }

    /// Run one quest tick: count a second on every active quest, then
    /// credit and remove the completed ones in registration order.
    ///
    /// If a credit would overflow the total, that quest and every later
    /// completed quest stay active and are retried on the next tick.
    pub async fn advance_quests(&self) -> Result<Vec<QuestCompletion>, RegistryError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(outbox) = state.outbox.as_mut() else {
            return Err(RegistryError::Closed);
        };

        for quest in &mut state.quests {
            let _ = quest.add_second();
        }

        let mut completions = Vec::new();
        let mut failure = None;
        let mut still_active = Vec::with_capacity(state.quests.len());

        for quest in std::mem::take(&mut state.quests) {
            if failure.is_some() || !quest.is_completed() {
                still_active.push(quest);
                continue;
            }

            let reward = quest.reward();
            let Some(total) = state.total_points.checked_add(u64::from(reward)) else {
                failure = Some(RegistryError::PointsOverflow {
                    total: state.total_points,
                    reward,
                });
                still_active.push(quest);
                continue;
            };

            state.total_points = total;
            let description = quest.description().to_owned();
            outbox.publish(SimEvent::QuestCompleted {
                quest_id: quest.id(),
                description: description.clone(),
                reward,
                total_points: total,
            });
            info!(quest_id = %quest.id(), reward, total_points = total, "Quest completed");
            completions.push(QuestCompletion {
                quest_id: quest.id(),
                description,
                reward,
                total_points: total,
            });
        }
        state.quests = still_active;

        failure.map_or(Ok(completions), Err)
    }

    /// Snapshot of every live pet, in adoption order.
    pub async fn list_pets(&self) -> Vec<PetSnapshot> {
        let state = self.state.lock().await;
        state.pets.iter().map(Pet::snapshot).collect()
    }

    /// Snapshot of one live pet.
    pub async fn pet(&self, pet_id: PetId) -> Option<PetSnapshot> {
        let state = self.state.lock().await;
        state
            .pets
            .iter()
            .find(|pet| pet.id() == pet_id)
            .map(Pet::snapshot)
    }

    /// Snapshot of every active quest, in registration order.
    pub async fn list_active_quests(&self) -> Vec<QuestSnapshot> {
        let state = self.state.lock().await;
        state.quests.iter().map(SurvivalQuest::snapshot).collect()
    }

    /// Points credited so far.
    pub async fn total_points(&self) -> u64 {
        self.state.lock().await.total_points
    }

    /// Whether [`Registry::close`] has run.
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.outbox.is_none()
    }

    /// Stop accepting mutations and drop the event outbox. Idempotent.
    pub async fn close(&self) -> CloseSummary {
        let mut state = self.state.lock().await;
        if state.outbox.take().is_some() {
            debug!("Registry closed");
        }
        CloseSummary {
            pets_alive: state.pets.len(),
            quests_active: state.quests.len(),
            total_points: state.total_points,
        }
    }

    /// Overwrite the point total. Test-only hook for overflow handling.
    #[cfg(test)]
    async fn set_total_points(&self, total: u64) {
        self.state.lock().await.total_points = total;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registry() -> (Registry, mpsc::UnboundedReceiver<EventRecord>) {
        Registry::new(
            Arc::new(ItemCatalog::builtin()),
            PetConfig::default(),
            QuestConfig::default(),
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<EventRecord>) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while let Ok(record) = rx.try_recv() {
            events.push(record.event);
        }
        events
    }

    fn item_id(registry: &Registry, name: &str) -> ItemId {
        registry.catalog().find_by_name(name).unwrap().id
    }

    #[tokio::test]
    async fn adopt_registers_pet_and_quest() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Rex", PetType::Dog).await.unwrap();

        let pets = registry.list_pets().await;
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].id, id);
        assert_eq!(pets[0].name, "Rex");
        for stat in PetStat::ALL {
            assert_eq!(pets[0].stat(stat), 50);
        }

        let quests = registry.list_active_quests().await;
        assert_eq!(quests.len(), 1);
        assert_eq!(
            quests[0].description,
            "Keep your pet with a Dog alive for 20 seconds"
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn use_item_emits_one_change_per_stat() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Rex", PetType::Dog).await.unwrap();

        let outcome = registry.use_item(id, item_id(&registry, "Medicine")).await;
        assert!(matches!(outcome, ItemUseOutcome::Applied { ref changes } if changes.len() == 3));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| matches!(
            e,
            SimEvent::StatChanged { value: 80, .. }
        )));
    }

    #[tokio::test]
    async fn incompatible_item_is_silent() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Rex", PetType::Dog).await.unwrap();

        let outcome = registry.use_item(id, item_id(&registry, "Cat Bed")).await;
        assert_eq!(outcome, ItemUseOutcome::IncompatibleItem);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(registry.pet(id).await.unwrap().stat(PetStat::Sleep), 50);
    }

    #[tokio::test]
    async fn unknown_pet_and_item_are_silent() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Rex", PetType::Dog).await.unwrap();

        assert_eq!(
            registry.use_item(PetId::new(), ItemId(1)).await,
            ItemUseOutcome::UnknownPet
        );
        assert_eq!(
            registry.use_item(id, ItemId(99)).await,
            ItemUseOutcome::UnknownItem
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn death_removes_pet_and_fires_once() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Rex", PetType::Dog).await.unwrap();

        for _ in 0..49 {
            assert_eq!(registry.decay_pet(id).await, Ok(DecayOutcome::Alive));
        }
        assert_eq!(
            registry.decay_pet(id).await,
            Ok(DecayOutcome::Died(PetStat::Hunger))
        );
        assert_eq!(registry.decay_pet(id).await, Ok(DecayOutcome::Gone));
        assert!(registry.list_pets().await.is_empty());

        let events = drain(&mut rx);
        let stat_changes = events
            .iter()
            .filter(|e| matches!(e, SimEvent::StatChanged { .. }))
            .count();
        let deaths: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::PetDied { .. }))
            .collect();
        assert_eq!(stat_changes, 148);
        assert_eq!(deaths.len(), 1);
        assert!(matches!(events.last(), Some(SimEvent::PetDied { name, .. }) if name == "Rex"));

        // The dead pet can no longer be fed.
        assert_eq!(
            registry.use_item(id, item_id(&registry, "Dog Food")).await,
            ItemUseOutcome::UnknownPet
        );
    }

    #[tokio::test]
    async fn quest_completes_after_twenty_ticks_even_if_pet_died() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Tom", PetType::Cat).await.unwrap();
        for _ in 0..50 {
            let _ = registry.decay_pet(id).await;
        }
        assert!(registry.list_pets().await.is_empty());
        let _ = drain(&mut rx);

        for _ in 0..19 {
            assert!(registry.advance_quests().await.unwrap().is_empty());
        }
        let completions = registry.advance_quests().await.unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].reward, 20);
        assert_eq!(registry.total_points().await, 20);
        assert!(registry.list_active_quests().await.is_empty());

        // Further ticks pay nothing more.
        assert!(registry.advance_quests().await.unwrap().is_empty());
        assert_eq!(registry.total_points().await, 20);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SimEvent::QuestCompleted {
                reward: 20,
                total_points: 20,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn simultaneous_completions_in_registration_order() {
        let (registry, mut rx) = registry();
        let _ = registry.adopt("A", PetType::Bird).await.unwrap();
        let _ = registry.adopt("B", PetType::Fish).await.unwrap();
        let quest_ids: Vec<QuestId> = registry
            .list_active_quests()
            .await
            .iter()
            .map(|q| q.id)
            .collect();

        for _ in 0..19 {
            let _ = registry.advance_quests().await.unwrap();
        }
        let completions = registry.advance_quests().await.unwrap();
        let completed: Vec<QuestId> = completions.iter().map(|c| c.quest_id).collect();
        assert_eq!(completed, quest_ids);
        assert_eq!(completions[0].total_points, 20);
        assert_eq!(completions[1].total_points, 40);
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn overflow_keeps_quest_active_for_retry() {
        let (registry, mut rx) = registry();
        let _ = registry.adopt("A", PetType::Dog).await.unwrap();
        registry.set_total_points(u64::MAX - 5).await;

        for _ in 0..19 {
            let _ = registry.advance_quests().await.unwrap();
        }
        let result = registry.advance_quests().await;
        assert_eq!(
            result,
            Err(RegistryError::PointsOverflow {
                total: u64::MAX - 5,
                reward: 20
            })
        );
        let quests = registry.list_active_quests().await;
        assert_eq!(quests.len(), 1);
        assert_eq!(quests[0].elapsed_seconds, 20);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn closed_registry_rejects_mutation() {
        let (registry, mut rx) = registry();
        let id = registry.adopt("Rex", PetType::Dog).await.unwrap();
        let summary = registry.close().await;
        assert_eq!(summary.pets_alive, 1);
        assert_eq!(summary.quests_active, 1);
        assert!(registry.is_closed().await);

        assert_eq!(
            registry.adopt("Late", PetType::Cat).await,
            Err(RegistryError::Closed)
        );
        assert_eq!(registry.decay_pet(id).await, Err(RegistryError::Closed));
        assert_eq!(registry.advance_quests().await, Err(RegistryError::Closed));
        assert_eq!(
            registry.use_item(id, ItemId(1)).await,
            ItemUseOutcome::UnknownPet
        );

        // Reads still show the final state.
        assert_eq!(registry.list_pets().await.len(), 1);
        // Outbox dropped: the channel is closed and empty.
        assert!(rx.recv().await.is_none());
    }
}
