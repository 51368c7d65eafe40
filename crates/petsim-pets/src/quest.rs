//! Survival quests.
//!
//! A quest counts seconds up to a target and pays a reward once. The
//! required pet type only shapes the description; nothing checks that a
//! pet of that type is still alive.

use petsim_types::{PetType, QuestId, QuestSnapshot};

use crate::config::QuestConfig;

/// A timed objective that pays points when its target is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurvivalQuest {
    id: QuestId,
    description: String,
    target_seconds: u32,
    elapsed_seconds: u32,
    required_pet_type: Option<PetType>,
    reward: u32,
}

impl SurvivalQuest {
    /// Create a quest. A `reward` of 0 pays one point per target second.
    pub fn new(target_seconds: u32, required_pet_type: Option<PetType>, reward: u32) -> Self {
        let reward = if reward > 0 { reward } else { target_seconds };
        let description = required_pet_type.map_or_else(
            || format!("Keep your pet alive for {target_seconds} seconds"),
            |pet_type| format!("Keep your pet with a {pet_type} alive for {target_seconds} seconds"),
        );
        Self {
            id: QuestId::new(),
            description,
            target_seconds,
            elapsed_seconds: 0,
            required_pet_type,
            reward,
        }
    }

    /// The quest generated when a pet of `pet_type` is adopted.
    pub fn for_adoption(pet_type: PetType, config: &QuestConfig) -> Self {
        Self::new(config.target_seconds, Some(pet_type), config.reward)
    }

    /// The quest's identity.
    pub const fn id(&self) -> QuestId {
        self.id
    }

    /// Human-readable objective.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Seconds counted so far. Never exceeds the target.
    pub const fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Seconds required.
    pub const fn target_seconds(&self) -> u32 {
        self.target_seconds
    }

    /// Advisory pet type the quest was generated for.
    pub const fn required_pet_type(&self) -> Option<PetType> {
        self.required_pet_type
    }

    /// Points paid on completion.
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Whether the target has been reached.
    pub const fn is_completed(&self) -> bool {
        self.elapsed_seconds >= self.target_seconds
    }

    /// Count one second. No-op once completed.
    ///
    /// Returns `true` if this call completed the quest.
    pub const fn add_second(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        self.is_completed()
    }

    /// Progress as `"elapsed/target seconds"`.
    pub fn progress(&self) -> String {
        format!("{}/{} seconds", self.elapsed_seconds, self.target_seconds)
    }

    /// Copy the quest's current state.
    pub fn snapshot(&self) -> QuestSnapshot {
        QuestSnapshot {
            id: self.id,
            description: self.description.clone(),
            progress: self.progress(),
            elapsed_seconds: self.elapsed_seconds,
            target_seconds: self.target_seconds,
            reward: self.reward,
        }
    }
}
