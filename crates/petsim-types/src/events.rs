//! Notifications pushed by the engine to its observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::PetStat;
use crate::ids::{PetId, QuestId};

/// A state transition observed inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// A pet's stat was written, by decay or by an item.
    StatChanged {
        /// The pet whose stat changed.
        pet_id: PetId,
        /// Which stat.
        stat: PetStat,
        /// Value after the change.
        value: u32,
    },
    /// A pet reached 0 in some stat and left the live set.
    PetDied {
        /// The pet that died.
        pet_id: PetId,
        /// Its name, since the pet can no longer be looked up.
        name: String,
    },
    /// A quest reached its target and its reward was credited.
    QuestCompleted {
        /// The completed quest.
        quest_id: QuestId,
        /// Quest description, as shown in the quest list.
        description: String,
        /// Points credited.
        reward: u32,
        /// Point total after crediting.
        total_points: u64,
    },
}

/// A [`SimEvent`] stamped with its position in the global event order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic sequence number, starting at 1.
    pub sequence: u64,
    /// Wall-clock time the transition happened.
    pub occurred_at: DateTime<Utc>,
    /// The transition itself.
    pub event: SimEvent,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SimEvent::QuestCompleted {
            quest_id: QuestId::new(),
            description: String::from("Keep your pet with a Cat alive for 20 seconds"),
            reward: 20,
            total_points: 40,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "quest_completed");
        assert_eq!(
            value["description"],
            "Keep your pet with a Cat alive for 20 seconds"
        );
        assert_eq!(value["reward"], 20);
        assert_eq!(value["total_points"], 40);
    }

    #[test]
    fn stat_changed_round_trips() {
        let event = SimEvent::StatChanged {
            pet_id: PetId::new(),
            stat: PetStat::Fun,
            value: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
