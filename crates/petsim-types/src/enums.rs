//! Closed enumerations shared across the workspace.

use serde::{Deserialize, Serialize};

/// The kind of animal a pet is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetType {
    /// A dog.
    Dog,
    /// A cat.
    Cat,
    /// A bird.
    Bird,
    /// A fish.
    Fish,
    /// A rabbit.
    Rabbit,
}

impl PetType {
    /// Every pet type, in menu order.
    pub const ALL: [Self; 5] = [Self::Dog, Self::Cat, Self::Bird, Self::Fish, Self::Rabbit];
}

impl core::fmt::Display for PetType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Bird => "Bird",
            Self::Fish => "Fish",
            Self::Rabbit => "Rabbit",
        };
        f.write_str(name)
    }
}

/// A well-being stat tracked for every pet.
///
/// The declaration order is the order stats are processed in a decay tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetStat {
    /// Satiation. Reaches 0 when the pet starves.
    Hunger,
    /// Rest level.
    Sleep,
    /// Happiness from play.
    Fun,
}

impl PetStat {
    /// Every stat, in processing order.
    pub const ALL: [Self; 3] = [Self::Hunger, Self::Sleep, Self::Fun];
}

impl core::fmt::Display for PetStat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Hunger => "Hunger",
            Self::Sleep => "Sleep",
            Self::Fun => "Fun",
        };
        f.write_str(name)
    }
}

/// Category of a catalog item. Informational only; effects come from the
/// item's affected stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Restores hunger.
    Food,
    /// Restores fun.
    Toy,
    /// Restores sleep.
    Bed,
    /// Restores everything.
    Medicine,
}

impl core::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Food => "Food",
            Self::Toy => "Toy",
            Self::Bed => "Bed",
            Self::Medicine => "Medicine",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stat_order_is_hunger_sleep_fun() {
        let mut stats = vec![PetStat::Fun, PetStat::Hunger, PetStat::Sleep];
        stats.sort();
        assert_eq!(stats, PetStat::ALL.to_vec());
    }

    #[test]
    fn pet_type_serializes_snake_case() {
        let json = serde_json::to_string(&PetType::Rabbit).unwrap();
        assert_eq!(json, "\"rabbit\"");
        let back: PetType = serde_json::from_str("\"cat\"").unwrap();
        assert_eq!(back, PetType::Cat);
    }

    #[test]
    fn display_is_capitalized() {
        assert_eq!(PetType::Bird.to_string(), "Bird");
        assert_eq!(PetStat::Sleep.to_string(), "Sleep");
        assert_eq!(ItemCategory::Medicine.to_string(), "Medicine");
    }
}
