//! Static item catalog.
//!
//! Items are immutable once the catalog is built. The engine holds the
//! catalog behind an `Arc` and pets only ever borrow items from it.

use std::collections::BTreeSet;

use petsim_types::{ItemCategory, ItemId, PetStat, PetType};
use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogError;

/// An item definition as written in configuration, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemDefinition {
    /// Display name, unique within the catalog.
    pub name: String,
    /// Informational category.
    pub category: ItemCategory,
    /// Amount added to each affected stat.
    pub potency: u32,
    /// Pet types the item can be used on.
    pub compatible_pets: BTreeSet<PetType>,
    /// Stats the item restores.
    pub affected_stats: BTreeSet<PetStat>,
}

impl ItemDefinition {
    fn new(
        name: &str,
        category: ItemCategory,
        potency: u32,
        compatible_pets: &[PetType],
        affected_stats: &[PetStat],
    ) -> Self {
        Self {
            name: name.to_owned(),
            category,
            potency,
            compatible_pets: compatible_pets.iter().copied().collect(),
            affected_stats: affected_stats.iter().copied().collect(),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Position-derived identifier, starting at 1.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Informational category.
    pub category: ItemCategory,
    /// Amount added to each affected stat.
    pub potency: u32,
    /// Pet types the item can be used on.
    pub compatible_pets: BTreeSet<PetType>,
    /// Stats the item restores, applied in stat order.
    pub affected_stats: BTreeSet<PetStat>,
}

impl Item {
    /// Whether the item can be used on a pet of the given type.
    pub fn is_compatible_with(&self, pet_type: PetType) -> bool {
        self.compatible_pets.contains(&pet_type)
    }
}

/// The fixed list of items available for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Build a catalog from configured definitions.
    ///
    /// Ids are assigned in definition order starting at 1.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the list is empty, a name repeats, or
    /// an item could never have an effect.
    pub fn from_definitions(definitions: Vec<ItemDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut names = BTreeSet::new();
        for def in &definitions {
            if !names.insert(def.name.as_str()) {
                return Err(CatalogError::DuplicateItem(def.name.clone()));
            }
            if def.compatible_pets.is_empty() {
                return Err(CatalogError::NoCompatiblePets(def.name.clone()));
            }
            if def.affected_stats.is_empty() {
                return Err(CatalogError::NoAffectedStats(def.name.clone()));
            }
            if def.potency == 0 {
                return Err(CatalogError::ZeroPotency(def.name.clone()));
            }
        }

        let items = number_items(definitions);
        debug!(item_count = items.len(), "Item catalog built");
        Ok(Self { items })
    }

    /// The built-in catalog: one food per pet type, a ball, a cat bed, and
    /// medicine that works on everything.
    pub fn builtin() -> Self {
        Self {
            items: number_items(builtin_definitions()),
        }
    }

    /// Look up an item by id.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up an item by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Every item, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Items usable on the given pet type, in catalog order.
    pub fn compatible_with(&self, pet_type: PetType) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(move |item| item.is_compatible_with(pet_type))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty. Never true for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The definitions behind [`ItemCatalog::builtin`].
pub fn builtin_definitions() -> Vec<ItemDefinition> {
    use ItemCategory::{Bed, Food, Medicine, Toy};
    use PetStat::{Fun, Hunger, Sleep};
    use PetType::{Bird, Cat, Dog, Fish, Rabbit};

    vec![
        ItemDefinition::new("Dog Food", Food, 20, &[Dog], &[Hunger]),
        ItemDefinition::new("Cat Food", Food, 20, &[Cat], &[Hunger]),
        ItemDefinition::new("Bird Seed", Food, 20, &[Bird], &[Hunger]),
        ItemDefinition::new("Fish Food", Food, 20, &[Fish], &[Hunger]),
        ItemDefinition::new("Rabbit Food", Food, 20, &[Rabbit], &[Hunger]),
        ItemDefinition::new("Ball", Toy, 15, &[Dog, Cat], &[Fun]),
        ItemDefinition::new("Cat Bed", Bed, 25, &[Cat], &[Sleep]),
        ItemDefinition::new("Medicine", Medicine, 30, &PetType::ALL, &PetStat::ALL),
    ]
}

fn number_items(definitions: Vec<ItemDefinition>) -> Vec<Item> {
    (1_u32..)
        .zip(definitions)
        .map(|(n, def)| Item {
            id: ItemId(n),
            name: def.name,
            category: def.category,
            potency: def.potency,
            compatible_pets: def.compatible_pets,
            affected_stats: def.affected_stats,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_eight_items_numbered_from_one() {
        let catalog = ItemCatalog::builtin();
        assert_eq!(catalog.len(), 8);
        let ids: Vec<u32> = catalog.iter().map(|item| item.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(catalog.get(ItemId(1)).unwrap().name, "Dog Food");
        assert_eq!(catalog.get(ItemId(8)).unwrap().name, "Medicine");
        assert!(catalog.get(ItemId(9)).is_none());
    }

    #[test]
    fn compatible_items_for_cat() {
        let catalog = ItemCatalog::builtin();
        let names: Vec<&str> = catalog
            .compatible_with(PetType::Cat)
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["Cat Food", "Ball", "Cat Bed", "Medicine"]);
    }

    #[test]
    fn fish_only_gets_food_and_medicine() {
        let catalog = ItemCatalog::builtin();
        let names: Vec<&str> = catalog
            .compatible_with(PetType::Fish)
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["Fish Food", "Medicine"]);
    }

    #[test]
    fn medicine_affects_every_stat() {
        let catalog = ItemCatalog::builtin();
        let medicine = catalog.find_by_name("Medicine").unwrap();
        assert_eq!(medicine.potency, 30);
        assert_eq!(medicine.affected_stats.len(), 3);
        assert_eq!(medicine.compatible_pets.len(), 5);
    }

    #[test]
    fn empty_catalog_rejected() {
        assert_eq!(
            ItemCatalog::from_definitions(Vec::new()),
            Err(CatalogError::EmptyCatalog)
        );
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut defs = builtin_definitions();
        defs.push(ItemDefinition::new(
            "Ball",
            ItemCategory::Toy,
            5,
            &[PetType::Dog],
            &[PetStat::Fun],
        ));
        assert_eq!(
            ItemCatalog::from_definitions(defs),
            Err(CatalogError::DuplicateItem(String::from("Ball")))
        );
    }

    #[test]
    fn useless_items_rejected() {
        let no_pets = ItemDefinition::new("Rock", ItemCategory::Toy, 5, &[], &[PetStat::Fun]);
        assert_eq!(
            ItemCatalog::from_definitions(vec![no_pets]),
            Err(CatalogError::NoCompatiblePets(String::from("Rock")))
        );

        let no_stats = ItemDefinition::new("Rock", ItemCategory::Toy, 5, &[PetType::Dog], &[]);
        assert_eq!(
            ItemCatalog::from_definitions(vec![no_stats]),
            Err(CatalogError::NoAffectedStats(String::from("Rock")))
        );

        let weak = ItemDefinition::new("Rock", ItemCategory::Toy, 0, &[PetType::Dog], &[PetStat::Fun]);
        assert_eq!(
            ItemCatalog::from_definitions(vec![weak]),
            Err(CatalogError::ZeroPotency(String::from("Rock")))
        );
    }

    #[test]
    fn definitions_parse_from_yaml() {
        let yaml = r"
- name: Carrot
  category: food
  potency: 10
  compatible_pets: [rabbit]
  affected_stats: [hunger]
- name: Hammock
  category: bed
  potency: 40
  compatible_pets: [cat, dog]
  affected_stats: [sleep]
";
        let defs: Vec<ItemDefinition> = serde_yml::from_str(yaml).unwrap();
        let catalog = ItemCatalog::from_definitions(defs).unwrap();
        assert_eq!(catalog.len(), 2);
        let hammock = catalog.get(ItemId(2)).unwrap();
        assert!(hammock.is_compatible_with(PetType::Dog));
        assert!(!hammock.is_compatible_with(PetType::Fish));
    }
}
