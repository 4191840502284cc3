//! Favorite set domain model.

use serde::{Deserialize, Serialize};

use crate::travel::Destination;

/// Identity-scoped saved destinations, keyed by destination id.
///
/// Insertion order is kept for display. A destination id appears at most once
/// no matter how many chat responses referenced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteSet {
    destinations: Vec<Destination>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from persisted values, dropping repeated ids.
    pub fn from_destinations(destinations: impl IntoIterator<Item = Destination>) -> Self {
        let mut set = Self::new();
        for destination in destinations {
            set.insert(destination);
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.destinations.iter().any(|d| d.id == id)
    }

    /// Adds a copy of `destination` unless its id is already present.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, destination: Destination) -> bool {
        if self.contains(&destination.id) {
            return false;
        }
        self.destinations.push(destination);
        true
    }

    /// Removes the destination with `id`. Returns `true` if it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.destinations.len();
        self.destinations.retain(|d| d.id != id);
        self.destinations.len() != before
    }

    /// Removes the destination if present, otherwise adds a copy.
    ///
    /// Returns whether the destination is a favorite afterwards.
    pub fn toggle(&mut self, destination: &Destination) -> bool {
        if self.remove(&destination.id) {
            false
        } else {
            self.destinations.push(destination.clone());
            true
        }
    }

    pub fn get(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter()
    }

    pub fn as_slice(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn clear(&mut self) {
        self.destinations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::CostOfLiving;

    fn destination(id: &str) -> Destination {
        Destination::new(id, format!("City {id}"), "Country", CostOfLiving::Medium)
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut set = FavoriteSet::new();
        let d = destination("1");

        assert!(set.toggle(&d));
        assert!(set.contains("1"));
        assert!(!set.toggle(&d));
        assert!(!set.contains("1"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_ignores_repeated_ids() {
        let mut set = FavoriteSet::new();
        assert!(set.insert(destination("1")));
        assert!(!set.insert(destination("1")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_destinations_deduplicates_and_keeps_order() {
        let set = FavoriteSet::from_destinations(vec![
            destination("b"),
            destination("a"),
            destination("b"),
        ]);
        let ids: Vec<_> = set.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut set = FavoriteSet::from_destinations(vec![destination("1")]);
        assert!(!set.remove("2"));
        assert_eq!(set.len(), 1);
    }
}
