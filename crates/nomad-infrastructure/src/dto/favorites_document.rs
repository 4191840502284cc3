//! Favorites document: `users/{uid}/favorites/saved`.

use nomad_core::favorites::FavoriteSet;
use nomad_core::travel::Destination;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl FavoritesDocument {
    pub fn from_set(set: &FavoriteSet) -> Self {
        Self {
            destinations: set.as_slice().to_vec(),
        }
    }

    /// Duplicate ids in a stored document collapse to their first occurrence.
    pub fn into_set(self) -> FavoriteSet {
        FavoriteSet::from_destinations(self.destinations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomad_core::travel::CostOfLiving;
    use serde_json::json;

    #[test]
    fn test_duplicates_collapse() {
        let lisbon = Destination::new("7", "Lisbon", "Portugal", CostOfLiving::Medium);
        let doc = FavoritesDocument {
            destinations: vec![lisbon.clone(), lisbon],
        };
        assert_eq!(doc.into_set().len(), 1);
    }

    #[test]
    fn test_missing_field_is_empty() {
        let doc: FavoritesDocument = serde_json::from_value(json!({})).unwrap();
        assert!(doc.into_set().is_empty());
    }
}
