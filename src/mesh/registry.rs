//! Insertion-ordered entity storage with an id index

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::elements::{Element, Material, Node, PlateRegion};

/// Entities stored in a [`Registry`] expose their numeric id
pub trait Keyed {
    fn key(&self) -> u32;
}

impl Keyed for Node {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for Element {
    fn key(&self) -> u32 {
        self.id()
    }
}

impl Keyed for Material {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for PlateRegion {
    fn key(&self) -> u32 {
        self.id
    }
}

/// Growable array of entities plus an id → position side table
///
/// Iteration follows insertion order, which survives removals and
/// serialisation round trips.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
    index: HashMap<u32, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of `id` in iteration order
    pub fn position(&self, id: u32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.position(id).map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        match self.position(id) {
            Some(i) => Some(&mut self.items[i]),
            None => None,
        }
    }

    /// Append an entity, or replace in place if its id is already present
    pub fn insert(&mut self, item: T) {
        let id = item.key();
        match self.index.get(&id) {
            Some(&i) => self.items[i] = item,
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn remove(&mut self, id: u32) -> Option<T> {
        let pos = self.index.remove(&id)?;
        let item = self.items.remove(pos);
        for (i, entity) in self.items.iter().enumerate().skip(pos) {
            self.index.insert(entity.key(), i);
        }
        Some(item)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.items.iter().map(Keyed::key).collect()
    }

    pub fn max_key(&self) -> Option<u32> {
        self.items.iter().map(Keyed::key).max()
    }
}

impl<T: Serialize> Serialize for Registry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Keyed> Deserialize<'de> for Registry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut registry = Registry::new();
        for item in items {
            if registry.contains(item.key()) {
                return Err(D::Error::custom(format!("duplicate id {}", item.key())));
            }
            registry.insert(item);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32) -> Node {
        serde_json::from_value(serde_json::json!({ "id": id, "x": id as f64, "y": 0.0 })).unwrap()
    }

    #[test]
    fn test_removal_keeps_order_and_index() {
        let mut reg = Registry::new();
        for id in [5, 2, 9, 4] {
            reg.insert(node(id));
        }
        assert!(reg.remove(2).is_some());
        assert_eq!(reg.ids(), vec![5, 9, 4]);
        assert_eq!(reg.position(4), Some(2));
        assert_eq!(reg.get(9).map(|n| n.x), Some(9.0));
        assert!(reg.remove(2).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[{"id":1,"x":0,"y":0},{"id":1,"x":1,"y":0}]"#;
        let parsed: Result<Registry<Node>, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
