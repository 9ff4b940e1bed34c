//! Append-only registry of action labels

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bidirectional mapping between action indices and semantic labels.
///
/// Indices are dense and assigned in first-seen order. Once a label has an
/// index it keeps it for the lifetime of the registry; the registry never
/// shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ActionRegistry {
    labels: Vec<String>,
    indices: HashMap<String, usize>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `label`, assigning the next free index if unseen.
    pub fn register_if_absent(&mut self, label: &str) -> usize {
        if let Some(&index) = self.indices.get(label) {
            return index;
        }
        let index = self.labels.len();
        self.labels.push(label.to_string());
        self.indices.insert(label.to_string(), index);
        index
    }

    pub fn contains(&self, label: &str) -> bool {
        self.indices.contains_key(label)
    }

    /// Label registered at `index`
    pub fn label_of(&self, index: usize) -> Result<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(Error::UnknownActionIndex {
                index,
                count: self.labels.len(),
            })
    }

    /// Index registered for `label`
    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.indices
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownAction {
                label: label.to_string(),
            })
    }

    pub fn count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in index order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = Self::new();
        for label in iter {
            registry.register_if_absent(label.as_ref());
        }
        registry
    }
}

impl From<Vec<String>> for ActionRegistry {
    fn from(labels: Vec<String>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<ActionRegistry> for Vec<String> {
    fn from(registry: ActionRegistry) -> Self {
        registry.labels
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = ActionRegistry::new();
        assert_eq!(registry.register_if_absent("hola"), 0);
        assert_eq!(registry.register_if_absent("adios"), 1);
        assert_eq!(registry.register_if_absent("hola"), 0);
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.label_of(1).unwrap(), "adios");
        assert_eq!(registry.index_of("adios").unwrap(), 1);
    }

    #[test]
    fn test_missing_lookups_fail() {
        let registry: ActionRegistry = ["a", "b"].into_iter().collect();
        assert!(matches!(
            registry.index_of("c"),
            Err(Error::UnknownAction { label }) if label == "c"
        ));
        assert!(matches!(
            registry.label_of(2),
            Err(Error::UnknownActionIndex { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_indices_never_change() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut registry = ActionRegistry::new();
        let mut seen: Vec<String> = Vec::new();

        for _ in 0..500 {
            let label = format!("label-{}", rng.random_range(0..40));
            let index = registry.register_if_absent(&label);
            match seen.iter().position(|l| *l == label) {
                Some(first) => assert_eq!(index, first),
                None => {
                    assert_eq!(index, seen.len());
                    seen.push(label);
                }
            }
            assert_eq!(registry.count(), seen.len());
        }

        for (index, label) in seen.iter().enumerate() {
            assert_eq!(registry.index_of(label).unwrap(), index);
            assert_eq!(registry.label_of(index).unwrap(), label);
        }
    }

    #[test]
    fn test_serde_keeps_order() {
        let registry: ActionRegistry = ["x", "y", "x", "z"].into_iter().collect();
        let json = serde_json::to_string(&registry).unwrap();
        assert_eq!(json, r#"["x","y","z"]"#);
        let restored: ActionRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, registry);
    }
}
