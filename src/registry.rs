// Identity Registry - Engine handles <-> caller labels
// Insertion order is meaningful: the first entry is the primary

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::physics_engine::BodyHandle;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    pub handle: BodyHandle,
    pub label: String,
}

/// Bidirectional mapping between body handles and their labels.
///
/// `clone()` is the registry copy used by simulation snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<RegistryEntry>", into = "Vec<RegistryEntry>")]
pub struct IdentityRegistry {
    labels: IndexMap<BodyHandle, String>,
    handles: HashMap<String, BodyHandle>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if the label is already in use; only checks, never mutates.
    pub fn ensure_available(&self, label: &str) -> SimResult<()> {
        if self.handles.contains_key(label) {
            return Err(SimError::DuplicateLabel {
                label: label.to_string(),
            });
        }
        Ok(())
    }

    pub fn register(&mut self, handle: BodyHandle, label: &str) -> SimResult<()> {
        match (self.handles.get(label), self.labels.get(&handle)) {
            (Some(existing), _) if *existing == handle => return Ok(()),
            (Some(_), _) => {
                return Err(SimError::DuplicateLabel {
                    label: label.to_string(),
                })
            }
            (None, Some(_)) => return Err(SimError::HandleInUse { handle }),
            (None, None) => {}
        }

        self.labels.insert(handle, label.to_string());
        self.handles.insert(label.to_string(), handle);
        Ok(())
    }

    pub fn resolve(&self, handle: BodyHandle) -> SimResult<&str> {
        self.labels
            .get(&handle)
            .map(String::as_str)
            .ok_or(SimError::UnknownHandle { handle })
    }

    pub fn handle_of(&self, label: &str) -> SimResult<BodyHandle> {
        self.handles
            .get(label)
            .copied()
            .ok_or_else(|| SimError::UnknownLabel {
                label: label.to_string(),
            })
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.handles.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &str)> {
        self.labels.iter().map(|(handle, label)| (*handle, label.as_str()))
    }
}

impl PartialEq for IdentityRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl TryFrom<Vec<RegistryEntry>> for IdentityRegistry {
    type Error = SimError;

    fn try_from(entries: Vec<RegistryEntry>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for entry in entries {
            if registry.labels.contains_key(&entry.handle) {
                return Err(SimError::HandleInUse {
                    handle: entry.handle,
                });
            }
            registry.register(entry.handle, &entry.label)?;
        }
        Ok(registry)
    }
}

impl From<IdentityRegistry> for Vec<RegistryEntry> {
    fn from(registry: IdentityRegistry) -> Self {
        registry
            .labels
            .into_iter()
            .map(|(handle, label)| RegistryEntry { handle, label })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve_both_ways() {
        let mut registry = IdentityRegistry::new();
        registry.register(BodyHandle(7), "sun").unwrap();
        registry.register(BodyHandle(9), "earth").unwrap();

        assert_eq!(registry.resolve(BodyHandle(9)).unwrap(), "earth");
        assert_eq!(registry.handle_of("sun").unwrap(), BodyHandle(7));
        assert_eq!(registry.len(), 2);

        let order: Vec<_> = registry.iter().map(|(_, label)| label).collect();
        assert_eq!(order, vec!["sun", "earth"]);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut registry = IdentityRegistry::new();
        registry.register(BodyHandle(0), "sun").unwrap();

        let err = registry.register(BodyHandle(1), "sun").unwrap_err();
        assert!(matches!(err, SimError::DuplicateLabel { ref label } if label == "sun"));
        assert!(registry.ensure_available("sun").is_err());
        assert_eq!(registry.len(), 1);

        // Same pair again is harmless
        registry.register(BodyHandle(0), "sun").unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_handle_reuse_rejected() {
        let mut registry = IdentityRegistry::new();
        registry.register(BodyHandle(0), "sun").unwrap();
        assert!(matches!(
            registry.register(BodyHandle(0), "moon"),
            Err(SimError::HandleInUse { .. })
        ));
        assert!(!registry.contains_label("moon"));
    }

    #[test]
    fn test_unknown_lookups() {
        let registry = IdentityRegistry::new();
        assert!(matches!(
            registry.resolve(BodyHandle(3)),
            Err(SimError::UnknownHandle { .. })
        ));
        assert!(matches!(
            registry.handle_of("ghost"),
            Err(SimError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut registry = IdentityRegistry::new();
        registry.register(BodyHandle(0), "sun").unwrap();

        let mut copy = registry.clone();
        copy.register(BodyHandle(1), "earth").unwrap();

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains_label("earth"));
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_serde_preserves_order_and_rejects_duplicates() {
        let mut registry = IdentityRegistry::new();
        registry.register(BodyHandle(4), "b").unwrap();
        registry.register(BodyHandle(2), "a").unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        let restored: IdentityRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, registry);
        assert_eq!(restored.handle_of("a").unwrap(), BodyHandle(2));

        let duplicated = r#"[{"handle":0,"label":"x"},{"handle":1,"label":"x"}]"#;
        assert!(serde_json::from_str::<IdentityRegistry>(duplicated).is_err());
    }
}
