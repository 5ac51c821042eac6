//! Dashboard resources addressed by group key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies one embeddable dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Human readable name.
    pub display_name: String,
    /// Report identifier within the reporting service.
    #[serde(default)]
    pub resource_id: String,
    /// Workspace the report lives in.
    #[serde(default)]
    pub workspace_id: String,
    /// URL used to embed the report.
    #[serde(default)]
    pub embed_url: String,
}

/// Read-only lookup from group key to resource descriptor.
///
/// An absent key is an ordinary outcome, not an error.
pub trait ResourceCatalog: Send + Sync {
    /// Returns the descriptor registered under `key`.
    fn lookup(&self, key: &str) -> Option<&ResourceDescriptor>;

    /// Returns every registered key and descriptor, ordered by key.
    fn entries(&self) -> Vec<(&str, &ResourceDescriptor)>;
}

/// Catalog fixed at process start.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceCatalog {
    resources: BTreeMap<String, ResourceDescriptor>,
}

impl StaticResourceCatalog {
    /// Creates a catalog from a key to descriptor map.
    #[must_use]
    pub fn new(resources: BTreeMap<String, ResourceDescriptor>) -> Self {
        Self { resources }
    }
}

impl ResourceCatalog for StaticResourceCatalog {
    fn lookup(&self, key: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(key)
    }

    fn entries(&self) -> Vec<(&str, &ResourceDescriptor)> {
        self.resources
            .iter()
            .map(|(key, descriptor)| (key.as_str(), descriptor))
            .collect()
    }
}
