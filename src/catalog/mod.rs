// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The catalog collaborator: where environment definitions come from.
//!
//! The router takes its catalog by injection; there is no process-wide
//! store. [`MemoryCatalog`] is the in-crate implementation, fed with YAML
//! definitions, used by tests and simple embeddings.

use std::collections::HashMap;

use crate::builder::EnvironmentDefinition;
use crate::errors::CatalogError;

pub trait Catalog {
    fn environment_definition(&self, name: &str) -> Result<EnvironmentDefinition, CatalogError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn environment_definition(&self, name: &str) -> Result<EnvironmentDefinition, CatalogError> {
        (**self).environment_definition(name)
    }
}

/// Insertable in-memory catalog keyed by environment name.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    definitions: HashMap<String, EnvironmentDefinition>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: EnvironmentDefinition) {
        self.definitions
            .insert(definition.name.clone(), definition);
    }

    /// Parses a YAML definition and stores it under its own name, which
    /// is returned.
    pub fn insert_yaml(&mut self, yaml: &str) -> Result<String, CatalogError> {
        let definition: EnvironmentDefinition =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::Definition(e.to_string()))?;
        let name = definition.name.clone();
        self.insert(definition);
        Ok(name)
    }
}

impl Catalog for MemoryCatalog {
    fn environment_definition(&self, name: &str) -> Result<EnvironmentDefinition, CatalogError> {
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownEnvironment(name.to_owned()))
    }
}
