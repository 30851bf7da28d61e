//! Operation catalog
//!
//! Declarative descriptions of paged list/describe operations.
//!
//! # Overview
//!
//! The catalog module provides:
//! - `ServiceDefinition` - endpoint, protocol details and operations of one service
//! - `OperationDefinition` - items path, cursor fields, page-size bounds and filters
//! - Built-in definitions for ElastiCache and Internet Monitor
//! - YAML loading with validation for custom definitions

mod builtin;
mod parser;
mod types;

pub use builtin::{get_builtin, list_builtin};
pub use parser::{load_service_file, load_service_from_str, validate};
pub use types::{
    CursorDefinition, FilterDefinition, FilterLocation, FilterType, OperationDefinition,
    PageSizeDefinition, ServiceDefinition,
};

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Set of known services, keyed by service name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    services: BTreeMap<String, ServiceDefinition>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the built-in services
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for name in list_builtin() {
            if let Some(yaml) = get_builtin(name) {
                catalog.insert(load_service_from_str(yaml)?);
            }
        }
        Ok(catalog)
    }

    /// Add a service, replacing any existing one with the same name
    pub fn insert(&mut self, def: ServiceDefinition) {
        if self.services.contains_key(&def.service) {
            debug!("Replacing service definition '{}'", def.service);
        }
        self.services.insert(def.service.clone(), def);
    }

    /// Load a custom definition file into the catalog
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&ServiceDefinition> {
        let def = load_service_file(path)?;
        let name = def.service.clone();
        self.insert(def);
        self.get_service(&name)
    }

    /// All services, ordered by name
    pub fn list_services(&self) -> Vec<&ServiceDefinition> {
        self.services.values().collect()
    }

    /// Look up a service by name
    pub fn get_service(&self, name: &str) -> Result<&ServiceDefinition> {
        self.services
            .get(name)
            .ok_or_else(|| Error::UnknownService {
                service: name.to_string(),
            })
    }

    /// Look up an operation of a service
    pub fn find_operation(
        &self,
        service: &str,
        operation: &str,
    ) -> Result<(&ServiceDefinition, &OperationDefinition)> {
        let def = self.get_service(service)?;
        let op = def
            .operation(operation)
            .ok_or_else(|| Error::UnknownOperation {
                service: service.to_string(),
                operation: operation.to_string(),
            })?;
        Ok((def, op))
    }
}
