//! YAML parser for service definitions
//!
//! Parses and validates service definition files, both the embedded
//! built-ins and custom files supplied with `--services`.

use crate::catalog::types::{FilterLocation, OperationDefinition, ServiceDefinition};
use crate::error::{Error, Result};
use crate::types::Method;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load a service definition from a YAML string
pub fn load_service_from_str(yaml: &str) -> Result<ServiceDefinition> {
    let def: ServiceDefinition = serde_yaml::from_str(yaml)?;
    validate(&def)?;
    Ok(def)
}

/// Load a service definition from a YAML file
pub fn load_service_file(path: impl AsRef<Path>) -> Result<ServiceDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read service definition '{}': {e}",
            path.display()
        ))
    })?;
    load_service_from_str(&content)
}

/// Validate a service definition
pub fn validate(def: &ServiceDefinition) -> Result<()> {
    let service = if def.service.is_empty() {
        "<unnamed>"
    } else {
        def.service.as_str()
    };

    if def.service.is_empty() {
        return Err(Error::definition(service, "service name cannot be empty"));
    }

    if def.endpoint.is_empty() {
        return Err(Error::definition(service, "endpoint cannot be empty"));
    }

    if def.operations.is_empty() {
        return Err(Error::definition(
            service,
            "service must have at least one operation",
        ));
    }

    let names: HashSet<_> = def.operations.iter().map(|op| &op.name).collect();
    if names.len() != def.operations.len() {
        return Err(Error::definition(service, "duplicate operation names found"));
    }

    for op in &def.operations {
        validate_operation(service, op)?;
    }

    Ok(())
}

/// Validate a single operation
fn validate_operation(service: &str, op: &OperationDefinition) -> Result<()> {
    let fail = |message: String| Error::definition(service, message);

    if op.name.is_empty() {
        return Err(fail("operation name cannot be empty".to_string()));
    }
    if op.action.is_empty() {
        return Err(fail(format!("operation '{}' has no action", op.name)));
    }
    if op.items_path.is_empty() {
        return Err(fail(format!("operation '{}' has no items_path", op.name)));
    }
    if op.cursor.request_field.is_empty() || op.cursor.response_path.is_empty() {
        return Err(fail(format!(
            "operation '{}' cursor fields cannot be empty",
            op.name
        )));
    }
    if !op.path.starts_with('/') {
        return Err(fail(format!(
            "operation '{}' path must start with '/'",
            op.name
        )));
    }

    if let Some(page_size) = &op.page_size {
        if page_size.field.is_empty() {
            return Err(fail(format!(
                "operation '{}' page_size field cannot be empty",
                op.name
            )));
        }
        if page_size.min == 0 || page_size.min > page_size.max {
            return Err(fail(format!(
                "operation '{}' page_size bounds {}..{} are invalid",
                op.name, page_size.min, page_size.max
            )));
        }
    }

    let mut seen = HashSet::new();
    for filter in &op.filters {
        if filter.name.is_empty() {
            return Err(fail(format!(
                "operation '{}' has a filter with no name",
                op.name
            )));
        }
        if !seen.insert(filter.name.to_ascii_lowercase()) {
            return Err(fail(format!(
                "operation '{}' declares filter '{}' twice",
                op.name, filter.name
            )));
        }
        if op.method == Method::GET && filter.location == Some(FilterLocation::Body) {
            return Err(fail(format!(
                "operation '{}' is GET but filter '{}' is located in the body",
                op.name, filter.name
            )));
        }
    }

    let placeholders = op.path_placeholders();
    for placeholder in &placeholders {
        let declared = op.filter(placeholder).is_some_and(|f| {
            f.location_for(op.method) == FilterLocation::Path && f.name == *placeholder
        });
        if !declared {
            return Err(fail(format!(
                "operation '{}' path placeholder '{{{placeholder}}}' has no matching path filter",
                op.name
            )));
        }
    }

    for filter in &op.filters {
        if filter.location == Some(FilterLocation::Path) {
            if !placeholders.contains(&filter.name.as_str()) {
                return Err(fail(format!(
                    "operation '{}' path filter '{}' does not appear in the path",
                    op.name, filter.name
                )));
            }
            if !filter.required {
                return Err(fail(format!(
                    "operation '{}' path filter '{}' must be required",
                    op.name, filter.name
                )));
            }
        }
    }

    Ok(())
}
