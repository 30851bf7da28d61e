//! Built-in service definitions embedded in the binary
//!
//! Lets users run `pagewalk list elasticache describe-cache-clusters`
//! without shipping definition files alongside the binary.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in service YAML definitions
pub static BUILTIN_SERVICES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        m.insert(
            "elasticache",
            include_str!("../../services/elasticache.yaml"),
        );
        m.insert(
            "internetmonitor",
            include_str!("../../services/internetmonitor.yaml"),
        );

        m
    });

/// Get a built-in service definition by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_SERVICES.get(name).copied()
}

/// List all built-in service names, sorted
pub fn list_builtin() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTIN_SERVICES.keys().copied().collect();
    names.sort_unstable();
    names
}
