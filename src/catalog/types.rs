//! Catalog types
//!
//! Declarative service and operation definitions for YAML parsing.

use crate::pagination::PageSizeBounds;
use crate::types::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Service Definition
// ============================================================================

/// A remote service and its paged listing operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service name used on the command line (e.g. `elasticache`)
    pub service: String,
    /// Human readable title
    #[serde(default)]
    pub title: String,
    /// Endpoint URL template, `{region}` is substituted
    pub endpoint: String,
    /// JSON protocol target prefix (`X-Amz-Target: <prefix>.<action>`)
    #[serde(default)]
    pub target_prefix: Option<String>,
    /// Headers sent with every request to this service
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Listing operations
    pub operations: Vec<OperationDefinition>,
}

impl ServiceDefinition {
    /// Look up an operation by kebab-case name or API action name
    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations
            .iter()
            .find(|op| op.name == name || op.action.eq_ignore_ascii_case(name))
    }

    /// Operation names in definition order
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name.as_str()).collect()
    }

    /// The `X-Amz-Target` header value for an operation, if the service uses one
    pub fn target_for(&self, operation: &OperationDefinition) -> Option<String> {
        self.target_prefix
            .as_deref()
            .map(|prefix| format!("{prefix}.{}", operation.action))
    }
}

// ============================================================================
// Operation Definition
// ============================================================================

/// One paged list/describe call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    /// Kebab-case name (e.g. `describe-cache-clusters`)
    pub name: String,
    /// API action name (e.g. `DescribeCacheClusters`)
    pub action: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// HTTP method
    #[serde(default)]
    pub method: Method,
    /// URL path, may contain `{Name}` placeholders bound to path filters
    #[serde(default = "default_path")]
    pub path: String,
    /// Location of the item array in the response (dot path or JSONPath)
    pub items_path: String,
    /// Continuation cursor fields
    pub cursor: CursorDefinition,
    /// Page-size hint field and bounds
    #[serde(default)]
    pub page_size: Option<PageSizeDefinition>,
    /// Filter fields accepted by the operation
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
}

fn default_path() -> String {
    "/".to_string()
}

impl OperationDefinition {
    /// Page-size bounds, if the operation accepts a page-size hint
    pub fn page_size_bounds(&self) -> Option<PageSizeBounds> {
        self.page_size
            .as_ref()
            .map(|p| PageSizeBounds::new(p.min, p.max))
    }

    /// Look up a filter by name (case-insensitive)
    pub fn filter(&self, name: &str) -> Option<&FilterDefinition> {
        self.filters
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Placeholder names in the path template
    pub fn path_placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.path.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                break;
            };
            names.push(&after[..end]);
            rest = &after[end + 1..];
        }
        names
    }
}

/// Request and response fields carrying the continuation cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorDefinition {
    /// Request field (`Marker`, `NextToken`)
    pub request_field: String,
    /// Response path of the next cursor
    pub response_path: String,
}

/// Page-size hint field and its service bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeDefinition {
    /// Request field (`MaxRecords`, `MaxResults`)
    pub field: String,
    /// Smallest accepted value
    #[serde(default = "default_min_page_size")]
    pub min: u32,
    /// Service page-size ceiling
    pub max: u32,
}

fn default_min_page_size() -> u32 {
    1
}

// ============================================================================
// Filter Definition
// ============================================================================

/// A non-paging request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Field name as sent on the wire
    pub name: String,
    /// Value type
    #[serde(rename = "type", default)]
    pub filter_type: FilterType,
    /// Whether the filter must be supplied
    #[serde(default)]
    pub required: bool,
    /// Where the value goes; defaults to the query string for GET and the
    /// JSON body for POST
    #[serde(default)]
    pub location: Option<FilterLocation>,
}

impl FilterDefinition {
    /// Effective location for a request method
    pub fn location_for(&self, method: Method) -> FilterLocation {
        self.location.unwrap_or(match method {
            Method::GET => FilterLocation::Query,
            Method::POST => FilterLocation::Body,
        })
    }
}

/// Filter value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    #[default]
    String,
    Integer,
    Boolean,
    /// RFC 3339 or `YYYY-MM-DD`, sent as RFC 3339 UTC
    Timestamp,
    /// Comma-separated on the command line
    StringList,
}

/// Where a filter value is placed in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterLocation {
    Path,
    Query,
    Body,
}
