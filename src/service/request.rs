//! Typed list requests
//!
//! A [`ListRequest`] holds the filter values of one listing call plus the
//! two paging fields the fetcher controls. Filters are validated against
//! the operation's declared filters when the request is built, so a bad
//! value is reported before anything is sent.

use crate::catalog::{FilterDefinition, FilterLocation, FilterType, OperationDefinition};
use crate::error::{Error, Result};
use crate::pagination::PageRequest;
use crate::types::{Cursor, JsonObject, JsonValue, Method};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};

// ============================================================================
// Filter Values
// ============================================================================

/// A parsed filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    StringList(Vec<String>),
}

impl FilterValue {
    /// Parse a raw command-line value according to the filter's type
    pub fn parse(def: &FilterDefinition, raw: &str) -> Result<Self> {
        let invalid = |expected: &str| {
            Error::invalid_argument(&def.name, format!("expected {expected}, got '{raw}'"))
        };

        match def.filter_type {
            FilterType::String => Ok(Self::String(raw.to_string())),
            FilterType::Integer => raw
                .trim()
                .parse()
                .map(Self::Integer)
                .map_err(|_| invalid("an integer")),
            FilterType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Self::Boolean(true)),
                "false" | "no" | "0" => Ok(Self::Boolean(false)),
                _ => Err(invalid("true or false")),
            },
            FilterType::Timestamp => parse_timestamp(raw.trim())
                .map(Self::Timestamp)
                .ok_or_else(|| invalid("an RFC 3339 timestamp or YYYY-MM-DD")),
            FilterType::StringList => Ok(Self::StringList(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
        }
    }

    /// JSON body representation
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Integer(n) => JsonValue::from(*n),
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
            Self::StringList(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
        }
    }

    /// Query string representation, one entry per value
    pub fn to_query_values(&self) -> Vec<String> {
        match self {
            Self::String(s) => vec![s.clone()],
            Self::Integer(n) => vec![n.to_string()],
            Self::Boolean(b) => vec![b.to_string()],
            Self::Timestamp(ts) => vec![format_timestamp(ts)],
            Self::StringList(items) => items.clone(),
        }
    }

    /// Single string form used for path segments
    fn to_path_value(&self) -> String {
        self.to_query_values().join(",")
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn encode_path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

// ============================================================================
// List Request
// ============================================================================

/// Request template for one listing operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    filters: Vec<(FilterDefinition, FilterValue)>,
    cursor: Option<Cursor>,
    page_size: Option<u32>,
}

/// A request ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRequest {
    /// HTTP method
    pub method: Method,
    /// Path with placeholders filled in
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body (POST only)
    pub body: Option<JsonValue>,
}

impl ListRequest {
    /// Create a request with no filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from `NAME=VALUE` assignments
    pub fn from_assignments<S: AsRef<str>>(
        op: &OperationDefinition,
        assignments: &[S],
    ) -> Result<Self> {
        let pairs = assignments
            .iter()
            .map(|a| {
                let a = a.as_ref();
                a.split_once('=').ok_or_else(|| {
                    Error::invalid_argument("filter", format!("expected NAME=VALUE, got '{a}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(op, pairs)
    }

    /// Build a request from name/value pairs
    ///
    /// Names are matched case-insensitively. Repeating a `string_list`
    /// filter appends to it; repeating any other filter is an error.
    pub fn from_pairs<K, V>(
        op: &OperationDefinition,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::new();

        for (name, raw) in pairs {
            let name = name.as_ref().trim();
            let def = op.filter(name).ok_or_else(|| Error::UnknownFilter {
                operation: op.name.clone(),
                filter: name.to_string(),
            })?;
            let value = FilterValue::parse(def, raw.as_ref())?;
            request.push(def, value)?;
        }

        if let Some(missing) = op
            .filters
            .iter()
            .find(|f| f.required && request.filter(&f.name).is_none())
        {
            return Err(Error::MissingFilter {
                operation: op.name.clone(),
                filter: missing.name.clone(),
            });
        }

        Ok(request)
    }

    fn push(&mut self, def: &FilterDefinition, value: FilterValue) -> Result<()> {
        match self.filters.iter_mut().find(|(d, _)| d.name == def.name) {
            None => {
                self.filters.push((def.clone(), value));
                Ok(())
            }
            Some((_, FilterValue::StringList(existing))) => {
                if let FilterValue::StringList(more) = value {
                    existing.extend(more);
                }
                Ok(())
            }
            Some(_) => Err(Error::invalid_argument(
                &def.name,
                "filter given more than once",
            )),
        }
    }

    /// Value of a filter, by declared name
    pub fn filter(&self, name: &str) -> Option<&FilterValue> {
        self.filters
            .iter()
            .find(|(d, _)| d.name.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Current continuation cursor
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Current page-size hint
    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// Render the request for an operation
    pub fn render(&self, op: &OperationDefinition) -> Result<RenderedRequest> {
        let mut path = op.path.clone();
        let mut query = Vec::new();
        let mut body = JsonObject::new();

        for placeholder in op.path_placeholders() {
            let value = self.filter(placeholder).ok_or_else(|| Error::MissingFilter {
                operation: op.name.clone(),
                filter: placeholder.to_string(),
            })?;
            path = path.replace(
                &format!("{{{placeholder}}}"),
                &encode_path_segment(&value.to_path_value()),
            );
        }

        for (def, value) in &self.filters {
            match def.location_for(op.method) {
                FilterLocation::Path => {}
                FilterLocation::Query => {
                    for v in value.to_query_values() {
                        query.push((def.name.clone(), v));
                    }
                }
                FilterLocation::Body => {
                    body.insert(def.name.clone(), value.to_json());
                }
            }
        }

        let page_size = op
            .page_size
            .as_ref()
            .zip(self.page_size)
            .map(|(def, size)| (def.field.clone(), size));

        match op.method {
            Method::GET => {
                if let Some(cursor) = &self.cursor {
                    query.push((op.cursor.request_field.clone(), cursor.to_string()));
                }
                if let Some((field, size)) = page_size {
                    query.push((field, size.to_string()));
                }
            }
            Method::POST => {
                if let Some(cursor) = &self.cursor {
                    body.insert(
                        op.cursor.request_field.clone(),
                        JsonValue::String(cursor.to_string()),
                    );
                }
                if let Some((field, size)) = page_size {
                    body.insert(field, JsonValue::from(size));
                }
            }
        }

        Ok(RenderedRequest {
            method: op.method,
            path,
            query,
            body: (op.method == Method::POST).then_some(JsonValue::Object(body)),
        })
    }
}

impl PageRequest for ListRequest {
    fn set_cursor(&mut self, cursor: Option<Cursor>) {
        self.cursor = cursor;
    }

    fn set_page_size(&mut self, page_size: Option<u32>) {
        self.page_size = page_size;
    }
}
