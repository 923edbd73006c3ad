//! Request and response types for the FOFA API.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Parameters of one search call.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Builder)]
#[builder(setter(into))]
pub struct SearchRequest {
    /// FOFA query expression, sent base64 encoded
    query: String,
    /// Result page, starting at 1
    #[builder(default = "1")]
    page: usize,
    /// Rows per page
    #[builder(default = "100")]
    size: usize,
    /// Comma-separated field list
    #[builder(default = "\"host\".to_string()")]
    fields: String,
    /// Search all historical data instead of the last year
    #[builder(default)]
    full: bool,
}

impl SearchRequest {
    /// Create a builder.
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::default()
    }

    /// First page of `query` with the given fields and page size.
    pub fn first_page(
        query: impl Into<String>,
        fields: impl Into<String>,
        size: usize,
        full: bool,
    ) -> Self {
        Self {
            query: query.into(),
            page: 1,
            size,
            fields: fields.into(),
            full,
        }
    }
}

/// Normalised outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SearchResult {
    /// Query that produced this result
    query: String,
    /// Total number of matches reported by the service
    total: usize,
    /// Downloaded rows, one string each
    rows: Vec<String>,
}

impl SearchResult {
    /// Build a result from already normalised rows.
    pub fn new(query: impl Into<String>, total: usize, rows: Vec<String>) -> Self {
        Self {
            query: query.into(),
            total,
            rows,
        }
    }

    /// Consume the result and return its rows.
    pub fn into_rows(self) -> Vec<String> {
        self.rows
    }
}

/// Raw search response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub size: usize,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Account details of an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct AccountInfo {
    /// Registered email
    #[serde(default)]
    email: String,
    /// Display name
    #[serde(default)]
    username: String,
    /// Whether the account is a VIP account
    #[serde(default, rename = "isvip")]
    is_vip: bool,
    /// VIP tier
    #[serde(default)]
    vip_level: i64,
    /// F-coin balance
    #[serde(default, rename = "fcoin")]
    fcoins: i64,
}

/// `error`/`errmsg` pair every endpoint may return.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiStatus {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub errmsg: String,
}

/// Flatten one result row into a single line.
///
/// Strings pass through unchanged. Arrays are joined with `,`, their string
/// items unquoted. `null` becomes an empty string.
///
/// ```
/// use fofa_client::normalize_row;
/// use serde_json::json;
///
/// assert_eq!(normalize_row(&json!("1.1.1.1:443")), "1.1.1.1:443");
/// assert_eq!(normalize_row(&json!(["1.1.1.1", "443", "https"])), "1.1.1.1,443,https");
/// ```
pub fn normalize_row(row: &Value) -> String {
    match row {
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(","),
        other => scalar(other),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
