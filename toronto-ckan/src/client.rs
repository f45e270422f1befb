use crate::models;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Base URL of the City of Toronto CKAN action API
pub const TORONTO_CKAN_BASE_URL: &str = "https://ckan0.cf.opendata.inter.prod-toronto.ca/api/3";

/// Configuration for the CKAN client
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Base URL for the CKAN API (e.g., "https://ckan0.cf.opendata.inter.prod-toronto.ca/api/3")
    pub base_path: String,
    /// User agent string for HTTP requests
    pub user_agent: Option<String>,
    /// HTTP client instance
    pub client: reqwest::Client,
}

impl Configuration {
    /// Create a new configuration with default values
    pub fn new() -> Configuration {
        Configuration::default()
    }

    /// Point the client at another CKAN instance, e.g. a mock server in tests
    pub fn with_base_path<S: Into<String>>(mut self, base_path: S) -> Self {
        self.base_path = base_path.into();
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            base_path: TORONTO_CKAN_BASE_URL.to_owned(),
            user_agent: Some(concat!("toronto-ckan/", env!("CARGO_PKG_VERSION")).to_owned()),
            client: reqwest::Client::new(),
        }
    }
}

/// # CKAN Client
///
/// A read-only client for the CKAN action API, built for the Toronto open
/// data portal but usable against any CKAN instance.
///
/// Every call is a single GET with no retries. The CKAN response envelope
/// is unwrapped so callers only ever see the `result` payload or a
/// classified [`CkanError`].
///
/// ## Usage
///
/// ```rust,no_run
/// use toronto_ckan::{CkanClient, Configuration};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = CkanClient::new(Arc::new(Configuration::default()));
///
///     let package = client.package_show("dinesafe").await?;
///     println!("{} has {} resources", package.display_title(), package.resources.len());
///
///     Ok(())
/// }
/// ```
pub struct CkanClient {
    configuration: Arc<Configuration>,
}

impl std::fmt::Debug for CkanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CkanClient")
            .field("base_path", &self.configuration.base_path)
            .finish()
    }
}

/// Errors that can occur when talking to the CKAN API
///
/// Each variant renders a distinct message so a text report can tell a dead
/// network apart from a CKAN refusal.
///
/// # Examples
///
/// ```rust
/// # use toronto_ckan::CkanError;
/// let err = CkanError::ApiError { status: 404, message: String::new() };
/// assert_eq!(err.to_string(), "HTTP Error: 404");
/// ```
#[derive(Debug)]
pub enum CkanError {
    /// Transport-level failure: connection refused, DNS, timeout, broken body
    RequestError(Box<dyn std::error::Error + Send + Sync>),

    /// Protocol-level failure: the server answered with a non-2xx status
    ///
    /// `message` holds the CKAN error text when the body carried a CKAN
    /// envelope, and is empty otherwise.
    ApiError {
        /// HTTP status code
        status: u16,
        /// CKAN error text, possibly empty
        message: String,
    },

    /// The server answered 2xx but the envelope reported `success: false`
    ActionError {
        /// CKAN error text
        message: String,
    },

    /// Anything else: undecodable JSON, a result of unexpected shape
    ParseError(serde_json::Error),
}

impl std::fmt::Display for CkanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CkanError::RequestError(e) => write!(f, "URL Error: {}", e),
            CkanError::ApiError { status, message } if message.is_empty() => {
                write!(f, "HTTP Error: {}", status)
            }
            CkanError::ApiError { status, message } => {
                write!(f, "HTTP Error: {}: {}", status, message)
            }
            CkanError::ActionError { message } => write!(f, "CKAN action failed: {}", message),
            CkanError::ParseError(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CkanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CkanError::RequestError(e) => Some(e.as_ref()),
            CkanError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of a single API call: the unwrapped payload or a classified failure
pub type ApiResult<T> = Result<T, CkanError>;

/// Parameters for a `datastore_search` call
///
/// # Examples
///
/// ```rust
/// # use toronto_ckan::DatastoreQuery;
/// // Zero-row probe: returns field metadata and the total count only
/// let probe = DatastoreQuery::new("resource-id").with_limit(0);
/// assert_eq!(probe.limit, Some(0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatastoreQuery {
    pub resource_id: String,
    /// Equality filters, sent as a JSON object
    pub filters: Option<Map<String, Value>>,
    /// Projection, sent comma-joined
    pub fields: Option<Vec<String>>,
    /// Sort expression such as `inspection_date desc`, sent verbatim
    pub sort: Option<String>,
    pub limit: Option<u32>,
}

impl DatastoreQuery {
    pub fn new<S: Into<String>>(resource_id: S) -> Self {
        Self {
            resource_id: resource_id.into(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_filters(mut self, filters: Map<String, Value>) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_sort<S: Into<String>>(mut self, sort: S) -> Self {
        self.sort = Some(sort.into());
        self
    }

    fn to_params(&self) -> Vec<(&'static str, Value)> {
        let mut params = vec![("id", Value::String(self.resource_id.clone()))];
        if let Some(limit) = self.limit {
            params.push(("limit", Value::from(limit)));
        }
        if let Some(filters) = self.filters.as_ref().filter(|f| !f.is_empty()) {
            params.push(("filters", Value::Object(filters.clone())));
        }
        if let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) {
            params.push(("fields", Value::String(fields.join(","))));
        }
        if let Some(sort) = self.sort.as_ref().filter(|s| !s.is_empty()) {
            params.push(("sort", Value::String(sort.clone())));
        }
        params
    }
}

impl CkanClient {
    /// Create a new CKAN client instance
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use toronto_ckan::{CkanClient, Configuration};
    /// # use std::sync::Arc;
    /// let config = Configuration::default().with_base_path("http://localhost:5000/api/3");
    /// let client = CkanClient::new(Arc::new(config));
    /// assert!(format!("{:?}", client).contains("localhost"));
    /// ```
    pub fn new(configuration: Arc<Configuration>) -> Self {
        Self { configuration }
    }

    /// Base URL this client talks to
    pub fn base_path(&self) -> &str {
        &self.configuration.base_path
    }

    /// Issue one GET against `endpoint` (relative to the base path) and
    /// return the unwrapped `result` payload.
    ///
    /// Objects and arrays in `params` are sent as compact JSON text. Strings
    /// are sent as-is, numbers and booleans as their JSON text, and nulls
    /// are dropped.
    pub async fn request(&self, endpoint: &str, params: &[(&str, Value)]) -> ApiResult<Value> {
        let mut url = format!(
            "{}/{}",
            self.configuration.base_path.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        let query_string = encode_query(params)?;
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        tracing::debug!(%url, "CKAN request");

        let mut request = self.configuration.client.get(&url);
        if let Some(user_agent) = &self.configuration.user_agent {
            request = request.header(reqwest::header::USER_AGENT, user_agent);
        }

        let response = request
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(request_error)?;

        if !status.is_success() {
            // CKAN reports validation failures (bad filter field, unknown id)
            // as 4xx with an envelope; keep its text when there is one.
            let message = serde_json::from_slice::<models::ActionResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .map(|error| error_message(&error))
                .unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %message, "CKAN request failed");
            return Err(CkanError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: models::ActionResponse =
            serde_json::from_slice(&body).map_err(CkanError::ParseError)?;

        if !envelope.success {
            let message = envelope
                .error
                .as_ref()
                .map(error_message)
                .unwrap_or_else(|| "CKAN API reported failure".to_string());
            return Err(CkanError::ActionError { message });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }

    async fn request_as<T>(&self, endpoint: &str, params: &[(&str, Value)]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let result = self.request(endpoint, params).await?;
        serde_json::from_value(result).map_err(CkanError::ParseError)
    }

    /// Fetch a dataset with its ordered resource list
    pub async fn package_show(&self, id: &str) -> ApiResult<models::Package> {
        self.request_as("action/package_show", &[("id", Value::from(id))])
            .await
    }

    /// List the names of every dataset in the catalog
    pub async fn package_list(&self) -> ApiResult<Vec<String>> {
        self.request_as("action/package_list", &[]).await
    }

    /// Full-text dataset search, single page of at most `rows` results
    pub async fn package_search(
        &self,
        q: &str,
        rows: Option<u32>,
    ) -> ApiResult<models::PackageSearchResult> {
        let mut params = vec![("q", Value::from(q))];
        if let Some(rows) = rows {
            params.push(("rows", Value::from(rows)));
        }
        self.request_as("action/package_search", &params).await
    }

    /// Query rows of a live datastore resource
    ///
    /// A `limit` of zero makes this a metadata probe: `fields` and `total`
    /// are populated and `records` is empty.
    pub async fn datastore_search(
        &self,
        query: &DatastoreQuery,
    ) -> ApiResult<models::DatastoreSearchResult> {
        self.request_as("action/datastore_search", &query.to_params())
            .await
    }
}

fn encode_query(params: &[(&str, Value)]) -> ApiResult<String> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Array(_) => {
                serde_json::to_string(value).map_err(CkanError::ParseError)?
            }
            other => other.to_string(),
        };
        pairs.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(&text)
        ));
    }
    Ok(pairs.join("&"))
}

/// Transport failures carry no URL: the query string holds caller text
/// (filters, projection) that must not read as part of the failure.
fn request_error(err: reqwest::Error) -> CkanError {
    CkanError::RequestError(Box::new(err.without_url()))
}

/// Pull a readable message out of a CKAN `error` value.
///
/// Validation errors carry no `message` and list the offending keys instead,
/// e.g. `{"__type": "Validation Error", "fields": ["..."]}`; those are
/// rendered as compact JSON so the keys stay visible.
fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => error.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_values_are_serialized_before_encoding() {
        let query = encode_query(&[
            ("id", json!("abc")),
            ("filters", json!({"establishment_status": "Pass"})),
        ])
        .unwrap();

        assert_eq!(
            query,
            "id=abc&filters=%7B%22establishment_status%22%3A%22Pass%22%7D"
        );
    }

    #[test]
    fn scalars_keep_their_case_and_nulls_are_dropped() {
        let query = encode_query(&[
            ("q", json!("DineSafe")),
            ("rows", json!(5)),
            ("skip", Value::Null),
            ("flag", json!(true)),
        ])
        .unwrap();

        assert_eq!(query, "q=DineSafe&rows=5&flag=true");
    }

    #[test]
    fn datastore_query_collapses_projection_and_keeps_zero_limit() {
        let mut filters = Map::new();
        filters.insert("status".into(), json!("Active"));
        let query = DatastoreQuery::new("res-1")
            .with_limit(0)
            .with_filters(filters)
            .with_fields(vec!["name".into(), "address".into()])
            .with_sort("name asc");

        let params = query.to_params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["id", "limit", "filters", "fields", "sort"]);
        assert_eq!(params[1].1, json!(0));
        assert_eq!(params[3].1, json!("name,address"));
    }

    #[test]
    fn empty_optional_parts_are_not_sent() {
        let query = DatastoreQuery {
            resource_id: "res-1".into(),
            filters: Some(Map::new()),
            fields: Some(vec![]),
            sort: Some(String::new()),
            limit: None,
        };
        let keys: Vec<&str> = query.to_params().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["id"]);
    }

    #[test]
    fn error_message_prefers_message_key() {
        assert_eq!(
            error_message(&json!({"message": "Not found", "__type": "Not Found Error"})),
            "Not found"
        );
        let validation = error_message(&json!({
            "__type": "Validation Error",
            "fields": ["field \"nope\" does not exist"]
        }));
        assert!(validation.contains("fields"));
        assert!(validation.contains("nope"));
    }
}
