//! Routes a filtered query to the live datastore, or explains which files
//! to fetch when the dataset has no datastore.

use serde::Deserialize;
use serde_json::{Map, Value};
use toronto_ckan::models::{DatastoreSearchResult, Resource};
use toronto_ckan::{CkanClient, CkanError, DatastoreQuery};

use crate::classifier::{Classification, classify, format_counts};

/// Row limit when the caller gives none
pub const DEFAULT_LIMIT: u32 = 10;

/// A caller's query against one dataset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuerySpec {
    /// Equality filters, field name to exact value (case-sensitive)
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
    /// Columns to return
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// `"field asc"` or `"field desc"`
    #[serde(default)]
    pub sort: Option<String>,
}

impl QuerySpec {
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    fn to_datastore_query(&self, resource_id: &str) -> DatastoreQuery {
        DatastoreQuery {
            resource_id: resource_id.to_string(),
            filters: self.filters.clone(),
            fields: self.fields.clone(),
            sort: self.sort.clone(),
            limit: Some(self.effective_limit()),
        }
    }
}

/// Which path a query takes, in order of precedence
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRoute<'a> {
    Live(&'a Resource),
    StaticSingle(&'a Resource),
    StaticMultiple(Vec<&'a Resource>),
    NoneFound,
}

impl<'a> From<Classification<'a>> for QueryRoute<'a> {
    fn from(classification: Classification<'a>) -> Self {
        match classification {
            Classification::Live(resource) => QueryRoute::Live(resource),
            Classification::Static(files) => {
                // A file without a URL can be neither fetched nor downloaded
                let mut files: Vec<&Resource> = files
                    .into_iter()
                    .filter(|resource| resource.download_url().is_some())
                    .collect();
                match files.len() {
                    0 => QueryRoute::NoneFound,
                    1 => QueryRoute::StaticSingle(files.remove(0)),
                    _ => QueryRoute::StaticMultiple(files),
                }
            }
        }
    }
}

/// Result of dispatching a [`QuerySpec`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<'a> {
    /// Datastore rows
    Records(DatastoreSearchResult),
    /// The query succeeded but matched nothing
    NoData,
    /// The datastore rejected a field or column name
    FilteringError(String),
    QueryError(String),
    StaticSingle(&'a Resource),
    StaticMultiple { csv: usize, xls: usize },
    NoneFound,
}

/// Whether a datastore error message points at a bad field or column name
pub fn is_field_error(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("field") || message.contains("column")
}

/// Run `spec` against the dataset owning `resources`.
///
/// Only the live route touches the network; static routes describe the
/// files instead of querying them.
pub async fn dispatch<'a>(
    ckan: &CkanClient,
    resources: &'a [Resource],
    spec: &QuerySpec,
) -> QueryOutcome<'a> {
    match QueryRoute::from(classify(resources)) {
        QueryRoute::Live(resource) => {
            let resource_id = resource.id.as_deref().unwrap_or_default();
            let query = spec.to_datastore_query(resource_id);
            match ckan.datastore_search(&query).await {
                Ok(result) if result.records.is_empty() => QueryOutcome::NoData,
                Ok(result) => QueryOutcome::Records(result),
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(resource_id, %message, "datastore query failed");
                    // Only a CKAN answer can name a bad field; transport
                    // failures always take the generic path
                    let answered = !matches!(err, CkanError::RequestError(_));
                    if answered && is_field_error(&message) {
                        QueryOutcome::FilteringError(message)
                    } else {
                        QueryOutcome::QueryError(message)
                    }
                }
            }
        }
        QueryRoute::StaticSingle(resource) => QueryOutcome::StaticSingle(resource),
        QueryRoute::StaticMultiple(files) => {
            let (csv, xls) = format_counts(&files);
            QueryOutcome::StaticMultiple { csv, xls }
        }
        QueryRoute::NoneFound => QueryOutcome::NoneFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, format: &str, url: Option<&str>) -> Resource {
        Resource {
            id: Some(id.into()),
            name: Some(id.into()),
            format: Some(format.into()),
            url: url.map(str::to_string),
            ..Resource::default()
        }
    }

    #[test]
    fn field_error_detection_is_case_insensitive() {
        assert!(is_field_error("HTTP Error: 409: Field \"x\" not found"));
        assert!(is_field_error("unknown COLUMN name"));
        assert!(!is_field_error("HTTP Error: 500"));
        assert!(!is_field_error("URL Error: connection refused"));
    }

    #[test]
    fn live_beats_static() {
        let mut live = file("live", "CSV", None);
        live.datastore_active = Some(true);
        let resources = vec![file("a", "CSV", Some("https://x/a.csv")), live];

        match QueryRoute::from(classify(&resources)) {
            QueryRoute::Live(resource) => assert_eq!(resource.id.as_deref(), Some("live")),
            other => panic!("expected live, got {other:?}"),
        }
    }

    #[test]
    fn single_and_multiple_static_routes() {
        let one = vec![file("a", "CSV", Some("https://x/a.csv"))];
        assert!(matches!(
            QueryRoute::from(classify(&one)),
            QueryRoute::StaticSingle(_)
        ));

        let two = vec![
            file("a", "CSV", Some("https://x/a.csv")),
            file("b", "XLS", Some("https://x/b.xls")),
        ];
        match QueryRoute::from(classify(&two)) {
            QueryRoute::StaticMultiple(files) => assert_eq!(files.len(), 2),
            other => panic!("expected multiple, got {other:?}"),
        }
    }

    #[test]
    fn files_without_urls_are_not_routable() {
        let resources = vec![file("a", "CSV", None), file("b", "CSV", Some(""))];
        assert_eq!(QueryRoute::from(classify(&resources)), QueryRoute::NoneFound);

        let resources = vec![file("a", "CSV", None), file("b", "CSV", Some("https://x/b"))];
        assert!(matches!(
            QueryRoute::from(classify(&resources)),
            QueryRoute::StaticSingle(r) if r.id.as_deref() == Some("b")
        ));
    }

    #[test]
    fn query_spec_defaults_limit() {
        let spec = QuerySpec::default();
        let query = spec.to_datastore_query("r1");
        assert_eq!(query.limit, Some(DEFAULT_LIMIT));

        let spec = QuerySpec {
            limit: Some(3),
            sort: Some("score desc".into()),
            ..QuerySpec::default()
        };
        let query = spec.to_datastore_query("r1");
        assert_eq!(query.limit, Some(3));
        assert_eq!(query.sort.as_deref(), Some("score desc"));
    }
}
