use toronto_ckan::models::Package;
use toronto_ckan::{CkanClient, DatastoreQuery};
use url::Url;

use crate::classifier::{Classification, classify};
use crate::config::TorontoDataConfig;
use crate::dispatcher::{self, DEFAULT_LIMIT, QuerySpec};
use crate::error::{Result, TorontoDataError};
use crate::fetcher::{DEFAULT_MAX_LINES, LineBoundedFetcher};
use crate::{format, guide, schema};

/// Lines read when the smart helper previews a lone CSV file
const PREVIEW_LINES: usize = 10;

/// High-level client for the Toronto open data catalog
///
/// Each public operation returns a finished text report. Failures are
/// rendered into that text; none of them propagate to the caller. Calls
/// within an operation run one after another and a failed step ends the
/// operation.
///
/// ```rust,no_run
/// # use toronto_data::TorontoDataClient;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TorontoDataClient::new()?;
/// println!("{}", client.dataset_schema("dinesafe").await);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TorontoDataClient {
    ckan: CkanClient,
    fetcher: LineBoundedFetcher,
    config: TorontoDataConfig,
}

impl TorontoDataClient {
    /// Create a client for the Toronto portal with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TorontoDataConfig::new())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: TorontoDataConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url()).map_err(|e| {
            TorontoDataError::config_error(format!("invalid base URL {}: {}", config.base_url(), e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TorontoDataError::config_error(format!(
                "base URL must be http or https: {}",
                base_url
            )));
        }

        let ckan = CkanClient::new(config.ckan_config.clone());

        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| TorontoDataError::config_error(e.to_string()))?;
        let fetcher = LineBoundedFetcher::new(http_client, config.fetch_timeout());

        Ok(Self {
            ckan,
            fetcher,
            config,
        })
    }

    pub fn config(&self) -> &TorontoDataConfig {
        &self.config
    }

    /// Get the underlying CKAN client for advanced operations
    pub fn ckan_client(&self) -> &CkanClient {
        &self.ckan
    }

    /// Fetch a dataset with its resources
    pub async fn get_dataset(&self, dataset_id: &str) -> Result<Package> {
        Ok(self.ckan.package_show(dataset_id).await?)
    }

    // === Guides ===

    pub fn start_here(&self) -> String {
        guide::start_here()
    }

    pub fn popular_datasets(&self) -> String {
        guide::popular_datasets()
    }

    // === Discovery ===

    /// Every dataset in the catalog with its title and a short description.
    ///
    /// Looks up each dataset in turn; datasets whose lookup fails are left
    /// out of the list.
    pub async fn list_datasets(&self) -> String {
        let names = match self.ckan.package_list().await {
            Ok(names) => names,
            Err(err) => return format::list_error(&TorontoDataError::from(err)),
        };

        let mut packages = Vec::with_capacity(names.len());
        for name in &names {
            match self.ckan.package_show(name).await {
                Ok(package) => packages.push(package),
                Err(err) => tracing::warn!(dataset = %name, "skipping dataset: {err}"),
            }
        }

        format::list_report(&packages)
    }

    /// Keyword search, a single page of at most `limit` datasets (default 10)
    pub async fn search_datasets(&self, query: &str, limit: Option<u32>) -> String {
        let rows = limit.unwrap_or(DEFAULT_LIMIT);
        match self.ckan.package_search(query, Some(rows)).await {
            Ok(result) => format::search_report(query, &result),
            Err(err) => format::search_error(query, &TorontoDataError::from(err)),
        }
    }

    pub async fn dataset_details(&self, dataset_id: &str) -> String {
        match self.get_dataset(dataset_id).await {
            Ok(package) => format::dataset_details(&package),
            Err(err) => format::dataset_error(dataset_id, &err),
        }
    }

    // === Data access ===

    /// Field names and types of the dataset's live resource
    pub async fn dataset_schema(&self, dataset_id: &str) -> String {
        let package = match self.get_dataset(dataset_id).await {
            Ok(package) => package,
            Err(err) => return format::dataset_error(dataset_id, &err),
        };
        let title = package.display_title();

        match classify(&package.resources) {
            Classification::Live(resource) => {
                let resource_id = resource.id.as_deref().unwrap_or_default();
                match schema::inspect(&self.ckan, resource_id).await {
                    Ok(fields) => format::schema_report(title, &fields),
                    Err(TorontoDataError::NoFields { .. }) => format::schema_empty(title),
                    Err(err) => format::schema_error(dataset_id, &err),
                }
            }
            Classification::Static(files) if files.is_empty() => {
                format::schema_unavailable(title, dataset_id)
            }
            Classification::Static(files) => format::schema_static(title, dataset_id, &files),
        }
    }

    /// One-call overview: the data type, then sample rows for a live
    /// dataset or the file list (with a CSV preview) for a static one
    pub async fn smart_data_helper(
        &self,
        dataset_id: &str,
        user_question: &str,
        limit: Option<u32>,
    ) -> String {
        let package = match self.get_dataset(dataset_id).await {
            Ok(package) => package,
            Err(err) => {
                tracing::warn!(dataset = %dataset_id, "dataset lookup failed: {err}");
                return format::helper_not_found(dataset_id);
            }
        };
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        let mut output = vec![format!("📊 **{}**", package.display_title())];

        match classify(&package.resources) {
            Classification::Live(resource) => {
                let resource_id = resource.id.as_deref().unwrap_or_default();
                output.extend(self.helper_live_sections(resource_id, limit).await);
            }
            Classification::Static(files) => {
                let preview = match files.as_slice() {
                    [only] if only.format_upper() == "CSV" => match only.download_url() {
                        Some(url) => Some((*only, self.fetch_file(url, Some(PREVIEW_LINES)).await)),
                        None => None,
                    },
                    _ => None,
                };
                output.extend(format::helper_static(dataset_id, &files, preview));
            }
        }

        output.extend(format::helper_footer(user_question));
        output.join("\n")
    }

    async fn helper_live_sections(&self, resource_id: &str, limit: u32) -> Vec<String> {
        let fields = match schema::probe(&self.ckan, resource_id).await {
            Ok(probe) => probe.fields,
            Err(err) => {
                tracing::warn!(resource_id, "schema probe failed: {err}");
                return vec![
                    "✅ **Type**: API Data (queryable)".to_string(),
                    "❌ Could not retrieve field information.".to_string(),
                ];
            }
        };

        let query = DatastoreQuery::new(resource_id).with_limit(limit);
        match self.ckan.datastore_search(&query).await {
            Ok(sample) => format::helper_live(&fields, &sample, limit),
            Err(err) => {
                tracing::warn!(resource_id, "sample query failed: {err}");
                vec![
                    "✅ **Type**: API Data (queryable)".to_string(),
                    "❌ Could not retrieve sample data from API.".to_string(),
                ]
            }
        }
    }

    /// Filtered, sorted, projected query against the live resource; for
    /// file-only datasets, a description of the files instead
    pub async fn query_dataset(&self, dataset_id: &str, spec: &QuerySpec) -> String {
        let package = match self.get_dataset(dataset_id).await {
            Ok(package) => package,
            Err(err) => return format::dataset_error(dataset_id, &err),
        };

        let outcome = dispatcher::dispatch(&self.ckan, &package.resources, spec).await;
        format::query_outcome(dataset_id, package.display_title(), &outcome)
    }

    /// Record count and field list of the live resource, or the file list
    pub async fn dataset_stats(&self, dataset_id: &str) -> String {
        let package = match self.get_dataset(dataset_id).await {
            Ok(package) => package,
            Err(err) => return format::dataset_error(dataset_id, &err),
        };

        let mut output = format::stats_header(package.display_title(), package.resources.len());

        match classify(&package.resources) {
            Classification::Live(resource) => {
                let resource_id = resource.id.as_deref().unwrap_or_default();
                match schema::probe(&self.ckan, resource_id).await {
                    Ok(probe) => output.extend(format::stats_live(&probe)),
                    Err(err) => output.push(format!(
                        "❌ Could not retrieve statistics from the active datastore. Error: {}",
                        err
                    )),
                }
            }
            Classification::Static(files) => output.extend(format::stats_static(&files)),
        }

        output.push(format::stats_footer(dataset_id));
        output.join("\n")
    }

    /// First `max_lines` lines (default 50) of a remote CSV or text file
    pub async fn fetch_file(&self, url: &str, max_lines: Option<usize>) -> String {
        let max_lines = max_lines.unwrap_or(DEFAULT_MAX_LINES);
        match self.fetcher.fetch(url, max_lines).await {
            Ok(fetched) => format::fetched_text(&fetched, max_lines),
            Err(err) => {
                tracing::warn!(%url, "file fetch failed: {err}");
                format::fetch_error(url, &err)
            }
        }
    }
}
