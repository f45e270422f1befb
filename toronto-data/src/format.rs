//! Text reports for every operation outcome.
//!
//! All functions here are pure. Records never show the datastore `_id`
//! column, and every report closes with a pointer to the tool to call next.

use serde_json::Value;
use toronto_ckan::models::{
    DatastoreField, DatastoreSearchResult, INTERNAL_ID_FIELD, Package, PackageSearchResult, Record,
    Resource,
};

use crate::dispatcher::QueryOutcome;
use crate::error::TorontoDataError;
use crate::fetcher::FetchedText;
use crate::tools;

/// `1234567` -> `1,234,567`
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Bullet lines for one record, `_id` left out
pub fn record_lines(record: &Record) -> Vec<String> {
    record
        .iter()
        .filter(|(key, _)| key.as_str() != INTERNAL_ID_FIELD)
        .map(|(key, value)| format!("  • {}: {}", key, display_value(value)))
        .collect()
}

fn push_records(output: &mut Vec<String>, records: &[Record]) {
    for (i, record) in records.iter().enumerate() {
        output.push(format!("\n**Record {}:**", i + 1));
        output.extend(record_lines(record));
    }
}

fn field_names<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a DatastoreField>,
{
    fields
        .into_iter()
        .filter(|field| field.id != INTERNAL_ID_FIELD)
        .map(|field| field.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_label(resource: &Resource) -> String {
    let format = resource.format_upper();
    if format.is_empty() {
        "unknown format".to_string()
    } else {
        format
    }
}

// === Dataset detail ===

pub fn dataset_details(package: &Package) -> String {
    let description = package
        .notes
        .as_deref()
        .filter(|notes| !notes.is_empty())
        .unwrap_or("No description provided");
    let organization = package
        .organization
        .as_ref()
        .and_then(|org| org.title.as_deref())
        .unwrap_or("Unknown");

    let mut output = vec![
        format!("📊 **Dataset**: {}", package.display_title()),
        format!("📝 **Description**: {}", description),
        format!("🏛️ **Organization**: {}", organization),
        format!("📋 **Total Resources**: {}", package.resources.len()),
        "\n**Resources:**".to_string(),
    ];

    if package.resources.is_empty() {
        output.push("- No resources found for this dataset.".to_string());
    }

    for (idx, resource) in package.resources.iter().enumerate() {
        output.push(format!("\n**Resource {}:**", idx + 1));
        output.push(format!("  📝 Name: {}", resource.name.as_deref().unwrap_or("N/A")));
        output.push(format!("  🆔 ID: {}", resource.id.as_deref().unwrap_or("N/A")));
        output.push(format!("  📄 Format: {}", resource.format.as_deref().unwrap_or("N/A")));

        if resource.is_live() {
            output.push("  ✅ Type: Active Datastore (Queryable via API)".to_string());
        } else {
            output.push("  📁 Type: Downloadable File".to_string());
            match resource.download_url() {
                Some(url) => output.push(format!("  🔗 Download URL: {}", url)),
                None => output.push("  ⚠️ Download URL: Not available".to_string()),
            }
        }
    }

    // An untitled dataset is already headed by its name
    let has_title = package.title.as_deref().is_some_and(|title| !title.is_empty());
    let id_hint = if has_title {
        package.name.as_str()
    } else {
        "ID_from_above"
    };
    output.push(format!(
        "\n💡 **Next steps**: query live data with {}(dataset_id=\"{}\"), or read a CSV with {}(csv_url=\"URL_from_above\")",
        tools::QUERY_DATASET,
        id_hint,
        tools::FETCH_CSV
    ));

    output.join("\n")
}

// === Schema ===

pub fn schema_report(title: &str, fields: &[DatastoreField]) -> String {
    let mut output = vec![format!("📋 **Schema for {}** (from active datastore):", title)];
    for field in fields.iter().filter(|f| f.id != INTERNAL_ID_FIELD) {
        output.push(format!("• **{}**: {}", field.id, field.field_type));
    }
    output.push(format!(
        "\n💡 **Usage**: Copy exact field names for filtering with {}()",
        tools::QUERY_DATASET
    ));
    output.join("\n")
}

pub fn schema_empty(title: &str) -> String {
    format!(
        "⚠️ Schema information (fields) is empty for the active datastore of dataset: {}. Try {}() to inspect the dataset's resources.",
        title,
        tools::DATASET_DETAILS
    )
}

/// No datastore, but downloadable tables exist
pub fn schema_static(title: &str, dataset_id: &str, files: &[&Resource]) -> String {
    let mut formats: Vec<String> = Vec::new();
    for resource in files {
        let label = format_label(resource);
        if !formats.contains(&label) {
            formats.push(label);
        }
    }
    format!(
        "📁 Dataset '{}' does not have an active datastore, so an API-based schema is not available. \
         It appears to have downloadable resources ({}). For these files, the schema is typically in the header row or sheet structure. \
         Find the download links with {}(dataset_id=\"{}\") and read the header with {}().",
        title,
        formats.join(", "),
        tools::DATASET_DETAILS,
        dataset_id,
        tools::FETCH_CSV
    )
}

pub fn schema_unavailable(title: &str, dataset_id: &str) -> String {
    format!(
        "⚠️ Dataset '{}' does not have an active datastore, and no downloadable resources were found. \
         An API-based schema is not available. Use {}(dataset_id=\"{}\") to inspect available resources.",
        title,
        tools::DATASET_DETAILS,
        dataset_id
    )
}

pub fn schema_error(dataset_id: &str, err: &TorontoDataError) -> String {
    format!(
        "❌ Error fetching schema for active datastore of dataset: {}. Error: {}",
        dataset_id, err
    )
}

// === Query ===

fn access_hint(resource: &Resource, url: &str) -> String {
    if resource.format_upper() == "CSV" {
        format!("fetch its content with {}(csv_url=\"{}\")", tools::FETCH_CSV, url)
    } else {
        "download manually from the URL above and open it in a spreadsheet tool".to_string()
    }
}

pub fn query_outcome(dataset_id: &str, title: &str, outcome: &QueryOutcome<'_>) -> String {
    match outcome {
        QueryOutcome::Records(result) => {
            let shown = result.records.len() as u64;
            let mut output = vec![match result.total {
                Some(total) => format!(
                    "📊 **Query Results for {}** (showing {} of {} matching records):",
                    title,
                    thousands(shown),
                    thousands(total)
                ),
                None => format!("📊 **Query Results for {}:**", title),
            }];
            push_records(&mut output, &result.records);
            output.push(format!(
                "\n💡 **Next steps**: refine with filters, sort or fields in {}(dataset_id=\"{}\", ...); check exact field names with {}(dataset_id=\"{}\")",
                tools::QUERY_DATASET,
                dataset_id,
                tools::DATASET_SCHEMA,
                dataset_id
            ));
            output.join("\n")
        }
        QueryOutcome::NoData => format!(
            "🔍 No data found in the active datastore for dataset: {} with the given parameters.\n\
             💡 Loosen the filters, or check exact values with {}(dataset_id=\"{}\", user_question=\"...\")",
            dataset_id,
            tools::SMART_DATA_HELPER,
            dataset_id
        ),
        QueryOutcome::FilteringError(message) => format!(
            "❌ **Filtering Error**: {}\n\n\
             💡 **Quick Fix**:\n\
             1. Get correct field names: {}(dataset_id=\"{}\")\n\
             2. Use exact field names in filters (case-sensitive)\n\
             3. Or try: {}(dataset_id=\"{}\", user_question=\"your question\")",
            message,
            tools::DATASET_SCHEMA,
            dataset_id,
            tools::SMART_DATA_HELPER,
            dataset_id
        ),
        QueryOutcome::QueryError(message) => format!(
            "❌ Error querying dataset {}: {}\n💡 Check the dataset's resources with {}(dataset_id=\"{}\")",
            dataset_id,
            message,
            tools::DATASET_DETAILS,
            dataset_id
        ),
        QueryOutcome::StaticSingle(resource) => {
            let url = resource.download_url().unwrap_or_default();
            format!(
                "📁 This dataset ('{}') does not have a queryable API (active datastore). \
                 A single {} file resource was found:\n\
                 📝 **Resource Name**: {}\n\
                 🔗 **Download URL**: {}\n\
                 💡 **Access Method**: {}\n\
                 💡 **Note**: API-based filtering, field selection, sorting, and limits are not applicable to this file.",
                title,
                format_label(resource),
                resource.name.as_deref().unwrap_or(dataset_id),
                url,
                access_hint(resource, url)
            )
        }
        QueryOutcome::StaticMultiple { csv, xls } => format!(
            "📁 This dataset ('{}') does not have a queryable API (active datastore) \
             but offers multiple downloadable resources ({} CSV, {} XLS/XLSX files). \
             To select a specific file (e.g., for a particular year), call {}(dataset_id=\"{}\") \
             to list all available files and their download URLs. \
             For CSV files, use {}() to get content. For XLS/XLSX files, download manually.",
            title,
            csv,
            xls,
            tools::DATASET_DETAILS,
            dataset_id,
            tools::FETCH_CSV
        ),
        QueryOutcome::NoneFound => format!(
            "⚠️ No active datastore or downloadable resource found for dataset: {}. \
             Use {}(dataset_id=\"{}\") to see all available resources and their formats.",
            dataset_id,
            tools::DATASET_DETAILS,
            dataset_id
        ),
    }
}

// === Dataset lookup failures shared by several operations ===

pub fn dataset_error(dataset_id: &str, err: &TorontoDataError) -> String {
    format!(
        "❌ Error fetching dataset details for: {}. Error: {}\n💡 Check the id with {}(query=\"...\")",
        dataset_id,
        err,
        tools::SEARCH_DATASETS
    )
}

// === Stats ===

pub fn stats_header(title: &str, resource_count: usize) -> Vec<String> {
    vec![
        format!("📈 **Statistics for {}:**", title),
        format!("📋 Total resources listed: {}", resource_count),
    ]
}

pub fn stats_live(probe: &DatastoreSearchResult) -> Vec<String> {
    let total = probe
        .total
        .map(thousands)
        .unwrap_or_else(|| "N/A".to_string());
    let fields: Vec<&DatastoreField> = probe.visible_fields().collect();

    let mut output = vec![
        format!("✅ **Active Datastore Record Count**: {}", total),
        format!("📋 **Active Datastore Field Count**: {}", fields.len()),
    ];
    if fields.is_empty() {
        output.push("⚠️ No fields found in the active datastore.".to_string());
    } else {
        output.push("\n**Active Datastore Fields:**".to_string());
        for field in fields {
            output.push(format!("• {}: {}", field.id, field.field_type));
        }
    }
    output
}

pub fn stats_static(files: &[&Resource]) -> Vec<String> {
    let mut output = vec![
        "📁 No active datastore found for this dataset.".to_string(),
        "   Therefore, record count and field list from an API datastore are not available."
            .to_string(),
    ];
    if files.is_empty() {
        output.push("⚠️ No downloadable resources (CSV/XLS/XLSX) found for manual inspection.".to_string());
        return output;
    }
    output.push(
        "\n**Downloadable Resources Found** (download and inspect manually for record count/schema):"
            .to_string(),
    );
    for resource in files {
        output.push(format!(
            "• Name: {}, Format: {}",
            resource.name.as_deref().unwrap_or("N/A"),
            format_label(resource)
        ));
        if let Some(url) = resource.download_url() {
            output.push(format!("  URL: {}", url));
        }
    }
    output
}

pub fn stats_footer(dataset_id: &str) -> String {
    format!(
        "\n💡 **Next steps**: sample the data with {}(dataset_id=\"{}\", user_question=\"...\")",
        tools::SMART_DATA_HELPER,
        dataset_id
    )
}

// === Smart helper ===

pub fn helper_not_found(dataset_id: &str) -> String {
    format!(
        "❌ Error: Could not find dataset '{}'. Try searching again with {}().",
        dataset_id,
        tools::SEARCH_DATASETS
    )
}

/// Sections for a live dataset: fields, total and sample rows
pub fn helper_live(
    fields: &[DatastoreField],
    sample: &DatastoreSearchResult,
    limit: u32,
) -> Vec<String> {
    let names = field_names(fields);
    let mut output = vec![
        "✅ **Type**: API Data (queryable)".to_string(),
        format!("📋 **Available fields**: {}", names),
        format!("📈 **Total records**: {}", thousands(sample.total.unwrap_or(0))),
        format!(
            "📄 **Sample data** (showing {} records):",
            sample.records.len().min(limit as usize)
        ),
    ];

    if sample.records.is_empty() {
        output.push("⚠️ No records found in this dataset.".to_string());
        return output;
    }

    push_records(&mut output, &sample.records);
    output.push(format!(
        "\n💡 **Next steps for filtering/sorting**: Use {}() with:",
        tools::QUERY_DATASET
    ));
    output.push("   • filters={\"field_name\": \"value\"}".to_string());
    output.push("   • sort=\"field_name asc\" or \"field_name desc\"".to_string());
    output.push(format!("   • Available fields: {}", names));
    output
}

/// Sections for a dataset without datastore. `preview` is the head of the
/// only file when that file is a CSV.
pub fn helper_static(
    dataset_id: &str,
    files: &[&Resource],
    preview: Option<(&Resource, String)>,
) -> Vec<String> {
    let mut output = vec!["📁 **Type**: Downloadable Files".to_string()];

    if files.is_empty() {
        output.push(format!(
            "⚠️ No downloadable files found. Check {}(dataset_id=\"{}\") for other resource types.",
            tools::DATASET_DETAILS,
            dataset_id
        ));
        return output;
    }

    output.push(format!("📊 **Found {} downloadable file(s):**", files.len()));
    for (i, resource) in files.iter().enumerate() {
        output.push(format!(
            "  {}. {} ({})",
            i + 1,
            resource.name.as_deref().unwrap_or("Unknown"),
            format_label(resource)
        ));
        if let Some(url) = resource.download_url() {
            output.push(format!("     URL: {}", url));
        }
    }

    if let Some((resource, content)) = preview {
        let url = resource.download_url().unwrap_or_default();
        output.push(format!(
            "\n🔄 **Auto-fetching sample data from**: {}",
            resource.name.as_deref().unwrap_or("Unknown")
        ));
        output.push("📄 **Sample CSV content**:".to_string());
        output.push(content);
        output.push(format!(
            "\n💡 **To get more data**: Use {}(csv_url=\"{}\", max_lines=100)",
            tools::FETCH_CSV,
            url
        ));
        return output;
    }

    output.push("\n💡 **How to access the data:**".to_string());
    let (csv, xls) = crate::classifier::format_counts(files);
    if csv > 0 {
        output.push(format!(
            "   • **For CSV files**: Use {}(csv_url=\"URL_of_specific_file\")",
            tools::FETCH_CSV
        ));
    }
    if xls > 0 {
        output.push("   • **For XLS/XLSX files**: Download manually from the URLs above".to_string());
    }
    output.push(format!(
        "   • **See all details**: Use {}(dataset_id=\"{}\") to see all resource details",
        tools::DATASET_DETAILS,
        dataset_id
    ));
    output
}

pub fn helper_footer(question: &str) -> Vec<String> {
    vec![
        format!("\n🎯 **For your question**: \"{}\"", question),
        "\n💡 **Need more specific data?**".to_string(),
        "   • **If you need exact matches**: Web search can help find precise names, IDs, or identifiers".to_string(),
        format!(
            "   • **For filtering**: Use {}() with exact field names from the schema above",
            tools::QUERY_DATASET
        ),
        "   • **For context**: Combine this official data with web search for recent news or additional details".to_string(),
        "\nThe data above should help answer your question. If you need specific filtering or more data, use the suggested next steps!".to_string(),
    ]
}

// === Search and listing ===

pub fn search_report(query: &str, result: &PackageSearchResult) -> String {
    if result.results.is_empty() {
        return format!(
            "🔍 No datasets found for '{}'. Try broader terms like 'permits', 'inspections', 'parks', 'traffic', or 'budget', or browse {}().",
            query,
            tools::POPULAR_DATASETS
        );
    }

    let mut output = vec![format!(
        "🔍 **Found {} Toronto datasets for '{}':**\n",
        result.results.len(),
        query
    )];
    for (i, package) in result.results.iter().enumerate() {
        output.push(format!("**{}. {}**", i + 1, package.display_title()));
        output.push(format!("   📋 ID: `{}`", package.name));
        if let Some(notes) = package.notes.as_deref().filter(|n| !n.is_empty()) {
            output.push(format!("   📝 Description: {}", truncate_chars(notes, 150)));
        }
        if !package.tags.is_empty() {
            let tags: Vec<&str> = package.tags.iter().take(5).map(|t| t.name.as_str()).collect();
            output.push(format!("   🏷️ Tags: {}", tags.join(", ")));
        }
        output.push(String::new());
    }
    output.push(next_step_helper());
    output.join("\n")
}

pub fn search_error(query: &str, err: &TorontoDataError) -> String {
    format!(
        "❌ Error searching datasets with query: {} ({})\n💡 Try again later, or browse {}()",
        query,
        err,
        tools::POPULAR_DATASETS
    )
}

pub fn list_report(packages: &[Package]) -> String {
    let mut output = vec!["📋 **All Available Toronto Open Datasets:**\n".to_string()];
    for package in packages {
        output.push(format!("**{}** (`{}`)", package.display_title(), package.name));
        if let Some(notes) = package.notes.as_deref().filter(|n| !n.is_empty()) {
            output.push(format!("   📝 {}", truncate_chars(notes, 200)));
        }
        output.push(String::new());
    }
    output.push(next_step_helper());
    output.join("\n")
}

pub fn list_error(err: &TorontoDataError) -> String {
    format!(
        "❌ Error fetching datasets: {}\n💡 Try {}() for a curated list",
        err,
        tools::POPULAR_DATASETS
    )
}

fn next_step_helper() -> String {
    format!(
        "\n🚀 **Next Step**: Use {}(dataset_id=\"ID_from_above\", user_question=\"what you want to know\") to get the data!",
        tools::SMART_DATA_HELPER
    )
}

// === File fetch ===

pub fn fetched_text(fetched: &FetchedText, max_lines: usize) -> String {
    if fetched.is_empty() {
        return "⚠️ File appears to be empty or no content could be read.".to_string();
    }
    if fetched.truncated {
        format!(
            "📄 **First {} lines of CSV data:**\n{}\n\n... (file truncated, more data exists)\n💡 Raise max_lines in {}() to read further",
            max_lines,
            fetched.text(),
            tools::FETCH_CSV
        )
    } else {
        format!(
            "📄 **CSV data (all {} lines):**\n{}",
            fetched.lines.len(),
            fetched.text()
        )
    }
}

pub fn fetch_error(url: &str, err: &TorontoDataError) -> String {
    match err {
        TorontoDataError::InvalidUrl { .. } => {
            "❌ Error: Invalid URL. Must start with http:// or https://".to_string()
        }
        TorontoDataError::HttpStatus { status, reason } => format!(
            "❌ Error: HTTP Error {} when trying to fetch the CSV: {}",
            status, reason
        ),
        TorontoDataError::Timeout { .. } => format!(
            "❌ Error: Timeout when trying to fetch the CSV from {}. The server took too long to respond.",
            url
        ),
        TorontoDataError::Transport(reason) => format!(
            "❌ Error: URL Error when trying to fetch the CSV: {} (this might happen with invalid URLs or network issues)",
            reason
        ),
        TorontoDataError::Decode { line } => format!(
            "❌ Error: Could not decode line {} using utf-8 or latin-1 encoding.",
            line
        ),
        other => format!(
            "❌ Error: An unexpected error occurred while fetching CSV: {}",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toronto_ckan::models::Organization;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(50000), "50,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("café au lait", 4), "café...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn records_hide_internal_id() {
        let lines = record_lines(&record(json!({
            "_id": 7,
            "establishment_name": "Joe's Pizza",
            "score": 85,
            "closed": null
        })));
        assert_eq!(
            lines,
            vec![
                "  • establishment_name: Joe's Pizza",
                "  • score: 85",
                "  • closed: null"
            ]
        );
    }

    #[test]
    fn dataset_title_appears_once() {
        let package = Package {
            name: "dinesafe".into(),
            title: Some("DineSafe Restaurant Inspections".into()),
            notes: Some("Inspection results".into()),
            organization: Some(Organization {
                title: Some("Toronto Public Health".into()),
                ..Organization::default()
            }),
            resources: vec![
                Resource {
                    id: Some("r1".into()),
                    name: Some("API Resource".into()),
                    format: Some("CSV".into()),
                    datastore_active: Some(true),
                    ..Resource::default()
                },
                Resource {
                    id: Some("r2".into()),
                    name: Some("CSV Resource".into()),
                    format: Some("CSV".into()),
                    url: Some("https://example.org/a.csv".into()),
                    ..Resource::default()
                },
            ],
            ..Package::default()
        };

        let report = dataset_details(&package);
        assert_eq!(report.matches("DineSafe Restaurant Inspections").count(), 1);
        assert!(report.contains("Toronto Public Health"));
        assert!(report.contains("Active Datastore"));
        assert!(report.contains("Downloadable File"));
        assert!(report.contains("https://example.org/a.csv"));
    }

    #[test]
    fn untitled_dataset_name_appears_once() {
        let package = Package {
            name: "zoning-changes".into(),
            title: None,
            resources: vec![Resource {
                id: Some("r1".into()),
                name: Some("2021".into()),
                format: Some("XLSX".into()),
                url: Some("https://example.org/2021.xlsx".into()),
                ..Resource::default()
            }],
            ..Package::default()
        };

        let report = dataset_details(&package);
        assert_eq!(report.matches("zoning-changes").count(), 1);
        assert!(report.contains("**Dataset**: zoning-changes"));
        assert!(report.contains("dataset_id=\"ID_from_above\""));
    }

    #[test]
    fn static_single_hint_depends_on_format() {
        let csv = Resource {
            name: Some("budget_2023.csv".into()),
            format: Some("csv".into()),
            url: Some("https://example.org/budget.csv".into()),
            ..Resource::default()
        };
        let report = query_outcome("budget-data", "Budget", &QueryOutcome::StaticSingle(&csv));
        assert!(report.contains("budget_2023.csv"));
        assert!(report.contains("https://example.org/budget.csv"));
        assert!(report.contains(tools::FETCH_CSV));

        let xlsx = Resource {
            name: Some("budget.xlsx".into()),
            format: Some("XLSX".into()),
            url: Some("https://example.org/budget.xlsx".into()),
            ..Resource::default()
        };
        let report = query_outcome("budget-data", "Budget", &QueryOutcome::StaticSingle(&xlsx));
        assert!(report.contains("download manually"));
        assert!(!report.contains(tools::FETCH_CSV));
    }

    #[test]
    fn filtering_error_points_at_schema() {
        let report = query_outcome(
            "dinesafe",
            "DineSafe",
            &QueryOutcome::FilteringError("Field \"x\" does not exist".into()),
        );
        assert!(report.contains("Filtering Error"));
        assert!(report.contains("Quick Fix"));
        assert!(report.contains(tools::DATASET_SCHEMA));

        let report = query_outcome(
            "dinesafe",
            "DineSafe",
            &QueryOutcome::QueryError("HTTP Error: 500".into()),
        );
        assert!(!report.contains("Filtering Error"));
    }

    #[test]
    fn fetched_text_variants() {
        let empty = FetchedText {
            lines: vec![],
            truncated: false,
        };
        assert!(fetched_text(&empty, 50).contains("appears to be empty"));

        let complete = FetchedText {
            lines: vec!["a,b".into(), "1,2".into()],
            truncated: false,
        };
        let report = fetched_text(&complete, 50);
        assert!(report.contains("all 2 lines"));
        assert!(!report.contains("truncated"));

        let truncated = FetchedText {
            lines: vec!["a,b".into(), "1,2".into()],
            truncated: true,
        };
        let report = fetched_text(&truncated, 2);
        assert!(report.contains("First 2 lines"));
        assert!(report.contains("more data exists"));
    }

    #[test]
    fn fetch_errors_are_distinct() {
        let invalid = fetch_error("ftp://x", &TorontoDataError::invalid_url("ftp://x"));
        assert!(invalid.contains("Invalid URL"));
        assert!(invalid.contains("Must start with http"));

        let status = fetch_error(
            "https://x",
            &TorontoDataError::HttpStatus {
                status: 404,
                reason: "Not Found".into(),
            },
        );
        assert!(status.contains("HTTP Error 404"));

        let decode = fetch_error("https://x", &TorontoDataError::Decode { line: 3 });
        assert!(decode.contains("line 3"));
    }
}
