//! Decides how a dataset's data can be reached: through a live datastore
//! resource, or only through downloadable spreadsheet files.

use toronto_ckan::models::Resource;

/// Formats accepted as downloadable tables, compared upper-cased
pub const TABULAR_FORMATS: [&str; 3] = ["CSV", "XLS", "XLSX"];

/// MIME fragments accepted as downloadable tables. Substring match, since the
/// portal mixes `text/csv`, `application/vnd.ms-excel` and
/// `application/vnd.openxmlformats-officedocument.spreadsheetml.sheet`.
pub const TABULAR_MIME_FRAGMENTS: [&str; 3] = ["text/csv", "excel", "spreadsheet"];

/// Whether a resource with this declared format and MIME type is a
/// downloadable table (CSV or Excel).
///
/// ```rust
/// use toronto_data::classifier::is_tabular_download;
///
/// assert!(is_tabular_download("csv", ""));
/// assert!(is_tabular_download("", "application/vnd.ms-excel"));
/// assert!(!is_tabular_download("SHP", "application/zip"));
/// ```
pub fn is_tabular_download(format: &str, mimetype: &str) -> bool {
    let format = format.to_uppercase();
    let mimetype = mimetype.to_lowercase();

    TABULAR_FORMATS.contains(&format.as_str())
        || TABULAR_MIME_FRAGMENTS
            .iter()
            .any(|fragment| mimetype.contains(fragment))
}

/// [`is_tabular_download`] applied to a resource's declared metadata
pub fn is_static_resource(resource: &Resource) -> bool {
    is_tabular_download(
        resource.format.as_deref().unwrap_or_default(),
        resource.mimetype.as_deref().unwrap_or_default(),
    )
}

/// Where a dataset's data lives
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// The first resource flagged as datastore-active
    Live(&'a Resource),
    /// No live resource; the downloadable tables in catalog order, possibly none
    Static(Vec<&'a Resource>),
}

impl<'a> Classification<'a> {
    pub fn live(&self) -> Option<&'a Resource> {
        match self {
            Classification::Live(resource) => Some(resource),
            Classification::Static(_) => None,
        }
    }
}

/// Classify a dataset's resources.
///
/// The first live resource wins even when several exist; the portal is
/// assumed to expose at most one datastore table per dataset. Only when no
/// resource is live are downloadable tables collected.
pub fn classify(resources: &[Resource]) -> Classification<'_> {
    if let Some(live) = resources.iter().find(|resource| resource.is_live()) {
        tracing::debug!(resource_id = ?live.id, "live datastore resource selected");
        return Classification::Live(live);
    }

    let files: Vec<&Resource> = resources
        .iter()
        .filter(|resource| is_static_resource(resource))
        .collect();
    tracing::debug!(count = files.len(), "no live resource, static files collected");
    Classification::Static(files)
}

/// How many of `resources` are CSV and how many XLS/XLSX, by declared format
pub fn format_counts(resources: &[&Resource]) -> (usize, usize) {
    resources
        .iter()
        .fold((0, 0), |(csv, xls), resource| match resource.format_upper().as_str() {
            "CSV" => (csv + 1, xls),
            "XLS" | "XLSX" => (csv, xls + 1),
            _ => (csv, xls),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: &str, format: &str, mimetype: &str, live: Option<bool>) -> Resource {
        Resource {
            id: Some(id.to_string()),
            name: Some(id.to_string()),
            format: Some(format.to_string()),
            mimetype: Some(mimetype.to_string()),
            datastore_active: live,
            url: Some(format!("https://example.org/{id}")),
        }
    }

    #[test]
    fn predicate_matches_formats_case_insensitively() {
        for format in ["CSV", "csv", "Xls", "xlsx"] {
            assert!(is_tabular_download(format, ""), "{format}");
        }
        assert!(!is_tabular_download("JSON", "application/json"));
        assert!(!is_tabular_download("CSVZ", ""));
    }

    #[test]
    fn predicate_matches_mime_substrings() {
        assert!(is_tabular_download("", "TEXT/CSV; charset=utf-8"));
        assert!(is_tabular_download("", "application/vnd.ms-excel"));
        assert!(is_tabular_download(
            "",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ));
        assert!(!is_tabular_download("", "text/plain"));
    }

    #[test]
    fn first_live_resource_wins() {
        let resources = vec![
            resource("file", "CSV", "text/csv", Some(false)),
            resource("live-a", "CSV", "", Some(true)),
            resource("live-b", "CSV", "", Some(true)),
        ];

        let chosen = classify(&resources).live().unwrap();
        assert_eq!(chosen.id.as_deref(), Some("live-a"));
    }

    #[test]
    fn static_pass_keeps_catalog_order_and_skips_other_formats() {
        let resources = vec![
            resource("2023", "CSV", "", None),
            resource("map", "SHP", "application/zip", None),
            resource("2024", "XLSX", "", Some(false)),
            resource("mime-only", "", "application/vnd.ms-excel", None),
        ];

        match classify(&resources) {
            Classification::Static(files) => {
                let ids: Vec<_> = files.iter().filter_map(|r| r.id.as_deref()).collect();
                assert_eq!(ids, vec!["2023", "2024", "mime-only"]);
            }
            other => panic!("expected static, got {other:?}"),
        }
    }

    #[test]
    fn nothing_matching_is_an_empty_static_set() {
        let resources = vec![resource("geo", "GeoJSON", "application/json", None)];
        assert_eq!(classify(&resources), Classification::Static(vec![]));
        assert_eq!(classify(&[]), Classification::Static(vec![]));
    }

    #[test]
    fn counts_by_declared_format() {
        let a = resource("a", "csv", "", None);
        let b = resource("b", "CSV", "", None);
        let c = resource("c", "XLSX", "", None);
        let d = resource("d", "", "text/csv", None);
        assert_eq!(format_counts(&[&a, &b, &c, &d]), (2, 1));
    }
}
