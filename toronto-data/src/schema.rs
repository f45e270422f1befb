use toronto_ckan::models::{DatastoreField, DatastoreSearchResult};
use toronto_ckan::{CkanClient, DatastoreQuery};

use crate::error::{Result, TorontoDataError};

/// Zero-row `datastore_search`: field metadata and total count, no records.
///
/// Only meaningful for a live resource; callers classify first.
pub async fn probe(ckan: &CkanClient, resource_id: &str) -> Result<DatastoreSearchResult> {
    let query = DatastoreQuery::new(resource_id).with_limit(0);
    Ok(ckan.datastore_search(&query).await?)
}

/// Field list of a live resource.
///
/// A probe that succeeds with no fields is [`TorontoDataError::NoFields`],
/// kept apart from backend failures.
pub async fn inspect(ckan: &CkanClient, resource_id: &str) -> Result<Vec<DatastoreField>> {
    let result = probe(ckan, resource_id).await?;
    if result.fields.is_empty() {
        return Err(TorontoDataError::NoFields {
            resource_id: resource_id.to_string(),
        });
    }
    Ok(result.fields)
}
