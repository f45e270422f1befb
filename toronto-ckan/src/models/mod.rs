use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Standard CKAN action response envelope
///
/// Every action endpoint wraps its payload in this shape. On failure
/// `success` is false and `error` carries a message and an error type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub help: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// A dataset in the catalog (CKAN calls these packages)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub id: Option<String>,
    /// URL-safe identifier, unique within the catalog (e.g. `dinesafe`)
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    /// Resources in catalog order. Order matters for live-resource selection.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
}

impl Package {
    /// The human title, falling back to the dataset name
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A file or datastore table attached to a dataset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Declared format, free text (`CSV`, `csv`, `XLSX`, ...)
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    /// Set when the resource is loaded into the queryable datastore.
    /// The portal sends `null` for many file resources.
    #[serde(default)]
    pub datastore_active: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Resource {
    /// Whether the resource can be queried through `datastore_search`
    pub fn is_live(&self) -> bool {
        self.datastore_active.unwrap_or(false)
    }

    /// Declared format upper-cased, empty when none was declared
    pub fn format_upper(&self) -> String {
        self.format.as_deref().unwrap_or_default().to_uppercase()
    }

    /// Download URL when one is present and non-empty
    pub fn download_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageSearchResult {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Package>,
}

/// Column metadata of a datastore table
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatastoreField {
    pub id: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

/// A single datastore row. Field order follows the server response.
pub type Record = Map<String, Value>;

/// Name of the row id column the datastore adds to every table
pub const INTERNAL_ID_FIELD: &str = "_id";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatastoreSearchResult {
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<DatastoreField>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<Record>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl DatastoreSearchResult {
    /// Fields that are meaningful to a caller, i.e. everything but `_id`
    pub fn visible_fields(&self) -> impl Iterator<Item = &DatastoreField> {
        self.fields
            .iter()
            .filter(|field| field.id != INTERNAL_ID_FIELD)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
