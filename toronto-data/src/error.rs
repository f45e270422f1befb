use toronto_ckan::CkanError;
use thiserror::Error;

/// Errors that can occur when using the Toronto data client
///
/// None of these escape the public operations of [`crate::TorontoDataClient`];
/// each operation renders them into its text report.
#[derive(Error, Debug)]
pub enum TorontoDataError {
    /// Error from the underlying CKAN API
    #[error("{0}")]
    Ckan(#[from] CkanError),

    /// The datastore probe succeeded but reported no fields
    #[error("No fields reported for datastore resource {resource_id}")]
    NoFields { resource_id: String },

    /// URL rejected before any request was made
    #[error("Invalid URL: {url}. Must start with http:// or https://")]
    InvalidUrl { url: String },

    /// File server answered with a non-success status
    #[error("HTTP Error {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// File server did not answer within the fetch timeout
    #[error("Timeout after {timeout_secs}s fetching {url}")]
    Timeout { url: String, timeout_secs: u64 },

    /// Connection, DNS or mid-body failure while fetching a file
    #[error("URL Error: {0}")]
    Transport(String),

    /// A fetched line is neither UTF-8 nor Latin-1 text
    #[error("Could not decode line {line} using utf-8 or latin-1 encoding")]
    Decode { line: usize },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl TorontoDataError {
    /// Create a new configuration error
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid URL error
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

/// Type alias for Results using TorontoDataError
pub type Result<T> = std::result::Result<T, TorontoDataError>;
