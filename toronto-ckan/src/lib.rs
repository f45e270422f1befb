pub mod models;
pub mod client;

// Re-export the ergonomic client and configuration for easy access
pub use client::{
    ApiResult, CkanClient, CkanError, Configuration, DatastoreQuery, TORONTO_CKAN_BASE_URL,
};
