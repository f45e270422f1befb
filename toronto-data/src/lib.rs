//! Discovery and retrieval over the City of Toronto open data catalog.
//!
//! A dataset is either served by a live datastore table, which can be
//! filtered, sorted and projected, or only by downloadable CSV/Excel files.
//! [`classifier`] makes that call, [`dispatcher`] and [`schema`] act on it,
//! [`fetcher`] reads the head of remote files, and [`format`] turns every
//! outcome into a text report. [`TorontoDataClient`] bundles them into the
//! operations exposed to agents.

pub use toronto_ckan as ckan;

pub mod classifier;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod guide;
pub mod schema;
pub mod tools;

pub use client::TorontoDataClient;
pub use config::TorontoDataConfig;
pub use dispatcher::QuerySpec;
pub use error::{Result, TorontoDataError};
