//! Catalog of the JS and Dart SDK reference documents.
//!
//! The catalog maps `(sdk, topic)` pairs onto markdown files under a docs
//! root, reads them on demand and ranks them against free-text queries.

pub mod catalog;
pub mod config;
pub mod error;
pub mod registry;
pub mod search;

pub use catalog::{DocCatalog, DocSummary, Document};
pub use config::CatalogConfig;
pub use error::{ConfigError, DocError, ErrorKind};
pub use registry::{DocKey, DocumentEntry, Registry, Sdk, SdkFilter, Topic, URI_SCHEME};
pub use search::{MAX_RESULTS, SearchResponse, SearchResult};
