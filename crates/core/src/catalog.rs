//! The documentation catalog: listing, retrieval and keyword search over the
//! registry's backing files.
//!
//! File contents are read from disk on every call; nothing is cached.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::DocError;
use crate::registry::{DocKey, DocumentEntry, OVERVIEW_ID, Registry, Sdk, SdkFilter, Topic};
use crate::search::{FoldedText, Query, SearchResponse, SearchResult};

/// Listing entry returned by [`DocCatalog::list_documents`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocSummary {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub sdk: String,
    pub topic: String,
}

impl DocSummary {
    fn from_entry(entry: &DocumentEntry) -> Self {
        let (sdk, topic) = match entry.key {
            DocKey::Sdk { sdk, topic } => (sdk.as_str(), topic.as_str()),
            DocKey::Overview => (OVERVIEW_ID, OVERVIEW_ID),
        };
        Self {
            id: entry.id(),
            uri: entry.key.uri(),
            title: entry.title.clone(),
            sdk: sdk.to_owned(),
            topic: topic.to_owned(),
        }
    }
}

/// A document read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: DocKey,
    pub title: String,
    pub content: String,
}

/// Registry plus the directory its relative paths are resolved against.
#[derive(Debug, Clone)]
pub struct DocCatalog {
    root: PathBuf,
    registry: Registry,
}

impl DocCatalog {
    pub fn new(root: impl Into<PathBuf>, registry: Registry) -> Self {
        Self {
            root: root.into(),
            registry,
        }
    }

    /// Catalog over [`Registry::builtin`].
    pub fn builtin(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Registry::builtin())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn path_of(&self, entry: &DocumentEntry) -> PathBuf {
        self.root.join(&entry.relative_path)
    }

    /// Every entry matching `filter`, plus the overview document.
    pub fn list_documents(&self, filter: SdkFilter) -> Vec<DocSummary> {
        self.registry
            .entries()
            .filter(|entry| entry.sdk().is_none_or(|sdk| filter.includes(sdk)))
            .map(DocSummary::from_entry)
            .collect()
    }

    pub async fn get_document(&self, key: DocKey) -> Result<Document, DocError> {
        let entry = self
            .registry
            .get(key)
            .ok_or_else(|| DocError::NotFound { id: key.id() })?;
        let content = self.read_entry(entry).await?;
        Ok(Document {
            key,
            title: entry.title.clone(),
            content,
        })
    }

    pub async fn get_document_by_id(&self, id: &str) -> Result<Document, DocError> {
        self.get_document(id.parse()?).await
    }

    /// Resolve a `(sdk, topic)` request. The sdk is not looked at for the
    /// overview topic, so any value is accepted there; every other topic
    /// needs a known sdk.
    pub async fn resolve_topic(&self, sdk: Option<&str>, topic: &str) -> Result<Document, DocError> {
        if topic == OVERVIEW_ID {
            return self.get_document(DocKey::Overview).await;
        }

        let sdk: Sdk = sdk
            .filter(|sdk| !sdk.is_empty())
            .ok_or_else(|| {
                DocError::InvalidRequest(
                    "SDK type is required when topic is not \"overview\"".to_string(),
                )
            })?
            .parse()?;

        let topic: Topic = topic.parse().map_err(|_| {
            DocError::InvalidRequest(format!("Unknown documentation: {sdk} SDK - {topic}"))
        })?;

        self.get_document(DocKey::new(sdk, topic)).await
    }

    /// Score every candidate document against `query`.
    ///
    /// Candidates are scanned sdk-major then in topic order; files that cannot
    /// be read are skipped.
    pub async fn search(
        &self,
        query: &str,
        filter: SdkFilter,
        topic: Option<Topic>,
    ) -> SearchResponse {
        let query = Query::new(query);
        let topics = match topic {
            Some(topic) => vec![topic],
            None => self.registry.topics(),
        };

        let mut results = Vec::new();
        for &sdk in filter.sdks() {
            for &topic in &topics {
                let Some(entry) = self.registry.get(DocKey::new(sdk, topic)) else {
                    continue;
                };
                let content = match self.read_entry(entry).await {
                    Ok(content) => content,
                    Err(err) => {
                        tracing::debug!("Skipping {} during search: {}", entry.id(), err);
                        continue;
                    }
                };

                let folded = FoldedText::new(&content);
                let relevance = query.score(&entry.title, &folded);
                if relevance == 0 {
                    continue;
                }

                results.push(SearchResult {
                    id: entry.id(),
                    uri: entry.key.uri(),
                    title: entry.title.clone(),
                    snippet: query.snippet(&content, &folded),
                    relevance,
                });
            }
        }

        let response = SearchResponse::ranked(query.raw(), results);
        tracing::debug!(
            "Search for '{}' ({} words): {} matches",
            query.raw(),
            query.words().len(),
            response.total
        );
        response
    }

    /// Entries whose backing file currently exists, in registry order.
    pub async fn available_documents(&self) -> Vec<&DocumentEntry> {
        let mut available = Vec::new();
        for entry in self.registry.entries() {
            match tokio::fs::try_exists(self.path_of(entry)).await {
                Ok(true) => available.push(entry),
                Ok(false) => {}
                Err(err) => tracing::debug!("Cannot check {}: {}", entry.id(), err),
            }
        }
        available
    }

    /// Read the document addressed by an `sdk-doc://<id>` URI.
    pub async fn read_resource(&self, uri: &str) -> Result<Document, DocError> {
        self.get_document(DocKey::from_uri(uri)?).await
    }

    async fn read_entry(&self, entry: &DocumentEntry) -> Result<String, DocError> {
        let path = self.path_of(entry);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DocError::from_read(entry.id(), path, source))
    }
}
