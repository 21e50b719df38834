//! Static registry of the documents served by the catalog.
//!
//! Every document is addressed by a [`DocKey`]: either the single overview
//! document or an `(sdk, topic)` pair. The string identifier used on the wire
//! (`js-files`, `dart-api-rules`, `overview`) is always derived from the key,
//! never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DocError;

/// URI scheme under which documents are exposed as resources.
pub const URI_SCHEME: &str = "sdk-doc://";

/// Identifier of the overview document.
pub const OVERVIEW_ID: &str = "overview";

/// Older identifier of the overview document, still accepted when parsing.
const LEGACY_OVERVIEW_ID: &str = "sdk-overview";

const OVERVIEW_FILE: &str = "SDK_DOCUMENTATION.md";
const OVERVIEW_TITLE: &str = "SDK Documentation Overview";

/// Client library a document belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Sdk {
    Js,
    Dart,
}

impl Sdk {
    pub const ALL: [Self; 2] = [Self::Js, Self::Dart];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Dart => "dart",
        }
    }

    /// Directory (relative to the docs root) holding this SDK's files.
    fn dir(self) -> &'static str {
        match self {
            Self::Js => "js-sdk",
            Self::Dart => "dart-sdk",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Js => "JS SDK",
            Self::Dart => "Dart SDK",
        }
    }
}

impl fmt::Display for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sdk {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "js" => Ok(Self::Js),
            "dart" => Ok(Self::Dart),
            other => Err(DocError::InvalidRequest(format!("Unknown SDK type: {other}"))),
        }
    }
}

/// Which SDKs a listing or search covers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SdkFilter {
    Js,
    Dart,
    #[default]
    Both,
}

impl SdkFilter {
    /// SDKs selected by this filter, in scan order.
    pub fn sdks(self) -> &'static [Sdk] {
        match self {
            Self::Js => &[Sdk::Js],
            Self::Dart => &[Sdk::Dart],
            Self::Both => &Sdk::ALL,
        }
    }

    pub fn includes(self, sdk: Sdk) -> bool {
        self.sdks().contains(&sdk)
    }
}

impl From<Sdk> for SdkFilter {
    fn from(sdk: Sdk) -> Self {
        match sdk {
            Sdk::Js => Self::Js,
            Sdk::Dart => Self::Dart,
        }
    }
}

impl FromStr for SdkFilter {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(Self::Both),
            other => other.parse::<Sdk>().map(Self::from),
        }
    }
}

/// Documentation topic shared by both SDKs. Declaration order is registry order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    Collections,
    ApiRules,
    Authentication,
    Files,
    FileApi,
    Relations,
    ApiRecords,
    Realtime,
    CollectionApi,
    LogsApi,
    CronsApi,
    BackupsApi,
    HealthApi,
}

impl Topic {
    pub const ALL: [Self; 13] = [
        Self::Collections,
        Self::ApiRules,
        Self::Authentication,
        Self::Files,
        Self::FileApi,
        Self::Relations,
        Self::ApiRecords,
        Self::Realtime,
        Self::CollectionApi,
        Self::LogsApi,
        Self::CronsApi,
        Self::BackupsApi,
        Self::HealthApi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::ApiRules => "api-rules",
            Self::Authentication => "authentication",
            Self::Files => "files",
            Self::FileApi => "file-api",
            Self::Relations => "relations",
            Self::ApiRecords => "api-records",
            Self::Realtime => "realtime",
            Self::CollectionApi => "collection-api",
            Self::LogsApi => "logs-api",
            Self::CronsApi => "crons-api",
            Self::BackupsApi => "backups-api",
            Self::HealthApi => "health-api",
        }
    }

    /// Markdown file backing this topic inside an SDK directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Collections => "COLLECTIONS.md",
            Self::ApiRules => "API_RULES_AND_FILTERS.md",
            Self::Authentication => "AUTHENTICATION.md",
            Self::Files => "FILES.md",
            Self::FileApi => "FILE_API.md",
            Self::Relations => "RELATIONS.md",
            Self::ApiRecords => "API_RECORDS.md",
            Self::Realtime => "REALTIME.md",
            Self::CollectionApi => "COLLECTION_API.md",
            Self::LogsApi => "LOGS_API.md",
            Self::CronsApi => "CRONS_API.md",
            Self::BackupsApi => "BACKUPS_API.md",
            Self::HealthApi => "HEALTH_API.md",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Collections => "Collections",
            Self::ApiRules => "API Rules and Filters",
            Self::Authentication => "Authentication",
            Self::Files => "Files",
            Self::FileApi => "File API",
            Self::Relations => "Relations",
            Self::ApiRecords => "API Records",
            Self::Realtime => "Realtime",
            Self::CollectionApi => "Collection API",
            Self::LogsApi => "Logs API",
            Self::CronsApi => "Crons API",
            Self::BackupsApi => "Backups API",
            Self::HealthApi => "Health API",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| DocError::InvalidRequest(format!("Unknown documentation topic: {s}")))
    }
}

/// Structured registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocKey {
    Sdk { sdk: Sdk, topic: Topic },
    Overview,
}

impl DocKey {
    pub fn new(sdk: Sdk, topic: Topic) -> Self {
        Self::Sdk { sdk, topic }
    }

    /// Wire identifier: `<sdk>-<topic>` or `overview`.
    pub fn id(self) -> String {
        match self {
            Self::Sdk { sdk, topic } => format!("{sdk}-{topic}"),
            Self::Overview => OVERVIEW_ID.to_string(),
        }
    }

    pub fn uri(self) -> String {
        format!("{URI_SCHEME}{}", self.id())
    }

    pub fn sdk(self) -> Option<Sdk> {
        match self {
            Self::Sdk { sdk, .. } => Some(sdk),
            Self::Overview => None,
        }
    }

    pub fn topic(self) -> Option<Topic> {
        match self {
            Self::Sdk { topic, .. } => Some(topic),
            Self::Overview => None,
        }
    }

    /// Parse a resource URI of the form `sdk-doc://<id>`.
    pub fn from_uri(uri: &str) -> Result<Self, DocError> {
        let id = uri
            .strip_prefix(URI_SCHEME)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DocError::InvalidRequest(format!("Invalid resource URI: {uri}")))?;
        id.parse().map_err(|_| {
            DocError::InvalidRequest(format!("Unknown documentation resource: {id}"))
        })
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for DocKey {
    type Err = DocError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        if id == OVERVIEW_ID || id == LEGACY_OVERVIEW_ID {
            return Ok(Self::Overview);
        }
        let (sdk, topic) = id
            .split_once('-')
            .ok_or_else(|| DocError::InvalidRequest(format!("Malformed document id: {id}")))?;
        Ok(Self::new(sdk.parse()?, topic.parse()?))
    }
}

/// Registry entry describing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub key: DocKey,
    pub title: String,
    /// Location of the backing file, relative to the docs root.
    pub relative_path: PathBuf,
}

impl DocumentEntry {
    pub fn new(key: DocKey, title: impl Into<String>, relative_path: impl Into<PathBuf>) -> Self {
        Self {
            key,
            title: title.into(),
            relative_path: relative_path.into(),
        }
    }

    /// Entry for `topic` under `sdk` with the conventional title and path.
    pub fn for_topic(sdk: Sdk, topic: Topic) -> Self {
        Self::new(
            DocKey::new(sdk, topic),
            format!("{} - {}", topic.label(), sdk.label()),
            PathBuf::from(sdk.dir()).join(topic.file_name()),
        )
    }

    pub fn overview() -> Self {
        Self::new(DocKey::Overview, OVERVIEW_TITLE, OVERVIEW_FILE)
    }

    pub fn id(&self) -> String {
        self.key.id()
    }

    pub fn sdk(&self) -> Option<Sdk> {
        self.key.sdk()
    }

    pub fn topic(&self) -> Option<Topic> {
        self.key.topic()
    }
}

/// Immutable mapping from [`DocKey`] to [`DocumentEntry`].
///
/// Iteration follows key order: every JS topic, every Dart topic, then the
/// overview document.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<DocKey, DocumentEntry>,
}

impl Registry {
    /// The full set of documents shipped with the server.
    pub fn builtin() -> Self {
        Sdk::ALL
            .into_iter()
            .flat_map(|sdk| Topic::ALL.into_iter().map(move |topic| (sdk, topic)))
            .map(|(sdk, topic)| DocumentEntry::for_topic(sdk, topic))
            .chain(std::iter::once(DocumentEntry::overview()))
            .collect()
    }

    pub fn get(&self, key: DocKey) -> Option<&DocumentEntry> {
        self.entries.get(&key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.values()
    }

    pub fn overview(&self) -> Option<&DocumentEntry> {
        self.get(DocKey::Overview)
    }

    /// Distinct topics present in the registry, in registry order.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.entries.keys().filter_map(|key| key.topic()).collect();
        topics.sort_unstable();
        topics.dedup();
        topics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DocumentEntry> for Registry {
    fn from_iter<I: IntoIterator<Item = DocumentEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|entry| (entry.key, entry)).collect(),
        }
    }
}
