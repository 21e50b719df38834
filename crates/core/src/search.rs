//! Keyword relevance scoring and snippet extraction.
//!
//! Scores are plain integers and part of the public contract:
//!
//! - every whitespace-separated query word adds the number of times it occurs
//!   (as a literal, case-insensitive substring) in the document content;
//! - `+10` when the title contains the whole query;
//! - `+5` when the content contains the whole query as a phrase.

use serde::Serialize;

/// Maximum number of results returned by a search.
pub const MAX_RESULTS: usize = 10;

const TITLE_BOOST: u32 = 10;
const PHRASE_BOOST: u32 = 5;

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;
const FALLBACK_SNIPPET: usize = 300;

/// A single scored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub snippet: String,
    pub relevance: u32,
}

/// Ranked results plus the number of matches before truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total: usize,
}

impl SearchResponse {
    /// Sort by relevance (descending, stable) and keep the top [`MAX_RESULTS`].
    pub fn ranked(query: impl Into<String>, mut results: Vec<SearchResult>) -> Self {
        results.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        let total = results.len();
        results.truncate(MAX_RESULTS);
        Self {
            query: query.into(),
            results,
            total,
        }
    }
}

/// Lowercased text that remembers, for every byte, which character of the
/// original text produced it.
#[derive(Debug)]
pub struct FoldedText {
    text: String,
    origins: Vec<usize>,
}

impl FoldedText {
    pub fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut origins = Vec::with_capacity(original.len());
        for (index, ch) in original.chars().enumerate() {
            for lower in ch.to_lowercase() {
                text.push(lower);
                origins.extend(std::iter::repeat_n(index, lower.len_utf8()));
            }
        }
        Self { text, origins }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Character index in the original text of the first occurrence of `needle`.
    fn find_char_index(&self, needle: &str) -> Option<usize> {
        let byte = self.text.find(needle)?;
        Some(self.origins.get(byte).copied().unwrap_or(self.origins.len()))
    }
}

/// A prepared search query.
#[derive(Debug)]
pub struct Query {
    raw: String,
    phrase: String,
    words: Vec<String>,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        let phrase = FoldedText::new(raw).text;
        let words = phrase.split_whitespace().map(str::to_owned).collect();
        Self {
            raw: raw.to_owned(),
            phrase,
            words,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Relevance of a document; `0` means no match.
    pub fn score(&self, title: &str, content: &FoldedText) -> u32 {
        let content = content.as_str();
        let mut score: u32 = self
            .words
            .iter()
            .map(|word| u32::try_from(content.matches(word.as_str()).count()).unwrap_or(u32::MAX))
            .fold(0, u32::saturating_add);

        if FoldedText::new(title).as_str().contains(&self.phrase) {
            score = score.saturating_add(TITLE_BOOST);
        }
        if content.contains(&self.phrase) {
            score = score.saturating_add(PHRASE_BOOST);
        }
        score
    }

    /// Text around the first occurrence of the whole query, or the start of
    /// the document when the phrase does not occur.
    pub fn snippet(&self, content: &str, folded: &FoldedText) -> String {
        let chars: Vec<char> = content.chars().collect();

        if let Some(at) = folded.find_char_index(&self.phrase) {
            let start = at.saturating_sub(SNIPPET_BEFORE);
            let end = (at + self.raw.chars().count() + SNIPPET_AFTER).min(chars.len());
            let window: String = chars[start.min(end)..end].iter().collect();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }

        chars.iter().take(FALLBACK_SNIPPET).collect()
    }
}
