//! Document identity.
//!
//! Every stroke and popup belongs to a document key derived from what a tab
//! is showing, never from the tab itself. Two tabs on the same passage share
//! annotations; a tab that navigates elsewhere sees the new passage's data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::{POPUPS_SUFFIX, STROKES_SUFFIX};

/// Prefix of text-passage document keys.
pub const PASSAGE_KEY_PREFIX: &str = "bible-annotations-";
/// Prefix of media document keys.
pub const MEDIA_KEY_PREFIX: &str = "media-annotations-";

/// Identifier of a host tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable key identifying the content being annotated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a text passage.
    ///
    /// Missing numbers render as `null` so keys written by earlier builds
    /// keep resolving to the same data.
    pub fn for_passage(passage: &PassageSnapshot) -> Self {
        fn part(value: Option<u32>) -> String {
            value.map_or_else(|| "null".to_string(), |v| v.to_string())
        }
        Self(format!(
            "{}{}-{}-{}-{}-{}",
            PASSAGE_KEY_PREFIX,
            passage.book,
            part(passage.chapter),
            part(passage.verse),
            part(passage.verse_end),
            passage.translation
        ))
    }

    /// Key for a media tab, which has no passage to key on.
    pub fn for_media(tab: TabId) -> Self {
        Self(format!("{}{}", MEDIA_KEY_PREFIX, tab))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key of the persisted stroke list.
    pub fn strokes_key(&self) -> String {
        format!("{}{}", self.0, STROKES_SUFFIX)
    }

    /// Storage key of the persisted popup list.
    pub fn popups_key(&self) -> String {
        format!("{}{}", self.0, POPUPS_SUFFIX)
    }

    /// Recover the document key from a `-strokes` storage key.
    pub fn from_strokes_key(storage_key: &str) -> Option<Self> {
        storage_key
            .strip_suffix(STROKES_SUFFIX)
            .filter(|k| !k.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// What a tab is displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMode {
    #[default]
    Bible,
    Media,
}

/// Passage fields of a tab, captured before and after a passage load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageSnapshot {
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub chapter: Option<u32>,
    #[serde(default)]
    pub verse: Option<u32>,
    #[serde(default)]
    pub verse_end: Option<u32>,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub loaded: bool,
    /// Rendered passage text, kept so a restored tab needs no refetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_header: Option<String>,
}

impl PassageSnapshot {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32, translation: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            chapter: Some(chapter),
            verse: Some(verse),
            translation: translation.into(),
            ..Default::default()
        }
    }

    pub fn with_verse_end(mut self, verse_end: u32) -> Self {
        self.verse_end = Some(verse_end);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>, header: impl Into<String>) -> Self {
        self.saved_text = Some(text.into());
        self.saved_header = Some(header.into());
        self.loaded = true;
        self
    }

    /// Whether enough is selected to load the passage.
    pub fn is_complete(&self) -> bool {
        !self.book.is_empty() && self.chapter.is_some() && self.verse.is_some()
    }
}

/// Full state of a tab, enough to restore it after it was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub id: TabId,
    #[serde(flatten)]
    pub passage: PassageSnapshot,
    #[serde(default)]
    pub mode: DocumentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_title: Option<String>,
}

impl TabSnapshot {
    /// A fresh, empty bible tab.
    pub fn new(id: TabId, translation: impl Into<String>) -> Self {
        Self {
            id,
            passage: PassageSnapshot {
                translation: translation.into(),
                ..Default::default()
            },
            mode: DocumentMode::Bible,
            media_content: None,
            media_title: None,
        }
    }

    /// Resolve the document this tab annotates.
    pub fn document_key(&self) -> DocumentKey {
        match self.mode {
            DocumentMode::Bible => DocumentKey::for_passage(&self.passage),
            DocumentMode::Media => DocumentKey::for_media(self.id),
        }
    }
}

/// The tab and document currently shown, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    pub tab_id: TabId,
    pub key: DocumentKey,
}

impl ActiveDocument {
    pub fn new(tab_id: TabId, key: DocumentKey) -> Self {
        Self { tab_id, key }
    }

    pub fn for_tab(tab: &TabSnapshot) -> Self {
        Self::new(tab.id, tab.document_key())
    }
}
