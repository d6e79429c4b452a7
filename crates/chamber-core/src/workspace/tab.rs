//! Tab type definitions
//!
//! Tabs are the unit of work surface inside a pane. They are serializable for
//! persistence and for front ends that talk to the store over JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use uuid::Uuid;

/// Length of the random part of a generated tab id
const RANDOM_SUFFIX_LEN: usize = 6;

/// Current time as Unix epoch milliseconds
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Kind of work surface a tab hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabType {
    Chat,
    Diff,
    Files,
    Terminal,
    Git,
    Browser,
}

impl TabType {
    /// Lowercase tag used in ids and serialized state
    pub fn as_str(&self) -> &'static str {
        match self {
            TabType::Chat => "chat",
            TabType::Diff => "diff",
            TabType::Files => "files",
            TabType::Terminal => "terminal",
            TabType::Git => "git",
            TabType::Browser => "browser",
        }
    }

    /// Title given to tabs created without one
    pub fn default_title(&self) -> &'static str {
        match self {
            TabType::Chat => "Chat",
            TabType::Diff => "Diff",
            TabType::Files => "Files",
            TabType::Terminal => "Terminal",
            TabType::Git => "Git",
            TabType::Browser => "Browser",
        }
    }
}

impl std::fmt::Display for TabType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque tab identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// Generate an id of the form `<type>-<base36 millis>-<random base36>`
    ///
    /// No collision check happens here; the registry re-rolls ids that are
    /// already taken when a tab is inserted.
    pub fn generate(tab_type: TabType, now_ms: i64) -> Self {
        let timestamp = to_base36(now_ms.max(0) as u128);
        let random = to_base36(Uuid::new_v4().as_u128());
        let suffix = &random[random.len().saturating_sub(RANDOM_SUFFIX_LEN)..];
        Self(format!("{}-{}-{}", tab_type.as_str(), timestamp, suffix))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TabId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A tab as stored in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,

    #[serde(rename = "type")]
    pub tab_type: TabType,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Creation time in Unix epoch milliseconds, used as an ordering tiebreak
    pub created_at: i64,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Tab {
    /// Build a tab from a draft with a freshly generated id
    pub fn from_draft(draft: TabDraft, created_at: i64) -> Self {
        Self {
            id: TabId::generate(draft.tab_type, created_at),
            tab_type: draft.tab_type,
            title: draft.title,
            session_id: draft.session_id,
            file_path: draft.file_path,
            url: draft.url,
            created_at,
            metadata: draft.metadata,
        }
    }

    /// Whether this is the chat tab for `session_id`
    pub fn is_chat_for(&self, session_id: &str) -> bool {
        self.tab_type == TabType::Chat && self.session_id.as_deref() == Some(session_id)
    }

    /// Shallow-merge `patch` into the metadata map; returns whether any
    /// value changed
    pub fn merge_metadata(&mut self, patch: Map<String, Value>) -> bool {
        let mut changed = false;
        for (key, value) in patch {
            if self.metadata.get(&key) != Some(&value) {
                self.metadata.insert(key, value);
                changed = true;
            }
        }
        changed
    }
}

/// Caller-supplied tab contents, before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDraft {
    #[serde(rename = "type")]
    pub tab_type: TabType,

    pub title: String,

    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl TabDraft {
    pub fn new(tab_type: TabType, title: impl Into<String>) -> Self {
        Self {
            tab_type,
            title: title.into(),
            session_id: None,
            file_path: None,
            url: None,
            metadata: Map::new(),
        }
    }

    /// Draft for a chat tab bound to a session
    pub fn chat(session_id: impl Into<String>, title: impl Into<String>) -> Self {
        let mut draft = Self::new(TabType::Chat, title);
        draft.session_id = Some(session_id.into());
        draft
    }

    /// Attach a file path; non-UTF-8 bytes are replaced so the tab always
    /// serializes
    pub fn with_file_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = Some(path.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Initial layout for a newly seen workspace: files, diff, terminal, git
///
/// Timestamps are offset by one millisecond each so creation order matches
/// display order.
pub fn default_tabs(now_ms: i64) -> Vec<Tab> {
    [TabType::Files, TabType::Diff, TabType::Terminal, TabType::Git]
        .into_iter()
        .enumerate()
        .map(|(offset, tab_type)| {
            Tab::from_draft(
                TabDraft::new(tab_type, tab_type.default_title()),
                now_ms + offset as i64,
            )
        })
        .collect()
}
