//! JSON dataset import and export
//!
//! A dataset is the on-disk form of the in-memory stores: users with their
//! outgoing follow edges and close-friends lists, and content documents in
//! their stored shape.
//!
//! Item records missing a required field do not fail the load. They are
//! skipped with a warning, kept aside, and written back unchanged on save.

use agora_core::{ContentDocument, Result, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// One user's outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User identifier
    pub id: UserId,
    /// Accounts this user follows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub following: Vec<UserId>,
    /// Accounts on this user's close-friends list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub close_friends: Vec<UserId>,
}

/// Users and content, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    /// Users and their edges
    pub users: Vec<UserRecord>,
    /// Stored content documents
    pub items: Vec<ContentDocument>,
    /// Item records that could not be read as documents
    pub unreadable: Vec<Value>,
}

/// File layout as read; items are decoded one at a time.
#[derive(Deserialize)]
struct DatasetFile {
    #[serde(default)]
    users: Vec<UserRecord>,
    #[serde(default)]
    items: Vec<Value>,
}

/// File layout as written.
#[derive(Serialize)]
struct DatasetOut<'a> {
    users: &'a [UserRecord],
    items: Vec<StoredItem<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredItem<'a> {
    Document(&'a ContentDocument),
    Unreadable(&'a Value),
}

impl Dataset {
    /// Parse a dataset from JSON text.
    ///
    /// # Errors
    /// * `AgoraError::Serialization` if the text is not JSON or a user record
    ///   is malformed; malformed item records are skipped instead
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(content)?;

        let mut items = Vec::with_capacity(file.items.len());
        let mut unreadable = Vec::new();
        for raw in file.items {
            match ContentDocument::deserialize(&raw) {
                Ok(document) => items.push(document),
                Err(err) => {
                    tracing::warn!(id = ?raw.get("id"), error = %err, "skipping unreadable item");
                    unreadable.push(raw);
                }
            }
        }

        Ok(Self {
            users: file.users,
            items,
            unreadable,
        })
    }

    /// Load a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            users = dataset.users.len(),
            items = dataset.items.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Write the dataset as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let out = DatasetOut {
            users: &self.users,
            items: self
                .items
                .iter()
                .map(StoredItem::Document)
                .chain(self.unreadable.iter().map(StoredItem::Unreadable))
                .collect(),
        };
        let content = serde_json::to_string_pretty(&out)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
