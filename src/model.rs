use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One file inside a remote gist. Listing responses omit `content`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GistFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A remote gist as echoed by the service. Only `id` and `files` are
/// required; everything else the service sends is kept in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Gist {
    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Every gist visible to the credential, in listing order.
pub type Directory = Vec<Gist>;
