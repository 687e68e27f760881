//! Drive file metadata and listing filters.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// MIME type Drive uses for folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Metadata fields requested for every file.
pub const FILE_FIELDS: &str = "id,name,mimeType,modifiedTime,parents";

/// A file or folder as returned by the Drive files API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }
}

/// One page of a files listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<DriveItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// == List Query ==
/// Optional filters applied to a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Substring the file name must contain
    #[serde(default)]
    pub name: Option<String>,
    /// RFC 3339 lower bound on modification time
    #[serde(default)]
    pub modified_from: Option<String>,
    /// RFC 3339 upper bound on modification time
    #[serde(default)]
    pub modified_to: Option<String>,
}

impl ListQuery {
    /// Cache key for a listing. Every listing key of a folder shares the
    /// prefix returned by [`folder_prefix`].
    ///
    /// The filters are encoded as a JSON array so separators inside a value
    /// cannot make two queries share a key.
    pub fn cache_key(&self, folder: &str) -> String {
        let filters = json!([self.name, self.modified_from, self.modified_to]);
        format!("{}{}", folder_prefix(folder), filters)
    }

    /// Drive search expression for this listing.
    pub fn to_drive_query(&self, folder: &str) -> String {
        let mut q = format!("'{}' in parents and trashed = false", escape_literal(folder));
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            q.push_str(&format!(" and name contains '{}'", escape_literal(name.trim())));
        }
        if let Some(from) = self.modified_from.as_deref().filter(|v| !v.is_empty()) {
            q.push_str(&format!(" and modifiedTime >= '{}'", escape_literal(from)));
        }
        if let Some(to) = self.modified_to.as_deref().filter(|v| !v.is_empty()) {
            q.push_str(&format!(" and modifiedTime <= '{}'", escape_literal(to)));
        }
        q
    }
}

/// Prefix shared by all listing keys of `folder`.
pub fn folder_prefix(folder: &str) -> String {
    format!("list:{folder}|")
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
