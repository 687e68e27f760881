//! Request DTOs for the clinical notes API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::dose::TimeSlot;
use crate::medication::MedicationList;

/// Request body for POST /sanitize
#[derive(Debug, Clone, Deserialize)]
pub struct SanitizeRequest {
    /// Rich-text HTML as produced by the editor
    pub html: String,
}

/// Request body for POST /doses/cycle
#[derive(Debug, Clone, Deserialize)]
pub struct CycleDoseRequest {
    /// Current cell label, empty for an empty cell
    #[serde(default)]
    pub current: String,
}

/// Request body for POST /medications/cycle
#[derive(Debug, Clone, Deserialize)]
pub struct MedicationCycleRequest {
    pub list: MedicationList,
    pub medication_id: String,
    pub slot: TimeSlot,
}

/// Request body for POST /rut/validate
#[derive(Debug, Clone, Deserialize)]
pub struct RutRequest {
    pub rut: String,
}

/// Request body for POST /records/import and POST /medications/import
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    /// Raw file content
    pub content: String,
}

/// Request body for PUT /auth/session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    pub access_token: String,
}

impl SessionRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.access_token.trim().is_empty() {
            return Some("access_token cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /drive/folders
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderRequest {
    /// Parent folder id, `root` for the top of the drive
    #[serde(default = "root_folder")]
    pub parent_id: String,
    pub name: String,
}

fn root_folder() -> String {
    "root".to_string()
}

impl CreateFolderRequest {
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Folder name cannot be empty".to_string());
        }
        if self.name.chars().count() > 255 {
            return Some("Folder name exceeds maximum length of 255 characters".to_string());
        }
        None
    }
}

/// Request body for POST /drive/records
///
/// Both fields are optional: the folder falls back to the saved default
/// folder, and without a file id a new file is created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveRecordRequest {
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
}

/// Request body for POST /drive/search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(default = "root_folder")]
    pub folder_id: String,
    pub term: String,
}

impl SearchRequest {
    pub fn validate(&self) -> Option<String> {
        if self.term.trim().chars().count() < 2 {
            return Some("Search term must have at least 2 characters".to_string());
        }
        None
    }
}

/// Request body for POST /ai/complete
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRequest {
    pub prompt: String,
    #[serde(default)]
    pub system: Option<String>,
}
