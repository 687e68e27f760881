//! Draft, version history, favorites, recent files and default folder.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::KeyValueStore;
use crate::error::{AppError, Result};
use crate::record::ClinicalRecord;

/// Versions kept in the history ring buffer.
pub const HISTORY_LIMIT: usize = 5;

/// Recent files kept.
pub const RECENT_LIMIT: usize = 5;

mod keys {
    pub const DRAFT: &str = "draft";
    pub const HISTORY: &str = "history";
    pub const FAVORITES: &str = "favorites";
    pub const RECENT: &str = "recent_files";
    pub const DEFAULT_FOLDER: &str = "default_folder";
}

// == Stored Types ==
/// A record snapshot with the time it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub record: ClinicalRecord,
    pub saved_at: DateTime<Utc>,
}

/// A Drive folder pinned by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteFolder {
    pub id: String,
    pub name: String,
}

/// A file recently opened or saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub opened_at: DateTime<Utc>,
}

/// Folder that "save to Drive" targets by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultFolder {
    pub id: String,
    /// Human readable breadcrumb, e.g. "Mi unidad / Pacientes"
    pub path: String,
}

// == Local Store ==
/// Typed view over a [`KeyValueStore`].
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("corrupt '{key}' entry: {e}"))),
            None => Ok(None),
        }
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| AppError::Storage(e.to_string()))?;
        self.backend.set(key, value)
    }

    // == Draft ==

    /// Saves the autosave draft, replacing any previous one.
    pub fn save_draft(&self, record: &ClinicalRecord) -> Result<Snapshot> {
        let snapshot = Snapshot {
            record: record.clone(),
            saved_at: Utc::now(),
        };
        self.save(keys::DRAFT, &snapshot)?;
        Ok(snapshot)
    }

    pub fn load_draft(&self) -> Result<Option<Snapshot>> {
        self.load(keys::DRAFT)
    }

    pub fn clear_draft(&self) -> Result<()> {
        self.backend.remove(keys::DRAFT)
    }

    // == History ==

    /// Pushes a version onto the history, newest first, keeping
    /// [`HISTORY_LIMIT`] entries. A record identical to the newest
    /// version is not pushed twice.
    pub fn push_history(&self, record: &ClinicalRecord) -> Result<Vec<Snapshot>> {
        let mut history: Vec<Snapshot> = self.load_list(keys::HISTORY)?;
        if history.first().is_some_and(|s| &s.record == record) {
            return Ok(history);
        }

        history.insert(
            0,
            Snapshot {
                record: record.clone(),
                saved_at: Utc::now(),
            },
        );
        history.truncate(HISTORY_LIMIT);
        self.save(keys::HISTORY, &history)?;
        Ok(history)
    }

    pub fn history(&self) -> Result<Vec<Snapshot>> {
        self.load_list(keys::HISTORY)
    }

    // == Favorites ==

    /// Adds a favorite folder. Re-adding an existing id renames it in place.
    pub fn add_favorite(&self, folder: FavoriteFolder) -> Result<Vec<FavoriteFolder>> {
        let mut favorites: Vec<FavoriteFolder> = self.load_list(keys::FAVORITES)?;
        match favorites.iter_mut().find(|f| f.id == folder.id) {
            Some(existing) => existing.name = folder.name,
            None => favorites.push(folder),
        }
        self.save(keys::FAVORITES, &favorites)?;
        Ok(favorites)
    }

    pub fn remove_favorite(&self, id: &str) -> Result<Vec<FavoriteFolder>> {
        let mut favorites: Vec<FavoriteFolder> = self.load_list(keys::FAVORITES)?;
        favorites.retain(|f| f.id != id);
        self.save(keys::FAVORITES, &favorites)?;
        Ok(favorites)
    }

    pub fn favorites(&self) -> Result<Vec<FavoriteFolder>> {
        self.load_list(keys::FAVORITES)
    }

    // == Recent Files ==

    /// Moves a file to the front of the recent list.
    pub fn touch_recent(
        &self,
        id: &str,
        name: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<RecentFile>> {
        let mut recent: Vec<RecentFile> = self.load_list(keys::RECENT)?;
        recent.retain(|f| f.id != id);
        recent.insert(
            0,
            RecentFile {
                id: id.to_string(),
                name: name.to_string(),
                folder_id: folder_id.map(str::to_string),
                opened_at: Utc::now(),
            },
        );
        recent.truncate(RECENT_LIMIT);
        self.save(keys::RECENT, &recent)?;
        Ok(recent)
    }

    pub fn recent_files(&self) -> Result<Vec<RecentFile>> {
        self.load_list(keys::RECENT)
    }

    // == Default Folder ==

    pub fn set_default_folder(&self, folder: &DefaultFolder) -> Result<()> {
        self.save(keys::DEFAULT_FOLDER, folder)?;
        info!(folder = %folder.id, "default folder set");
        Ok(())
    }

    pub fn default_folder(&self) -> Result<Option<DefaultFolder>> {
        self.load(keys::DEFAULT_FOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{JsonFileStore, MemoryStore};
    use crate::record::{field_ids, TemplateId};

    fn memory() -> LocalStore {
        LocalStore::new(Arc::new(MemoryStore::new()))
    }

    fn record_named(name: &str) -> ClinicalRecord {
        let mut record = TemplateId::Evolucion.blank_record();
        record.set_field(field_ids::NAME, name);
        record
    }

    #[test]
    fn test_draft_save_load_clear() {
        let store = memory();
        assert!(store.load_draft().unwrap().is_none());

        store.save_draft(&record_named("Ana")).unwrap();
        let draft = store.load_draft().unwrap().unwrap();
        assert_eq!(draft.record.patient_name(), "Ana");

        store.clear_draft().unwrap();
        assert!(store.load_draft().unwrap().is_none());
    }

    #[test]
    fn test_history_keeps_five_newest_first() {
        let store = memory();
        for i in 0..7 {
            store.push_history(&record_named(&format!("v{i}"))).unwrap();
        }

        let history = store.history().unwrap();
        let names: Vec<&str> = history.iter().map(|s| s.record.patient_name()).collect();
        assert_eq!(names, vec!["v6", "v5", "v4", "v3", "v2"]);
    }

    #[test]
    fn test_history_skips_identical_newest() {
        let store = memory();
        store.push_history(&record_named("Ana")).unwrap();
        store.push_history(&record_named("Ana")).unwrap();
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_favorites_deduplicated() {
        let store = memory();
        store
            .add_favorite(FavoriteFolder { id: "f1".into(), name: "Pacientes".into() })
            .unwrap();
        let favorites = store
            .add_favorite(FavoriteFolder { id: "f1".into(), name: "Pacientes 2024".into() })
            .unwrap();

        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Pacientes 2024");

        assert!(store.remove_favorite("f1").unwrap().is_empty());
    }

    #[test]
    fn test_recent_files_move_to_front() {
        let store = memory();
        for i in 0..6 {
            store.touch_recent(&format!("id{i}"), "x.json", None).unwrap();
        }
        let recent = store.touch_recent("id3", "x.json", Some("folder")).unwrap();

        let ids: Vec<&str> = recent.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["id3", "id5", "id4", "id2", "id1"]);
        assert_eq!(recent[0].folder_id.as_deref(), Some("folder"));
    }

    #[test]
    fn test_default_folder_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_store.json");
        let folder = DefaultFolder { id: "abc".into(), path: "Mi unidad / Pacientes".into() };

        {
            let store = LocalStore::new(Arc::new(JsonFileStore::open(&path).unwrap()));
            store.set_default_folder(&folder).unwrap();
        }

        let store = LocalStore::new(Arc::new(JsonFileStore::open(&path).unwrap()));
        assert_eq!(store.default_folder().unwrap(), Some(folder));
    }

    #[test]
    fn test_corrupt_entry_reports_storage_error() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("history", serde_json::json!("not a list")).unwrap();
        let store = LocalStore::new(backend);

        assert!(matches!(store.history(), Err(AppError::Storage(_))));
    }
}
