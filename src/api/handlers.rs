//! API Handlers
//!
//! HTTP request handlers for each clinical notes endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::ai::GenerativeClient;
use crate::config::Config;
use crate::dose::DoseState;
use crate::drive::{DriveClient, DriveItem, ListQuery, SearchHit};
use crate::error::{AppError, Result};
use crate::medication::{render_chart_html, MedicationList, MedicationSchedule};
use crate::models::{
    CompleteRequest, CompleteResponse, CreateFolderRequest, CycleDoseRequest, CycleDoseResponse,
    HealthResponse, HtmlResponse, ImportRequest, MedicationCycleRequest, RutRequest, RutResponse,
    SanitizeRequest, SaveRecordRequest, SearchRequest, SessionRequest, SessionResponse,
    StatsResponse, ValidationResponse,
};
use crate::persistence::{
    DefaultFolder, FavoriteFolder, JsonFileStore, LocalStore, RecentFile, Snapshot,
};
use crate::record::{rut, validate, ClinicalRecord, RecordSession, TemplateId};
use crate::sanitize::sanitize;

/// Application state shared across all handlers.
///
/// The record being edited lives behind `Arc<RwLock<>>`; the Drive client
/// and local store share their own internals.
#[derive(Clone)]
pub struct AppState {
    /// Drive context object (token slot and listing cache)
    pub drive: DriveClient,
    /// Writing assistant, absent when no API key is configured
    pub ai: Option<GenerativeClient>,
    /// Draft, history, favorites, recent files and default folder
    pub store: LocalStore,
    /// Record currently open in the editor
    pub session: Arc<RwLock<RecordSession>>,
}

impl AppState {
    /// Creates a new AppState with a blank evolution note open.
    pub fn new(drive: DriveClient, ai: Option<GenerativeClient>, store: LocalStore) -> Self {
        Self {
            drive,
            ai,
            store,
            session: Arc::new(RwLock::new(RecordSession::new(TemplateId::Evolucion))),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the on-disk store and builds the remote clients.
    pub fn from_config(config: &Config) -> Result<Self> {
        let drive = DriveClient::new(&config.drive_api_base)?;
        let ai = match &config.ai_api_key {
            Some(key) => Some(GenerativeClient::new(&config.ai_api_base, key, &config.ai_model)?),
            None => None,
        };
        let store = LocalStore::new(Arc::new(JsonFileStore::open(config.store_path())?));
        Ok(Self::new(drive, ai, store))
    }
}

// == Service ==

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.drive.is_signed_in().await,
        state.ai.is_some(),
    ))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.drive.cache_stats().await))
}

// == Stateless Tools ==

/// Handler for POST /sanitize
pub async fn sanitize_handler(Json(req): Json<SanitizeRequest>) -> Json<HtmlResponse> {
    Json(HtmlResponse::new(sanitize(&req.html)))
}

/// Handler for POST /doses/cycle
///
/// Returns the state that follows `current` in the dose cycle.
pub async fn cycle_dose_handler(Json(req): Json<CycleDoseRequest>) -> Result<Json<CycleDoseResponse>> {
    let current: DoseState = req.current.parse()?;
    Ok(Json(CycleDoseResponse::new(current.cycle())))
}

/// Handler for POST /rut/validate
pub async fn rut_handler(Json(req): Json<RutRequest>) -> Json<RutResponse> {
    let valid = rut::is_valid(&req.rut);
    Json(RutResponse {
        valid,
        formatted: if valid { rut::format(&req.rut) } else { None },
    })
}

/// Handler for GET /templates/:id
pub async fn template_handler(Path(id): Path<String>) -> Result<Json<ClinicalRecord>> {
    let template: TemplateId = id.parse()?;
    Ok(Json(template.blank_record()))
}

// == Records ==

/// Handler for GET /records/current
pub async fn current_record_handler(State(state): State<AppState>) -> Json<ClinicalRecord> {
    Json(state.session.read().await.record().clone())
}

/// Handler for PUT /records/current
///
/// Replaces the open record and recomputes the patient's age.
pub async fn update_record_handler(
    State(state): State<AppState>,
    Json(mut record): Json<ClinicalRecord>,
) -> Json<ClinicalRecord> {
    record.refresh_age();
    let mut session = state.session.write().await;
    *session = RecordSession::from_record(record);
    Json(session.record().clone())
}

/// Handler for POST /records/new/:template
pub async fn new_record_handler(
    State(state): State<AppState>,
    Path(template): Path<String>,
) -> Result<Json<ClinicalRecord>> {
    let template: TemplateId = template.parse()?;
    let mut session = state.session.write().await;
    session.reset(template);
    Ok(Json(session.record().clone()))
}

/// Handler for POST /records/validate
pub async fn validate_record_handler(Json(record): Json<ClinicalRecord>) -> Json<ValidationResponse> {
    Json(ValidationResponse::new(validate(&record)))
}

/// Handler for POST /records/import
///
/// A rejected file leaves the open record untouched.
pub async fn import_record_handler(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ClinicalRecord>> {
    let mut session = state.session.write().await;
    session.import_json(&req.content)?;
    Ok(Json(session.record().clone()))
}

// == Medications ==

/// Handler for POST /medications/import
pub async fn import_medications_handler(Json(req): Json<ImportRequest>) -> Result<Json<MedicationList>> {
    Ok(Json(MedicationList::from_json(&req.content)?))
}

/// Handler for POST /medications/cycle
pub async fn cycle_medication_handler(
    Json(req): Json<MedicationCycleRequest>,
) -> Result<Json<MedicationList>> {
    let mut schedule = MedicationSchedule::from_list(req.list);
    schedule.cycle_dose(&req.medication_id, req.slot)?;
    Ok(Json(schedule.into_list()))
}

/// Handler for POST /medications/chart
pub async fn chart_handler(Json(list): Json<MedicationList>) -> Json<HtmlResponse> {
    Json(HtmlResponse::new(render_chart_html(&list)))
}

// == Local Store ==

/// Handler for GET /draft
pub async fn get_draft_handler(State(state): State<AppState>) -> Result<Json<Snapshot>> {
    state
        .store
        .load_draft()?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("draft".to_string()))
}

/// Handler for PUT /draft
///
/// Autosave: the body becomes the open record and the stored draft.
pub async fn save_draft_handler(
    State(state): State<AppState>,
    Json(record): Json<ClinicalRecord>,
) -> Result<Json<Snapshot>> {
    let snapshot = state.store.save_draft(&record)?;
    *state.session.write().await = RecordSession::from_record(record);
    Ok(Json(snapshot))
}

/// Handler for DELETE /draft
pub async fn clear_draft_handler(State(state): State<AppState>) -> Result<StatusCode> {
    state.store.clear_draft()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /draft/restore
pub async fn restore_draft_handler(State(state): State<AppState>) -> Result<Json<ClinicalRecord>> {
    let draft = state
        .store
        .load_draft()?
        .ok_or_else(|| AppError::NotFound("draft".to_string()))?;
    let mut session = state.session.write().await;
    *session = RecordSession::from_record(draft.record);
    Ok(Json(session.record().clone()))
}

/// Handler for GET /history
pub async fn history_handler(State(state): State<AppState>) -> Result<Json<Vec<Snapshot>>> {
    Ok(Json(state.store.history()?))
}

/// Handler for GET /favorites
pub async fn favorites_handler(State(state): State<AppState>) -> Result<Json<Vec<FavoriteFolder>>> {
    Ok(Json(state.store.favorites()?))
}

/// Handler for POST /favorites
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    Json(folder): Json<FavoriteFolder>,
) -> Result<Json<Vec<FavoriteFolder>>> {
    if folder.id.trim().is_empty() {
        return Err(AppError::InvalidRequest("Folder id cannot be empty".to_string()));
    }
    Ok(Json(state.store.add_favorite(folder)?))
}

/// Handler for DELETE /favorites/:id
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FavoriteFolder>>> {
    Ok(Json(state.store.remove_favorite(&id)?))
}

/// Handler for GET /recent
pub async fn recent_handler(State(state): State<AppState>) -> Result<Json<Vec<RecentFile>>> {
    Ok(Json(state.store.recent_files()?))
}

/// Handler for GET /settings/default-folder
pub async fn get_default_folder_handler(
    State(state): State<AppState>,
) -> Result<Json<DefaultFolder>> {
    state
        .store
        .default_folder()?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("default folder".to_string()))
}

/// Handler for PUT /settings/default-folder
pub async fn set_default_folder_handler(
    State(state): State<AppState>,
    Json(folder): Json<DefaultFolder>,
) -> Result<Json<DefaultFolder>> {
    if folder.id.trim().is_empty() {
        return Err(AppError::InvalidRequest("Folder id cannot be empty".to_string()));
    }
    state.store.set_default_folder(&folder)?;
    Ok(Json(folder))
}

// == Drive ==

/// Handler for PUT /auth/session
pub async fn sign_in_handler(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }
    state.drive.sign_in(req.access_token).await;
    Ok(Json(SessionResponse { signed_in: true }))
}

/// Handler for DELETE /auth/session
pub async fn sign_out_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    state.drive.sign_out().await;
    Json(SessionResponse { signed_in: false })
}

/// Handler for GET /drive/folders/:id
pub async fn list_folder_handler(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DriveItem>>> {
    Ok(Json(state.drive.list_folder(&folder, &query).await?))
}

/// Handler for POST /drive/folders
pub async fn create_folder_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<DriveItem>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }
    Ok(Json(state.drive.create_folder(&req.parent_id, &req.name).await?))
}

/// Handler for POST /drive/records
///
/// Saves the open record: validate, sanitize, upload, then record the
/// version in history and recent files and drop the draft.
pub async fn save_record_handler(
    State(state): State<AppState>,
    Json(req): Json<SaveRecordRequest>,
) -> Result<Json<DriveItem>> {
    let record = state.session.read().await.prepare_for_save()?;

    let folder = match req.folder_id {
        Some(folder) if !folder.trim().is_empty() => folder,
        _ => state
            .store
            .default_folder()?
            .map(|f| f.id)
            .ok_or_else(|| AppError::InvalidRequest("no hay carpeta de destino".to_string()))?,
    };

    let file = state
        .drive
        .upload_record(&folder, &record, req.file_id.as_deref())
        .await?;

    state.store.push_history(&record)?;
    state.store.touch_recent(&file.id, &file.name, Some(&folder))?;
    state.store.clear_draft()?;
    info!(file = %file.id, "record saved to drive");
    Ok(Json(file))
}

/// Handler for GET /drive/records/:id
///
/// Downloads a record and opens it in the editor. Recent files keep the
/// name the file currently has in Drive.
pub async fn open_record_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClinicalRecord>> {
    let file = state.drive.file_metadata(&id).await?;
    let mut record = state.drive.download_record(&id).await?;
    record.refresh_age();
    state
        .store
        .touch_recent(&file.id, &file.name, file.parents.first().map(String::as_str))?;

    let mut session = state.session.write().await;
    *session = RecordSession::from_record(record);
    Ok(Json(session.record().clone()))
}

/// Handler for POST /drive/search
pub async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }
    Ok(Json(state.drive.search_contents(&req.folder_id, &req.term).await?))
}

// == AI ==

/// Handler for POST /ai/complete
pub async fn complete_handler(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>> {
    let client = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::InvalidRequest("el asistente de IA no está configurado".to_string()))?;

    let text = client.complete_with(req.system.as_deref(), &req.prompt).await?;
    Ok(Json(CompleteResponse {
        text,
        model: client.model().to_string(),
    }))
}
