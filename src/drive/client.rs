//! Drive API client.
//!
//! An explicit context object created once at startup. It owns the HTTP
//! client, the access token slot and the listing cache; every operation takes
//! it by reference instead of reaching for global handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::search::{run_bounded, SEARCH_CONCURRENCY};
use super::types::{folder_prefix, DriveItem, FileList, ListQuery, FILE_FIELDS, FOLDER_MIME};
use crate::cache::{CacheStats, TtlCache};
use crate::error::{AppError, Result};
use crate::record::{ensure_valid, parse_record, ClinicalRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: &str = "1000";
const SNIPPET_RADIUS: usize = 40;

/// A content search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub file: DriveItem,
    pub snippet: String,
}

// == Drive Client ==
/// Cheap to clone; clones share the token and the listing cache.
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    cache: Arc<RwLock<TtlCache<Vec<DriveItem>>>>,
}

impl DriveClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_cache(base_url, TtlCache::new())
    }

    /// Builds a client around an existing cache, e.g. one with a short TTL.
    pub fn with_cache(base_url: impl Into<String>, cache: TtlCache<Vec<DriveItem>>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            cache: Arc::new(RwLock::new(cache)),
        })
    }

    // == Session ==

    /// Stores the access token obtained by the front-end sign-in.
    pub async fn sign_in(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
        info!("drive session started");
    }

    /// Drops the token. Cached listings are kept; they are keyed by folder,
    /// not by user, and expire on their own.
    pub async fn sign_out(&self) {
        *self.token.write().await = None;
        info!("drive session ended");
    }

    pub async fn is_signed_in(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn access_token(&self) -> Result<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Unauthorized("no hay sesión de Google Drive activa".to_string()))
    }

    /// Maps non-success statuses to errors. A 401 also ends the session.
    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!("drive rejected the access token, signing out");
            self.sign_out().await;
            return Err(AppError::Unauthorized(
                "la sesión de Google Drive expiró, inicia sesión nuevamente".to_string(),
            ));
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %body.chars().take(200).collect::<String>(), "drive request failed");
        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound("archivo o carpeta de Drive".to_string()),
            StatusCode::FORBIDDEN => {
                AppError::Upstream("Drive denegó el acceso a este archivo".to_string())
            }
            _ => AppError::Upstream(format!("Drive respondió con estado {}", status.as_u16())),
        })
    }

    // == Listing ==

    /// Lists a folder, serving repeated calls from the cache for five minutes.
    pub async fn list_folder(&self, folder: &str, query: &ListQuery) -> Result<Vec<DriveItem>> {
        let key = query.cache_key(folder);
        if let Some(entry) = self.cache.write().await.get(&key) {
            debug!(key = %key, "listing served from cache");
            return Ok(entry.payload);
        }

        let items = self.fetch_listing(folder, query).await?;
        self.cache.write().await.put(key, items.clone());
        Ok(items)
    }

    async fn fetch_listing(&self, folder: &str, query: &ListQuery) -> Result<Vec<DriveItem>> {
        let token = self.access_token().await?;
        let url = format!("{}/drive/v3/files", self.base_url);
        let q = query.to_drive_query(folder);
        let fields = format!("nextPageToken,files({FILE_FIELDS})");

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut params = vec![
                ("q", q.as_str()),
                ("fields", fields.as_str()),
                ("orderBy", "folder,name"),
                ("pageSize", PAGE_SIZE),
            ];
            if let Some(page) = page_token.as_deref() {
                params.push(("pageToken", page));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(&params)
                .send()
                .await?;
            let page: FileList = self.check(response).await?.json().await?;
            items.extend(page.files);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(folder, count = items.len(), "listing fetched");
        Ok(items)
    }

    async fn invalidate_folder(&self, folder: &str) {
        self.cache.write().await.invalidate(&folder_prefix(folder));
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Writes ==

    /// Creates a folder under `parent` and drops the parent's cached listings.
    pub async fn create_folder(&self, parent: &str, name: &str) -> Result<DriveItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidRequest("el nombre de la carpeta es obligatorio".to_string()));
        }
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!("{}/drive/v3/files", self.base_url))
            .bearer_auth(&token)
            .query(&[("fields", FILE_FIELDS)])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME,
                "parents": [parent],
            }))
            .send()
            .await?;
        let folder: DriveItem = self.check(response).await?.json().await?;

        self.invalidate_folder(parent).await;
        info!(parent, id = %folder.id, "drive folder created");
        Ok(folder)
    }

    /// Uploads a record as JSON into `folder`.
    ///
    /// The record is validated first; nothing is sent when it fails. With
    /// `existing` set, that file's content is replaced instead.
    pub async fn upload_record(
        &self,
        folder: &str,
        record: &ClinicalRecord,
        existing: Option<&str>,
    ) -> Result<DriveItem> {
        ensure_valid(record)?;
        let token = self.access_token().await?;

        let name = record.suggested_file_name();
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| AppError::Internal(format!("record serialization failed: {e}")))?;
        let metadata = match existing {
            Some(_) => json!({ "name": name }),
            None => json!({ "name": name, "mimeType": "application/json", "parents": [folder] }),
        };
        let (boundary, body) = multipart_related(&metadata.to_string(), &content);

        let request = match existing {
            Some(id) => self
                .http
                .patch(format!("{}/upload/drive/v3/files/{}", self.base_url, id)),
            None => self.http.post(format!("{}/upload/drive/v3/files", self.base_url)),
        };
        let response = request
            .bearer_auth(&token)
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let file: DriveItem = self.check(response).await?.json().await?;

        self.invalidate_folder(folder).await;
        info!(folder, id = %file.id, "record uploaded");
        Ok(file)
    }

    // == Reads ==

    /// Fetches the current metadata of a file.
    pub async fn file_metadata(&self, file_id: &str) -> Result<DriveItem> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/drive/v3/files/{}", self.base_url, file_id))
            .bearer_auth(&token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    /// Downloads the raw content of a file.
    pub async fn download_text(&self, file_id: &str) -> Result<String> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}/drive/v3/files/{}", self.base_url, file_id))
            .bearer_auth(&token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        Ok(self.check(response).await?.text().await?)
    }

    /// Downloads and shape-checks a record file.
    pub async fn download_record(&self, file_id: &str) -> Result<ClinicalRecord> {
        let text = self.download_text(file_id).await?;
        parse_record(&text)
    }

    // == Search ==

    /// Searches the content of every file directly inside `folder`.
    ///
    /// Files are downloaded by a pool of [`SEARCH_CONCURRENCY`] workers. A
    /// file that fails to download is skipped, except for an expired session,
    /// which fails the whole search.
    pub async fn search_contents(&self, folder: &str, term: &str) -> Result<Vec<SearchHit>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::InvalidRequest("el término de búsqueda está vacío".to_string()));
        }

        let files: Vec<DriveItem> = self
            .list_folder(folder, &ListQuery::default())
            .await?
            .into_iter()
            .filter(|item| !item.is_folder())
            .collect();
        debug!(folder, files = files.len(), "content search started");

        let client = self.clone();
        let expired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&expired);
        let hits = run_bounded(files, SEARCH_CONCURRENCY, move |file: DriveItem| {
            let client = client.clone();
            let needle = needle.clone();
            let flag = Arc::clone(&flag);
            async move {
                let text = match client.download_text(&file.id).await {
                    Ok(text) => text,
                    Err(err @ AppError::Unauthorized(_)) => {
                        flag.store(true, Ordering::SeqCst);
                        return Err(err);
                    }
                    Err(err) => return Err(err),
                };
                Ok(snippet(&text, &needle).map(|snippet| SearchHit { file, snippet }))
            }
        })
        .await;

        if expired.load(Ordering::SeqCst) {
            return Err(AppError::Unauthorized(
                "la sesión de Google Drive expiró durante la búsqueda".to_string(),
            ));
        }

        info!(folder, hits = hits.len(), "content search finished");
        Ok(hits)
    }
}

/// Builds a `multipart/related` body with a metadata part and a media part.
fn multipart_related(metadata: &str, content: &str) -> (String, String) {
    let mut boundary = String::from("clinical_notes_part");
    while content.contains(&boundary) || metadata.contains(&boundary) {
        boundary.push('_');
    }

    let body = format!(
        "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
         --{boundary}\r\nContent-Type: application/json\r\n\r\n{content}\r\n\
         --{boundary}--"
    );
    (boundary, body)
}

/// Text around the first case-insensitive match of `needle`.
fn snippet(text: &str, needle: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let lowered: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return None;
    }

    let start = lowered
        .windows(needle.len())
        .position(|window| window == needle.as_slice())?;
    let from = start.saturating_sub(SNIPPET_RADIUS);
    let to = (start + needle.len() + SNIPPET_RADIUS).min(chars.len());
    Some(chars[from..to].iter().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{field_ids, TemplateId};
    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        extract::Query,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Mock {
        list_calls: Arc<AtomicUsize>,
        uploads: Arc<Mutex<Vec<(String, String)>>>,
        revoke_on_download: Arc<AtomicBool>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer good")
    }

    async fn list(State(mock): State<Mock>, headers: HeaderMap) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, Json(json!({"error": "expired"})));
        }
        mock.list_calls.fetch_add(1, Ordering::SeqCst);
        (
            AxumStatus::OK,
            Json(json!({"files": [
                {"id": "f1", "name": "Ana.json", "mimeType": "application/json"},
                {"id": "f2", "name": "Luis.json", "mimeType": "application/json"},
                {"id": "missing", "name": "Roto.json", "mimeType": "application/json"},
                {"id": "d1", "name": "Sub", "mimeType": FOLDER_MIME}
            ]})),
        )
    }

    async fn create(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({"id": "new", "name": body["name"], "mimeType": body["mimeType"]}))
    }

    async fn media(
        State(mock): State<Mock>,
        Path(id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (AxumStatus, String) {
        if params.get("alt").map(String::as_str) != Some("media") {
            let meta = json!({"id": id, "name": "Renombrado.json", "mimeType": "application/json", "parents": ["root"]});
            return (AxumStatus::OK, meta.to_string());
        }
        if id == "f2" && mock.revoke_on_download.load(Ordering::SeqCst) {
            return (AxumStatus::UNAUTHORIZED, String::new());
        }
        match id.as_str() {
            "f1" => (AxumStatus::OK, r#"{"diagnostico": "Neumonía adquirida en la comunidad"}"#.into()),
            "f2" => (AxumStatus::OK, r#"{"diagnostico": "Fractura de cadera"}"#.into()),
            _ => (AxumStatus::NOT_FOUND, String::new()),
        }
    }

    async fn upload(State(mock): State<Mock>, headers: HeaderMap, body: String) -> Json<Value> {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        mock.uploads.lock().unwrap().push((content_type, body));
        Json(json!({"id": "up1", "name": "x.json", "mimeType": "application/json"}))
    }

    async fn spawn_mock() -> (String, Mock) {
        let mock = Mock::default();
        let app = Router::new()
            .route("/drive/v3/files", get(list).post(create))
            .route("/drive/v3/files/:id", get(media))
            .route("/upload/drive/v3/files", post(upload))
            .with_state(mock.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), mock)
    }

    async fn signed_in_client() -> (DriveClient, Mock) {
        let (base, mock) = spawn_mock().await;
        let client = DriveClient::new(base).unwrap();
        client.sign_in("good").await;
        (client, mock)
    }

    #[tokio::test]
    async fn test_listing_is_cached() {
        let (client, mock) = signed_in_client().await;

        let first = client.list_folder("root", &ListQuery::default()).await.unwrap();
        let second = client.list_folder("root", &ListQuery::default()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.cache_stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_different_filters_use_different_keys() {
        let (client, mock) = signed_in_client().await;
        let filtered = ListQuery {
            name: Some("Ana".into()),
            ..ListQuery::default()
        };

        client.list_folder("root", &ListQuery::default()).await.unwrap();
        client.list_folder("root", &filtered).await.unwrap();

        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_listing_is_refetched() {
        let (base, mock) = spawn_mock().await;
        let client = DriveClient::with_cache(base, TtlCache::with_ttl(Duration::from_millis(20))).unwrap();
        client.sign_in("good").await;

        client.list_folder("root", &ListQuery::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        client.list_folder("root", &ListQuery::default()).await.unwrap();

        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_folder_invalidates_parent_listing() {
        let (client, mock) = signed_in_client().await;

        client.list_folder("root", &ListQuery::default()).await.unwrap();
        let folder = client.create_folder("root", "Pacientes").await.unwrap();
        client.list_folder("root", &ListQuery::default()).await.unwrap();

        assert_eq!(folder.name, "Pacientes");
        assert!(folder.is_folder());
        assert_eq!(mock.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_signs_out() {
        let (client, _mock) = signed_in_client().await;
        client.sign_in("stale").await;

        let result = client.list_folder("root", &ListQuery::default()).await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(!client.is_signed_in().await);
        // no token at all fails before any request
        let again = client.list_folder("root", &ListQuery::default()).await;
        assert!(matches!(again, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_related() {
        let (client, mock) = signed_in_client().await;
        let mut record = TemplateId::Evolucion.blank_record();
        record.set_field(field_ids::NAME, "Ana");
        record.set_field(field_ids::RUT, "17.752.753-K");

        let file = client.upload_record("root", &record, None).await.unwrap();

        assert_eq!(file.id, "up1");
        let uploads = mock.uploads.lock().unwrap();
        let (content_type, body) = &uploads[0];
        assert!(content_type.starts_with("multipart/related; boundary=clinical_notes_part"));
        assert!(body.contains(r#""parents":["root"]"#));
        assert!(body.contains(r#""value": "Ana""#));
        assert!(body.trim_end().ends_with("--"));
    }

    #[tokio::test]
    async fn test_invalid_record_is_not_uploaded() {
        let (client, mock) = signed_in_client().await;
        let record = TemplateId::Evolucion.blank_record();

        let result = client.upload_record("root", &record, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(mock.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_skips_failed_downloads() {
        let (client, _mock) = signed_in_client().await;

        let hits = client.search_contents("root", "NEUMONÍA").await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file.id, "f1");
        assert!(hits[0].snippet.contains("Neumonía"));
    }

    #[tokio::test]
    async fn test_search_fails_when_session_expires() {
        let (client, mock) = signed_in_client().await;
        mock.revoke_on_download.store(true, Ordering::SeqCst);

        let result = client.search_contents("root", "neumonía").await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(!client.is_signed_in().await);
    }

    #[tokio::test]
    async fn test_file_metadata_reports_current_name() {
        let (client, _mock) = signed_in_client().await;

        let item = client.file_metadata("f1").await.unwrap();

        assert_eq!(item.id, "f1");
        assert_eq!(item.name, "Renombrado.json");
        assert_eq!(item.parents, vec!["root".to_string()]);
    }

    #[test]
    fn test_snippet_window() {
        let text = format!("{}needle{}", "a".repeat(100), "b".repeat(100));
        let found = snippet(&text, "needle").unwrap();
        assert_eq!(found.chars().count(), 2 * SNIPPET_RADIUS + 6);
        assert!(snippet("nothing here", "needle").is_none());
    }

    #[test]
    fn test_multipart_boundary_avoids_content() {
        let (boundary, body) = multipart_related("{}", "clinical_notes_part");
        assert_eq!(boundary, "clinical_notes_part_");
        assert!(body.starts_with("--clinical_notes_part_\r\n"));
    }
}
