//! Sync entry points.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use core_sync::{FleetReport, FolderSyncRequest, SyncAuth};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFolderBody {
    #[serde(default, alias = "googleDriveFolderId")]
    pub remote_folder_id: Option<String>,
    #[serde(default, alias = "eventId")]
    pub local_container_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFolderResponse {
    pub success: bool,
    pub event_id: String,
    pub photos_added: u64,
    pub total_files: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllBody {
    #[serde(default)]
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncAllResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: FleetReport,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn body_or_bad_request<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// `POST /api/sync/folder`
pub async fn sync_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SyncFolderBody>, JsonRejection>,
) -> Result<Json<SyncFolderResponse>, ApiError> {
    let body = body_or_bad_request(body)?;

    let folder_id = non_blank(body.remote_folder_id)
        .ok_or_else(|| ApiError::BadRequest("Google Drive folder ID is required".to_string()))?;

    let auth = match non_blank(body.access_token) {
        Some(token) => SyncAuth::AccessToken(token),
        None => state
            .sessions
            .resolve(&headers)
            .map(SyncAuth::Principal)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?,
    };

    let mut request = FolderSyncRequest::new(folder_id);
    if let Some(event_id) = non_blank(body.local_container_id) {
        request = request.with_event_id(event_id);
    }

    let report = state.engine.sync_folder(auth, request).await?;
    info!(
        event_id = %report.event_id,
        photos_added = report.photos_added,
        total_files = report.total_files,
        "Folder sync request completed"
    );

    Ok(Json(SyncFolderResponse {
        success: true,
        event_id: report.event_id,
        photos_added: report.photos_added,
        total_files: report.total_files,
    }))
}

/// `POST /api/sync/all`
pub async fn sync_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SyncAllBody>, JsonRejection>,
) -> Result<Json<SyncAllResponse>, ApiError> {
    let principal = state
        .sessions
        .resolve(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let body = body_or_bad_request(body)?;
    let parent_folder_id = non_blank(body.parent_folder_id)
        .ok_or_else(|| ApiError::BadRequest("Parent folder ID is required".to_string()))?;

    let report = state.engine.sync_all(&principal, &parent_folder_id).await?;

    Ok(Json(SyncAllResponse {
        success: true,
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_body_accepts_aliases() {
        let body: SyncFolderBody = serde_json::from_str(
            r#"{"googleDriveFolderId":"F1","eventId":"E1","accessToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(body.remote_folder_id.as_deref(), Some("F1"));
        assert_eq!(body.local_container_id.as_deref(), Some("E1"));
        assert_eq!(body.access_token.as_deref(), Some("tok"));

        let body: SyncFolderBody =
            serde_json::from_str(r#"{"remoteFolderId":"F2","localContainerId":"E2"}"#).unwrap();
        assert_eq!(body.remote_folder_id.as_deref(), Some("F2"));
        assert_eq!(body.local_container_id.as_deref(), Some("E2"));
        assert!(body.access_token.is_none());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("x".into())), Some("x".to_string()));
    }

    #[test]
    fn test_sync_all_response_is_flat() {
        let response = SyncAllResponse {
            success: true,
            report: FleetReport {
                total_folders: 0,
                results: Vec::new(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["totalFolders"], 0);
        assert!(json["results"].as_array().unwrap().is_empty());
    }
}
