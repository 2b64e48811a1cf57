use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorResponse};
use crate::files::dto::{
    DeleteResponse, SearchParams, UpdateResponse, UploadResponse, UploadedFile,
};
use crate::files::repo::FileRecord;
use crate::files::service;
use crate::i18n::Translator;
use crate::state::AppState;

/// Pull the single `file` field out of the multipart body. Fields without a
/// filename, and any other field names, are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "multipart read failed");
        ApiError::Validation("error.no_file_uploaded")
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "multipart body read failed");
            ApiError::Validation("error.no_file_uploaded")
        })?;
        return Ok(Some(UploadedFile {
            filename,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

#[instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    t: Translator,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ErrorResponse> {
    let file = read_upload(&mut multipart)
        .await
        .map_err(|e| e.localize(&t))?;
    let record = service::upload(&state, user_id, file)
        .await
        .map_err(|e| e.localize(&t))?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: t.t("success.file_uploaded"),
            file_id: record.id,
            filename: record.filename,
            filepath: record.filepath,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_files(
    State(state): State<AppState>,
    t: Translator,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FileRecord>>, ErrorResponse> {
    let files = service::list(&state, user_id)
        .await
        .map_err(|e| e.localize(&t))?;
    Ok(Json(files))
}

#[instrument(skip(state))]
pub async fn search_files(
    State(state): State<AppState>,
    t: Translator,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FileRecord>>, ErrorResponse> {
    let files = service::search(&state, user_id, params.query.as_deref())
        .await
        .map_err(|e| e.localize(&t))?;
    Ok(Json(files))
}

#[instrument(skip(state, multipart))]
pub async fn update_file(
    State(state): State<AppState>,
    t: Translator,
    AuthUser(user_id): AuthUser,
    Path(file_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UpdateResponse>, ErrorResponse> {
    let file = read_upload(&mut multipart)
        .await
        .map_err(|e| e.localize(&t))?;
    let record = service::update(&state, user_id, file_id, file)
        .await
        .map_err(|e| e.localize(&t))?;

    Ok(Json(UpdateResponse {
        message: t.t("success.file_updated"),
        file_id: record.id,
        filename: record.filename,
        filepath: record.filepath,
    }))
}

#[instrument(skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    t: Translator,
    AuthUser(user_id): AuthUser,
    Path(file_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ErrorResponse> {
    service::delete(&state, user_id, file_id)
        .await
        .map_err(|e| e.localize(&t))?;

    Ok(Json(DeleteResponse {
        message: t.t("success.file_deleted"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_uses_camel_case() {
        let response = UploadResponse {
            message: "ok".into(),
            file_id: Uuid::new_v4(),
            filename: "report.pdf".into(),
            filepath: "uploads/report.pdf".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"fileId\""));
        assert!(json.contains("\"filepath\""));
    }
}
