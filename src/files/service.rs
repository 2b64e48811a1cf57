use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::files::dto::UploadedFile;
use crate::files::repo::FileRecord;
use crate::queue::FileJob;
use crate::state::AppState;

const PDF_MIME: &str = "application/pdf";

/// Presence and declared-type check shared by upload and update. The type
/// is taken at face value; no content sniffing happens anywhere.
fn validate_pdf(file: Option<UploadedFile>) -> Result<UploadedFile, ApiError> {
    let file = file.ok_or(ApiError::Validation("error.no_file_uploaded"))?;
    if file.content_type.as_deref() != Some(PDF_MIME) {
        warn!(
            content_type = file.content_type.as_deref().unwrap_or("none"),
            "rejected non-PDF upload"
        );
        return Err(ApiError::Validation("error.invalid_file_type"));
    }
    Ok(file)
}

/// Blob first, then record. If the insert fails the blob stays behind on
/// disk; nothing reconciles it.
pub async fn upload(
    state: &AppState,
    user_id: Uuid,
    file: Option<UploadedFile>,
) -> Result<FileRecord, ApiError> {
    let file = validate_pdf(file)?;

    let filepath = state
        .storage
        .put(&file.filename, file.bytes)
        .await
        .map_err(|e| {
            error!(error = %e, filename = %file.filename, "blob write failed");
            ApiError::Internal("error.upload_failed")
        })?;

    let record = FileRecord::insert(&state.db, user_id, &file.filename, &filepath)
        .await
        .map_err(|e| {
            error!(error = %e, filename = %file.filename, "file record insert failed");
            ApiError::Internal("error.upload_failed")
        })?;

    let job = FileJob {
        file_id: record.id,
        user_id,
        filename: record.filename.clone(),
    };
    if let Err(e) = state.queue.dispatch(job).await {
        warn!(error = %e, file_id = %record.id, "job dispatch failed; ignoring");
    }

    info!(file_id = %record.id, user_id = %user_id, "file uploaded");
    Ok(record)
}

pub async fn list(state: &AppState, user_id: Uuid) -> Result<Vec<FileRecord>, ApiError> {
    let files = FileRecord::list_by_owner(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "list files failed");
            ApiError::Internal("error.fetch_failed")
        })?;
    if files.is_empty() {
        return Err(ApiError::NoResults("error.no_files_found"));
    }
    Ok(files)
}

pub async fn search(
    state: &AppState,
    user_id: Uuid,
    query: Option<&str>,
) -> Result<Vec<FileRecord>, ApiError> {
    let query = query
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::Validation("error.search_query_required"))?;

    let files = FileRecord::search_by_filename(&state.db, user_id, query)
        .await
        .map_err(|e| {
            error!(error = %e, "search failed");
            ApiError::Internal("error.search_failed")
        })?;
    if files.is_empty() {
        return Err(ApiError::NoResults("error.no_files_found"));
    }
    Ok(files)
}

/// Blob removal comes first and is load-bearing: if the bytes cannot be
/// deleted, the record survives and the stored state stays consistent.
pub async fn delete(state: &AppState, user_id: Uuid, file_id: Uuid) -> Result<(), ApiError> {
    let record = FileRecord::find_owned(&state.db, user_id, file_id)
        .await
        .map_err(|e| {
            error!(error = %e, "find file failed");
            ApiError::Internal("error.internal")
        })?
        .ok_or(ApiError::NotFound("error.file_not_found"))?;

    state.storage.remove(&record.filepath).await.map_err(|e| {
        error!(error = %e, filepath = %record.filepath, "blob removal failed");
        ApiError::Internal("error.file_deletion_failed")
    })?;

    FileRecord::delete(&state.db, user_id, file_id)
        .await
        .map_err(|e| {
            error!(error = %e, "file record delete failed");
            ApiError::Internal("error.internal")
        })?;

    info!(%file_id, %user_id, "file deleted");
    Ok(())
}

/// Same ordering rationale as delete: the old blob goes first, and a failed
/// removal aborts before the new bytes or the record are touched. The
/// record id is stable across the update.
pub async fn update(
    state: &AppState,
    user_id: Uuid,
    file_id: Uuid,
    file: Option<UploadedFile>,
) -> Result<FileRecord, ApiError> {
    let file = validate_pdf(file)?;

    let old = FileRecord::find_owned(&state.db, user_id, file_id)
        .await
        .map_err(|e| {
            error!(error = %e, "find file failed");
            ApiError::Internal("error.internal")
        })?
        .ok_or(ApiError::NotFound("error.file_not_found"))?;

    state.storage.remove(&old.filepath).await.map_err(|e| {
        error!(error = %e, filepath = %old.filepath, "old blob removal failed");
        ApiError::Internal("error.file_deletion_failed")
    })?;

    let filepath = state
        .storage
        .put(&file.filename, file.bytes)
        .await
        .map_err(|e| {
            error!(error = %e, filename = %file.filename, "blob write failed");
            ApiError::Internal("error.update_failed")
        })?;

    FileRecord::update_content(&state.db, user_id, file_id, &file.filename, &filepath)
        .await
        .map_err(|e| {
            error!(error = %e, "file record update failed");
            ApiError::Internal("error.update_failed")
        })?;

    info!(%file_id, %user_id, "file updated");
    Ok(FileRecord {
        filename: file.filename,
        filepath,
        ..old
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn pdf_file() -> UploadedFile {
        UploadedFile {
            filename: "report.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[test]
    fn validate_requires_a_file() {
        let err = validate_pdf(None).unwrap_err();
        assert!(matches!(err, ApiError::Validation("error.no_file_uploaded")));
    }

    #[test]
    fn validate_rejects_non_pdf_declared_types() {
        for ct in [Some("image/png"), Some("application/PDF"), Some("text/plain"), None] {
            let mut file = pdf_file();
            file.content_type = ct.map(str::to_string);
            let err = validate_pdf(Some(file)).unwrap_err();
            assert!(
                matches!(err, ApiError::Validation("error.invalid_file_type")),
                "content type: {ct:?}"
            );
        }
    }

    #[test]
    fn validate_passes_exact_pdf_type_through() {
        let file = validate_pdf(Some(pdf_file())).expect("pdf accepted");
        assert_eq!(file.filename, "report.pdf");
    }

    #[tokio::test]
    async fn search_without_query_is_a_validation_error() {
        let state = AppState::fake();
        let err = search(&state, Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation("error.search_query_required")
        ));
        let err = search(&state, Uuid::new_v4(), Some("")).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation("error.search_query_required")
        ));
    }

    #[tokio::test]
    async fn upload_rejects_before_any_storage_effect() {
        // Validation failures must come back before the blob store or the
        // database are touched; the fake state's lazy pool would error on
        // first use, so reaching it would change the error kind.
        let state = AppState::fake();
        let mut file = pdf_file();
        file.content_type = Some("text/plain".into());
        let err = upload(&state, Uuid::new_v4(), Some(file)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation("error.invalid_file_type")));
    }
}
