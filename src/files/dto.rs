use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One file pulled out of the multipart body, with the client's declared
/// metadata. Nothing here has been sniffed or sanitized.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_id: Uuid,
    pub filename: String,
    pub filepath: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub message: String,
    pub file_id: Uuid,
    pub filename: String,
    pub filepath: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}
