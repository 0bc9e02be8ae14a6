use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{cache, error_result_for, prompts};
use crate::errors::AppError;
use crate::hash::content_hash;
use crate::models::analysis::{AnalysisHistoryEntry, AnalysisResult};
use crate::models::creative::{CreativeFormat, FormatGroup, Language};
use crate::state::AppState;

/// An uploaded creative plus the analysis parameters, decoded from
/// multipart form data.
struct AnalyzeUpload {
    bytes: Vec<u8>,
    filename: String,
    mime_type: String,
    client_id: String,
    language: Language,
    format_group: FormatGroup,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    /// True when the verdict came from the 48h cache instead of a fresh call.
    pub cached: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecheckResponse {
    pub hash: String,
    /// Aspect classification, when the caller supplied pixel dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<CreativeFormat>,
    pub duplicate: Option<DuplicateUpload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateUpload {
    pub client_id: String,
    pub client_name: Option<String>,
    pub filename: String,
}

/// POST /api/v1/creatives/precheck
///
/// Hashes the uploaded file and reports whether the exact same creative
/// (hash + filename + size) was analyzed before. On a match the caller
/// skips client selection and re-analysis, auto-associating the upload
/// with the matched entry's client.
pub async fn handle_precheck(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PrecheckResponse>, AppError> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("creative").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file field: {e}")))?;
                file = Some((bytes.to_vec(), filename));
            }
            Some("width") => width = read_text_field(field).await?.trim().parse().ok(),
            Some("height") => height = read_text_field(field).await?.trim().parse().ok(),
            _ => {}
        }
    }

    let (bytes, filename) = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let hash = content_hash(&bytes);
    let size = bytes.len() as u64;
    let format = width
        .zip(height)
        .map(|(w, h)| CreativeFormat::from_dimensions(w, h));

    let duplicate = cache::find_duplicate_upload(&state.repo, &hash, &filename, size).map(|entry| {
        let client_name = state.repo.find_client(&entry.client_id).map(|c| c.name);
        DuplicateUpload {
            client_id: entry.client_id,
            client_name,
            filename: entry.filename,
        }
    });

    Ok(Json(PrecheckResponse { hash, format, duplicate }))
}

/// POST /api/v1/creatives/analyze
///
/// The full pipeline: hash → cache lookup → (miss) context build → Gemini
/// call → cache + history record. Remote failures come back as
/// error-shaped results with HTTP 200; they are never cached or recorded.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let upload = decode_analyze_upload(multipart).await?;

    if state.repo.find_client(&upload.client_id).is_none() {
        return Err(AppError::NotFound(format!("Client {} not found", upload.client_id)));
    }
    state
        .repo
        .set_current_client_id(&upload.client_id)
        .map_err(AppError::Storage)?;

    let hash = content_hash(&upload.bytes);
    let now = Utc::now();

    if let Some(result) = cache::lookup(
        &state.repo,
        &hash,
        &upload.client_id,
        upload.language,
        upload.format_group,
        now,
    ) {
        info!("Cache hit for creative {hash} (client {})", upload.client_id);
        return Ok(Json(AnalyzeResponse { result, cached: true }));
    }

    let context = cache::build_context(&state.repo, &upload.client_id, upload.language);
    let prompt = prompts::build_analysis_prompt(upload.format_group, upload.language, &context);

    let result = match state
        .llm
        .analyze(&upload.bytes, &upload.mime_type, &prompt, prompts::analysis_schema())
        .await
    {
        Ok(result) => result,
        Err(e) => {
            warn!("Analysis failed for creative {hash}: {e}");
            error_result_for(&e, upload.language)
        }
    };

    if !cache::is_error_result(&result) {
        // Append-then-persist is not atomic; the UI serializes uploads, so
        // a single writer holds this path at a time.
        cache::store(
            &state.repo,
            &hash,
            &upload.client_id,
            upload.language,
            upload.format_group,
            &result,
            now,
        )
        .map_err(AppError::Storage)?;
        state
            .repo
            .push_history_bounded(AnalysisHistoryEntry {
                client_id: upload.client_id.clone(),
                filename: upload.filename.clone(),
                hash,
                size: upload.bytes.len() as u64,
                date: now,
                description: result.creative_description.clone(),
            })
            .map_err(AppError::Storage)?;
    }

    Ok(Json(AnalyzeResponse { result, cached: false }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub client_id: Option<String>,
}

/// GET /api/v1/history
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Json<Vec<AnalysisHistoryEntry>> {
    let history = state.repo.history();
    match params.client_id {
        Some(client_id) => Json(
            history
                .into_iter()
                .filter(|e| e.client_id == client_id)
                .collect(),
        ),
        None => Json(history),
    }
}

async fn decode_analyze_upload(mut multipart: Multipart) -> Result<AnalyzeUpload, AppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut client_id = None;
    let mut language = None;
    let mut format_group = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("creative").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file field: {e}")))?;
                file = Some((bytes.to_vec(), filename, mime_type));
            }
            Some("client_id") => client_id = Some(read_text_field(field).await?),
            Some("language") => {
                let raw = read_text_field(field).await?;
                language = Some(parse_language(&raw)?);
            }
            Some("format_group") => {
                let raw = read_text_field(field).await?;
                format_group = Some(parse_format_group(&raw)?);
            }
            _ => {}
        }
    }

    let (bytes, filename, mime_type) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }

    Ok(AnalyzeUpload {
        bytes,
        filename,
        mime_type,
        client_id: client_id.ok_or_else(|| AppError::Validation("Missing 'client_id' field".into()))?,
        language: language.ok_or_else(|| AppError::Validation("Missing 'language' field".into()))?,
        format_group: format_group
            .ok_or_else(|| AppError::Validation("Missing 'format_group' field".into()))?,
    })
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))
}

fn parse_language(raw: &str) -> Result<Language, AppError> {
    match raw {
        "es" => Ok(Language::Es),
        "en" => Ok(Language::En),
        other => Err(AppError::Validation(format!("Unknown language '{other}'"))),
    }
}

fn parse_format_group(raw: &str) -> Result<FormatGroup, AppError> {
    match raw {
        "SQUARE_LIKE" => Ok(FormatGroup::SquareLike),
        "VERTICAL" => Ok(FormatGroup::Vertical),
        other => Err(AppError::Validation(format!("Unknown format group '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("es").unwrap(), Language::Es);
        assert_eq!(parse_language("en").unwrap(), Language::En);
        assert!(parse_language("fr").is_err());
    }

    #[test]
    fn test_parse_format_group() {
        assert_eq!(parse_format_group("SQUARE_LIKE").unwrap(), FormatGroup::SquareLike);
        assert_eq!(parse_format_group("VERTICAL").unwrap(), FormatGroup::Vertical);
        assert!(parse_format_group("WIDE").is_err());
    }
}
