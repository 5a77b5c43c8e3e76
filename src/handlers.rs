use crate::auth::{secret_matches, title_from_headers, UploadAuth};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metadata::MetadataStore;
use crate::models::{ApiResponse, EditRequest, ListingQuery, FALLBACK_FILE_NAME};
use crate::render;
use crate::storage::backend::content_type_for;
use crate::storage::FileStore;
use crate::upload::{Upload, UploadPipeline};
use axum::{
    body::{Body, Bytes},
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Multipart field holding the image
const UPLOAD_FIELD: &str = "uploaded_image";

/// Image shown on the not-found page
const FALLBACK_IMAGE: &[u8] = include_bytes!("../assets/fail.png");

const FILE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<dyn MetadataStore>,
    pub files: Arc<dyn FileStore>,
    pub config: Config,
}

/// POST /upload - Store a screenshot and return its share URL
pub async fn upload_screenshot(
    State(state): State<AppState>,
    _auth: UploadAuth,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>> {
    let mut multipart = multipart
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {}", e)))?;

    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        upload = Some(Upload {
            bytes: bytes.to_vec(),
            content_type,
            title: title_from_headers(&headers),
        });
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let pipeline = UploadPipeline::new(
        state.metadata.as_ref(),
        state.files.as_ref(),
        &state.config.hash_salt,
    );
    let record = pipeline.process(upload, chrono::Utc::now()).await?;

    Ok(Json(ApiResponse::output(
        state.config.public_url(&record.hash),
    )))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload too large: {}", e.body_text()))
    } else {
        AppError::BadRequest(format!("Invalid multipart data: {}", e.body_text()))
    }
}

/// GET /ss/all?p= - Grid of every screenshot, newest first
pub async fn list_screenshots(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Html<String>> {
    if !secret_matches(query.p.as_deref(), &state.config.access_password) {
        return Err(AppError::Unauthorized("Invalid password.".to_string()));
    }

    let records = state.metadata.list_recent().await.unwrap_or_else(|e| {
        tracing::error!("Failed to list screenshots: {}", e);
        Vec::new()
    });

    let fragments = render::render_listing(&state.config, &records);
    tracing::debug!(
        "Listing {} screenshots in {} rows",
        records.len(),
        fragments.len()
    );

    Ok(Html(render::render_listing_page(&fragments)))
}

/// GET /ss/{slug} - Detail page, or the image file when the slug has an extension
pub async fn show_screenshot(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    if slug.contains('.') {
        return serve_file(&state, &slug).await;
    }

    let record = render::resolve_screenshot(state.metadata.as_ref(), &slug).await;
    if record.is_not_found() {
        tracing::debug!("No screenshot for slug {}", slug);
    }

    Html(render::render_detail_page(&state.config, &record)).into_response()
}

async fn serve_file(state: &AppState, file_name: &str) -> Response<Body> {
    if file_name == FALLBACK_FILE_NAME {
        return (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, FILE_CACHE_CONTROL),
            ],
            FALLBACK_IMAGE,
        )
            .into_response();
    }

    match state.files.get(file_name).await {
        Ok(Some(bytes)) => (
            [
                (header::CONTENT_TYPE, content_type_for(file_name)),
                (header::CACHE_CONTROL, FILE_CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", file_name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get file").into_response()
        }
    }
}

/// Parse an edit body and check its secret and hash
fn authorize_edit(config: &Config, body: &[u8]) -> Result<EditRequest> {
    // Some clients post the JSON body with a form content type,
    // so the body is parsed without looking at headers.
    let request: EditRequest = serde_json::from_slice(body).unwrap_or_default();

    let p = request.p.as_deref().filter(|p| !p.trim().is_empty());
    let hash_present = request
        .hash
        .as_deref()
        .is_some_and(|hash| !hash.trim().is_empty());

    if !hash_present || !secret_matches(p, &config.access_password) {
        return Err(AppError::Unauthorized(
            "Invalid password or payload.".to_string(),
        ));
    }

    Ok(request)
}

/// POST /ss/api - Rename a screenshot
pub async fn rename_screenshot(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>> {
    let request = authorize_edit(&state.config, &body)?;
    let hash = request.hash.unwrap_or_default();

    if state.metadata.find_by_hash(&hash).await?.is_none() {
        return Err(AppError::NotFound("No screenshot with that hash.".to_string()));
    }

    let title = request
        .title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Title must not be blank.".to_string()))?;

    if !state.metadata.update_title(&hash, &title).await? {
        return Err(AppError::NotFound("No screenshot with that hash.".to_string()));
    }
    tracing::info!("Renamed screenshot {}", hash);

    Ok(Json(ApiResponse::ok()))
}

/// DELETE /ss/api - Remove a screenshot row and then its file
pub async fn delete_screenshot(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>> {
    let request = authorize_edit(&state.config, &body)?;
    let hash = request.hash.unwrap_or_default();

    let record = state
        .metadata
        .find_by_hash(&hash)
        .await?
        .ok_or_else(|| AppError::NotFound("No screenshot with that hash.".to_string()))?;

    if !state.metadata.delete(&hash).await? {
        return Err(AppError::NotFound("No screenshot with that hash.".to_string()));
    }

    // The row is gone; a leftover file is only logged.
    if let Err(e) = state.files.remove(&record.file_name).await {
        tracing::warn!("Deleted {} but could not remove {}: {}", hash, record.file_name, e);
    }
    tracing::info!("Deleted screenshot {}", hash);

    Ok(Json(ApiResponse::ok()))
}
