use crate::error::AppError;
use crate::handlers::AppState;
use axum::http::HeaderMap;

/// Header carrying the upload secret
pub const UPLOAD_PASSWORD_HEADER: &str = "uploadpassword";

/// Header carrying the optional screenshot title
pub const TITLE_HEADER: &str = "title";

/// True when `candidate` is present and equals `secret`
pub fn secret_matches(candidate: Option<&str>, secret: &str) -> bool {
    matches!(candidate, Some(value) if !secret.is_empty() && value == secret)
}

/// Title header, empty when absent. Non-ASCII bytes are accepted as UTF-8.
pub fn title_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(TITLE_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// Marker struct to indicate the upload secret was presented
pub struct UploadAuth;

impl std::fmt::Debug for UploadAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UploadAuth").finish()
    }
}

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for UploadAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(UPLOAD_PASSWORD_HEADER)
            .and_then(|value| value.to_str().ok());

        if !secret_matches(presented, &state.config.upload_password) {
            tracing::debug!("Rejected upload with missing or wrong password");
            return Err(AppError::Unauthorized("Invalid password.".to_string()));
        }

        Ok(UploadAuth)
    }
}
