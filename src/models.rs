use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Title shown when a slug does not resolve to a stored screenshot
pub const NOT_FOUND_TITLE: &str = "This page doesn't exist!";

/// Image served for the not-found page
pub const FALLBACK_FILE_NAME: &str = "fail.png";

const FALLBACK_LABEL: &str = "ERROR!";

/// One stored screenshot. Column names follow the table layout
/// `ID, HASH, FILE_NAME, FILE_TYPE, DATE_AND_TIME, WIDTH, HEIGHT, SIZE, TITLE`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ScreenshotRecord {
    pub id: i64,
    pub hash: String,
    pub file_name: String,
    pub file_type: String,
    #[sqlx(rename = "date_and_time")]
    pub uploaded_at: DateTime<Utc>,
    pub width: i32,
    pub height: i32,
    #[sqlx(rename = "size")]
    pub size_label: String,
    pub title: String,
}

impl ScreenshotRecord {
    /// Placeholder rendered for unknown or malformed slugs
    pub fn not_found() -> Self {
        ScreenshotRecord {
            id: 0,
            hash: String::new(),
            file_name: FALLBACK_FILE_NAME.to_string(),
            file_type: FALLBACK_LABEL.to_string(),
            uploaded_at: DateTime::<Utc>::default(),
            width: 0,
            height: 0,
            size_label: FALLBACK_LABEL.to_string(),
            title: NOT_FOUND_TITLE.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.id == 0 && self.hash.is_empty()
    }
}

/// Row values for an insert; the id is assigned by the database
#[derive(Debug, Clone, PartialEq)]
pub struct NewScreenshot {
    pub hash: String,
    pub file_name: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub width: i32,
    pub height: i32,
    pub size_label: String,
    pub title: String,
}

impl NewScreenshot {
    pub fn into_record(self, id: i64) -> ScreenshotRecord {
        ScreenshotRecord {
            id,
            hash: self.hash,
            file_name: self.file_name,
            file_type: self.file_type,
            uploaded_at: self.uploaded_at,
            width: self.width,
            height: self.height,
            size_label: self.size_label,
            title: self.title,
        }
    }
}

/// JSON envelope shared by the upload and edit endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        ApiResponse {
            success: true,
            output: None,
            error: None,
        }
    }

    pub fn output(output: String) -> Self {
        ApiResponse {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        ApiResponse {
            success: false,
            output: None,
            error: Some(message),
        }
    }
}

/// Body of `POST /ss/api` and `DELETE /ss/api`
#[derive(Debug, Default, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub p: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Query of `GET /ss/all`
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub p: Option<String>,
}
