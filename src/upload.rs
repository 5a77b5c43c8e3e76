use crate::error::{AppError, Result};
use crate::metadata::MetadataStore;
use crate::models::{NewScreenshot, ScreenshotRecord};
use crate::storage::backend::ACCEPTED_EXTENSIONS;
use crate::storage::FileStore;
use chrono::{DateTime, SubsecRound, Utc};
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Length of the public identifier in hex characters
pub const HASH_LEN: usize = 40;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// An image received from the upload endpoint
#[derive(Debug)]
pub struct Upload {
    pub bytes: Vec<u8>,
    /// MIME type declared by the client, e.g. `image/png`
    pub content_type: String,
    pub title: String,
}

/// Human readable size, e.g. `12.34 kB`
pub fn format_size_units(bytes: u64) -> String {
    if bytes >= GIB {
        format!("{} GB", format_two_decimals(bytes as f64 / GIB as f64))
    } else if bytes >= MIB {
        format!("{} MB", format_two_decimals(bytes as f64 / MIB as f64))
    } else if bytes >= KIB {
        format!("{} kB", format_two_decimals(bytes as f64 / KIB as f64))
    } else if bytes > 1 {
        format!("{} bytes", bytes)
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        "0 bytes".to_string()
    }
}

/// Two decimals with `,` grouping of the integer part.
/// Ties round away from zero, so 1.125 becomes 1.13.
fn format_two_decimals(value: f64) -> String {
    let value = (value * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", value);
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}.{}", grouped, fraction)
}

/// Subtype of the declared MIME type when it is an accepted image format.
/// The subtype is also the stored file extension.
pub fn accepted_extension(content_type: &str) -> Result<&str> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let subtype = essence.rsplit('/').next().unwrap_or(essence);

    if ACCEPTED_EXTENSIONS.contains(&subtype) {
        Ok(subtype)
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "File format not accepted. Must be one of: \"{}\".",
            ACCEPTED_EXTENSIONS.join("/")
        )))
    }
}

/// 40 hex characters of SHA-256 over salt, file content and upload second
pub fn compute_hash(salt: &str, bytes: &[u8], uploaded_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(bytes);
    hasher.update(uploaded_at.timestamp().to_string().as_bytes());

    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(HASH_LEN);
    hash
}

/// Pixel dimensions read from the image header
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::InvalidImage(e.to_string()))?
        .into_dimensions()
        .map_err(|e| AppError::InvalidImage(e.to_string()))
}

/// Validates, stores and records uploads
pub struct UploadPipeline<'a> {
    metadata: &'a dyn MetadataStore,
    files: &'a dyn FileStore,
    salt: &'a str,
}

impl<'a> UploadPipeline<'a> {
    pub fn new(metadata: &'a dyn MetadataStore, files: &'a dyn FileStore, salt: &'a str) -> Self {
        UploadPipeline {
            metadata,
            files,
            salt,
        }
    }

    /// Store an upload received at `now` and return its record.
    /// Nothing is written unless the type and image checks pass.
    pub async fn process(&self, upload: Upload, now: DateTime<Utc>) -> Result<ScreenshotRecord> {
        let extension = accepted_extension(&upload.content_type)?.to_string();
        let uploaded_at = now.trunc_subsecs(0);

        let size_label = format_size_units(upload.bytes.len() as u64);
        let hash = compute_hash(self.salt, &upload.bytes, uploaded_at);
        let file_name = format!("{}.{}", hash, extension);

        let (width, height) = image_dimensions(&upload.bytes)?;

        self.metadata.ensure_schema().await?;

        if let Some(existing) = self.metadata.find_by_hash(&hash).await? {
            tracing::info!("Upload {} already stored, returning existing record", hash);
            return Ok(existing);
        }

        self.files.put_new(&file_name, &upload.bytes).await?;

        let screenshot = NewScreenshot {
            hash,
            file_name,
            file_type: upload.content_type,
            uploaded_at,
            width: dimension(width)?,
            height: dimension(height)?,
            size_label,
            title: upload.title,
        };

        match self.metadata.insert(screenshot.clone()).await {
            Ok(record) => {
                tracing::info!(
                    "Stored screenshot {} ({}, {}x{}, {})",
                    record.hash,
                    record.file_type,
                    record.width,
                    record.height,
                    record.size_label
                );
                Ok(record)
            }
            Err(e) => {
                tracing::error!("Failed to save screenshot {}: {}", screenshot.hash, e);
                if let Err(remove_err) = self.files.remove(&screenshot.file_name).await {
                    tracing::warn!(
                        "Could not remove {} after failed insert: {}",
                        screenshot.file_name,
                        remove_err
                    );
                }
                Err(AppError::Persistence(e))
            }
        }
    }
}

fn dimension(value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| AppError::InvalidImage(format!("Dimension {} out of range", value)))
}
