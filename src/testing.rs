//! In-memory stand-ins for the storage traits, shared by unit tests.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metadata::MetadataStore;
use crate::models::{NewScreenshot, ScreenshotRecord};
use crate::storage::FileStore;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const UPLOAD_PASSWORD: &str = "upload-secret";
pub const ACCESS_PASSWORD: &str = "access-secret";

pub fn test_config(upload_dir: &str) -> Config {
    Config {
        database: crate::config::connect_options_from_parts("localhost", "ss", "", "ss"),
        table_name: "screenshots".to_string(),
        upload_dir: upload_dir.into(),
        upload_password: UPLOAD_PASSWORD.to_string(),
        access_password: ACCESS_PASSWORD.to_string(),
        hash_salt: "salt".to_string(),
        base_url: "http://shots.test".to_string(),
        server_port: 3000,
        max_upload_bytes: 1024 * 1024,
        listing_columns: 4,
        listing_show_partial_row: false,
    }
}

/// Encode a small solid image in the given format
pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = match format {
        ImageFormat::Gif => DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([200, 40, 40, 255]),
        )),
        _ => DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 40, 40]),
        )),
    };

    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

/// Metadata table kept in a vector
#[derive(Default)]
pub struct MemoryMetadataStore {
    rows: Mutex<Vec<ScreenshotRecord>>,
    lookups: AtomicUsize,
    schema_ensured: AtomicBool,
    fail_inserts: AtomicBool,
    delete_before_update: AtomicBool,
}

impl MemoryMetadataStore {
    pub fn with_records(records: Vec<ScreenshotRecord>) -> Self {
        let store = Self::default();
        *store.rows.lock().unwrap() = records;
        store
    }

    /// Number of `find_by_hash` calls so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn schema_ensured(&self) -> bool {
        self.schema_ensured.load(Ordering::SeqCst)
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    /// Rows disappear between the lookup and the title update
    pub fn delete_before_update(&self) {
        self.delete_before_update.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn ensure_schema(&self) -> std::result::Result<(), sqlx::Error> {
        self.schema_ensured.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert(
        &self,
        screenshot: NewScreenshot,
    ) -> std::result::Result<ScreenshotRecord, sqlx::Error> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.hash == screenshot.hash) {
            return Err(sqlx::Error::Protocol("duplicate HASH".to_string()));
        }

        let id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        let record = screenshot.into_record(id);
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_hash(
        &self,
        hash: &str,
    ) -> std::result::Result<Option<ScreenshotRecord>, sqlx::Error> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|row| row.hash == hash).cloned())
    }

    async fn list_recent(&self) -> std::result::Result<Vec<ScreenshotRecord>, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update_title(
        &self,
        hash: &str,
        title: &str,
    ) -> std::result::Result<bool, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap();
        if self.delete_before_update.load(Ordering::SeqCst) {
            rows.retain(|row| row.hash != hash);
        }
        match rows.iter_mut().find(|row| row.hash == hash) {
            Some(row) => {
                row.title = title.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, hash: &str) -> std::result::Result<bool, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.hash != hash);
        Ok(rows.len() != before)
    }
}

/// File store kept in a map
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryFileStore {
    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put_new(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::StorageWrite("read-only".to_string()));
        }

        let mut files = self.files.lock().unwrap();
        if files.contains_key(file_name) {
            return Err(AppError::StorageWrite(format!("{} exists", file_name)));
        }
        files.insert(file_name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, file_name: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.files.lock().unwrap().get(file_name).cloned())
    }

    async fn remove(&self, file_name: &str) -> std::io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .remove(file_name)
            .map(|_| ())
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    async fn exists(&self, file_name: &str) -> bool {
        self.files.lock().unwrap().contains_key(file_name)
    }
}
