use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for the image file store
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write a new file; never replaces an existing one
    async fn put_new(&self, file_name: &str, bytes: &[u8]) -> Result<()>;

    /// Read file bytes, `None` when the file does not exist
    async fn get(&self, file_name: &str) -> std::io::Result<Option<Vec<u8>>>;

    /// Remove a file
    async fn remove(&self, file_name: &str) -> std::io::Result<()>;

    /// Check if a file exists
    async fn exists(&self, file_name: &str) -> bool;
}

/// Accepted upload subtypes; each one doubles as the stored file extension
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["png", "jpeg", "jpg", "gif"];

/// True for names of the form `<hex>.<accepted extension>`.
/// Anything else is refused before it reaches the filesystem.
pub fn is_stored_file_name(file_name: &str) -> bool {
    let Some((stem, extension)) = file_name.rsplit_once('.') else {
        return false;
    };

    !stem.is_empty()
        && stem.chars().all(|c| c.is_ascii_hexdigit())
        && ACCEPTED_EXTENSIONS.contains(&extension)
}

/// Content type for a stored file name
pub fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("jpeg") | Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
