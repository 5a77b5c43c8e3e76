use super::backend::{is_stored_file_name, FileStore};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Screenshots kept as plain files in one directory
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFileStore { root: root.into() }
    }

    fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        is_stored_file_name(file_name).then(|| self.root.join(file_name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put_new(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        let file_path = self
            .path_for(file_name)
            .ok_or_else(|| AppError::StorageWrite(format!("Refusing file name {}", file_name)))?;

        // Create directory if it doesn't exist
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::StorageWrite(format!("Failed to create {}: {}", self.root.display(), e))
        })?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .map_err(|e| {
                AppError::StorageWrite(format!("Failed to create {}: {}", file_path.display(), e))
            })?;

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&file_path).await;
            return Err(AppError::StorageWrite(format!(
                "Failed to write {}: {}",
                file_path.display(),
                e
            )));
        }

        tracing::debug!("Saved file to {:?}", file_path);
        Ok(())
    }

    async fn get(&self, file_name: &str) -> std::io::Result<Option<Vec<u8>>> {
        let Some(file_path) = self.path_for(file_name) else {
            return Ok(None);
        };

        match tokio::fs::read(&file_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, file_name: &str) -> std::io::Result<()> {
        let file_path = self.path_for(file_name).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Refusing file name {}", file_name),
            )
        })?;

        tokio::fs::remove_file(&file_path).await?;
        tracing::debug!("Removed file {:?}", file_path);
        Ok(())
    }

    async fn exists(&self, file_name: &str) -> bool {
        match self.path_for(file_name) {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }
}
