pub mod backend;
pub mod local;

pub use backend::FileStore;
pub use local::LocalFileStore;

use crate::config::Config;
use std::sync::Arc;

/// Factory function to create the file store from configuration
pub fn create_storage(config: &Config) -> Arc<dyn FileStore> {
    tracing::info!("Storing uploads in {}", config.upload_dir.display());
    Arc::new(LocalFileStore::new(config.upload_dir.clone()))
}
