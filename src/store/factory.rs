//! Store factory for creating block-list backends.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{StorageBackend, StoreConfig};

use super::{MemoryBlockStore, PersistentBlockStore, SharedBlockStore};

/// Resolve the data directory.
fn resolve_data_dir(config_path: Option<&std::path::Path>) -> PathBuf {
    if let Some(path) = config_path {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        return std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path);
    }

    dirs::data_dir()
        .map(|p| p.join("callblock"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Create a block-list store based on configuration.
pub async fn create_store(config: &StoreConfig) -> anyhow::Result<SharedBlockStore> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory block-list store (volatile)");
            Ok(Arc::new(MemoryBlockStore::new()))
        }
        StorageBackend::Fjall => {
            let data_dir = resolve_data_dir(config.fjall.path.as_deref());
            tracing::info!(path = %data_dir.display(), "using persistent block-list store");
            Ok(PersistentBlockStore::open(&data_dir).await? as SharedBlockStore)
        }
    }
}
