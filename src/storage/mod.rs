//! Emulation backend abstraction

mod aws;
mod memory;
mod traits;

pub use aws::AwsBackend;
pub use memory::MemoryBackend;
pub use traits::{CloudBackend, StorageError};

use crate::config::BackendConfig;
use std::sync::Arc;

/// Build the backend selected by configuration
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn CloudBackend>, StorageError> {
    match config {
        BackendConfig::Aws { .. } => Ok(Arc::new(AwsBackend::new(config)?)),
        BackendConfig::Memory { region } => Ok(Arc::new(MemoryBackend::new(region.clone()))),
    }
}
