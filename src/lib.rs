pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod mapping;
pub mod mode;
pub mod platform;
pub mod storage;
pub mod variants;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::client::{PexelsClient, SearchHit};
    pub use crate::config::{Settings, SourceConfig};
    pub use crate::credentials::{discover_api_key, key_from_file, resolve_api_key};
    pub use crate::error::Error;
    pub use crate::mapping::{extract_metadata, DownloadType};
    pub use crate::mode::Mode;
    pub use crate::platform::PlatformEnv;
    pub use crate::storage::FileStore;
    pub use crate::variants::{select_variant_link, size_to_rank, Variant};
}

pub use config::SourceConfig;
pub use error::{Error, Result};
pub use mode::Mode;
pub use variants::{select_variant_link, size_to_rank};
