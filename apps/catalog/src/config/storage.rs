use std::env;
use std::path::PathBuf;

/// Where cover images live and how clients address them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub image_root: PathBuf,
    pub public_base_url: String,
}

impl StorageSettings {
    /// `CATALOG_IMAGE_ROOT` (default `./data/covers`) and
    /// `CATALOG_IMAGE_BASE_URL` (default `/covers`).
    pub fn from_env() -> Self {
        Self {
            image_root: env::var("CATALOG_IMAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/covers")),
            public_base_url: env::var("CATALOG_IMAGE_BASE_URL")
                .unwrap_or_else(|_| "/covers".to_string()),
        }
    }
}
