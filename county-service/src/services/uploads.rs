use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// Persists an uploaded icon and yields the public path clients fetch it at.
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn store(&self, original_name: &str, data: Vec<u8>) -> Result<String, AppError>;
}

/// Local filesystem store. Files land in `base_path` under a generated name
/// and are served back at `/uploads/<filename>` by the router.
pub struct LocalUploads {
    base_path: PathBuf,
}

pub const PUBLIC_PREFIX: &str = "/uploads";

impl LocalUploads {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }
}

#[async_trait]
impl UploadStore for LocalUploads {
    async fn store(&self, original_name: &str, data: Vec<u8>) -> Result<String, AppError> {
        let extension = std::path::Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.base_path.join(&filename), data).await?;

        Ok(format!("{}/{}", PUBLIC_PREFIX, filename))
    }
}
