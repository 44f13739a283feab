//! Photo store: routes photo operations to the configured provider.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use civicwatch_core::config::StorageConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::storage::{ByteStream, StorageObjectMeta, StorageProvider};

use crate::providers::{LocalStorageProvider, S3StorageProvider};
use crate::thumbnail::ThumbnailGenerator;

/// Result of storing an issue photo.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredPhoto {
    /// Generated photo ID.
    pub photo_id: Uuid,
    /// Storage path of the original photo.
    pub path: String,
    /// Publicly reachable URL of the original photo.
    pub url: String,
    /// Storage paths of generated thumbnails, smallest first.
    pub thumbnail_paths: Vec<String>,
}

/// High-level photo storage facade over the configured provider.
///
/// Validates uploads against the configured size and content-type
/// limits, lays out the photo paths, and keeps thumbnails in sync with
/// the originals.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    provider: Arc<dyn StorageProvider>,
    thumbnails: ThumbnailGenerator,
    config: StorageConfig,
}

impl PhotoStore {
    /// Build the photo store from configuration, constructing the
    /// provider named by `storage.provider`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            "local" => Arc::new(LocalStorageProvider::new(&config.local.root_path).await?),
            "s3" => Arc::new(S3StorageProvider::new(&config.s3).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: {other}"
                )));
            }
        };

        info!(provider = provider.provider_type(), "Photo storage ready");

        Ok(Self {
            thumbnails: ThumbnailGenerator::new(provider.clone(), "thumbs"),
            provider,
            config: config.clone(),
        })
    }

    /// Construct a photo store around an existing provider (used in tests).
    pub fn with_provider(provider: Arc<dyn StorageProvider>, config: StorageConfig) -> Self {
        Self {
            thumbnails: ThumbnailGenerator::new(provider.clone(), "thumbs"),
            provider,
            config,
        }
    }

    /// The active provider type name ("local" or "s3").
    pub fn provider_type(&self) -> &str {
        self.provider.provider_type()
    }

    /// Check whether the underlying provider is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }

    /// Validate an upload against configured limits and return the file
    /// extension to store it under.
    pub fn validate_upload(&self, content_type: &str, size_bytes: u64) -> AppResult<&'static str> {
        if size_bytes == 0 {
            return Err(AppError::validation("Uploaded photo is empty"));
        }
        if size_bytes > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "Photo exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        if !self
            .config
            .allowed_content_types
            .iter()
            .any(|t| t == content_type)
        {
            return Err(AppError::validation(format!(
                "Unsupported photo content type: {content_type}"
            )));
        }
        extension_for(content_type)
            .ok_or_else(|| AppError::validation(format!("Unsupported photo content type: {content_type}")))
    }

    /// Store an issue photo and generate its thumbnails.
    ///
    /// Photos are uploaded before the issue row exists, so the path is
    /// keyed by the generated photo ID alone. Thumbnail failures are
    /// logged and tolerated; the original photo is the source of truth.
    pub async fn store_photo(&self, content_type: &str, data: Bytes) -> AppResult<StoredPhoto> {
        let ext = self.validate_upload(content_type, data.len() as u64)?;

        let photo_id = Uuid::new_v4();
        let path = format!("photos/{photo_id}.{ext}");

        self.provider.write(&path, data).await?;

        let thumbnail_paths = if ThumbnailGenerator::is_supported(content_type) {
            match self
                .thumbnails
                .generate_multiple(&path, photo_id, &self.config.thumbnail_sizes)
                .await
            {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(%photo_id, error = %e, "Thumbnail generation failed");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(StoredPhoto {
            photo_id,
            url: self.public_url(&path),
            path,
            thumbnail_paths,
        })
    }

    /// Store a user avatar. Avatars skip thumbnail generation; clients
    /// render them small to begin with.
    pub async fn store_avatar(
        &self,
        user_id: Uuid,
        content_type: &str,
        data: Bytes,
    ) -> AppResult<StoredPhoto> {
        let ext = self.validate_upload(content_type, data.len() as u64)?;

        let photo_id = Uuid::new_v4();
        let path = format!("avatars/{user_id}/{photo_id}.{ext}");

        self.provider.write(&path, data).await?;

        Ok(StoredPhoto {
            photo_id,
            url: self.public_url(&path),
            path,
            thumbnail_paths: Vec::new(),
        })
    }

    /// Read a stored photo as a byte stream.
    pub async fn read(&self, path: &str) -> AppResult<ByteStream> {
        self.provider.read(path).await
    }

    /// Metadata for a stored photo.
    pub async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta> {
        self.provider.metadata(path).await
    }

    /// Delete a stored photo and its thumbnails.
    pub async fn delete_photo(&self, path: &str) -> AppResult<()> {
        self.provider.delete(path).await?;

        if let Some(photo_id) = photo_id_from_path(path) {
            self.thumbnails
                .delete_thumbnails(photo_id, &self.config.thumbnail_sizes)
                .await?;
        }
        Ok(())
    }

    /// Publicly reachable URL for a stored path.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// File extension for an accepted photo content type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Extract the photo UUID from a stored path's file name.
fn photo_id_from_path(path: &str) -> Option<Uuid> {
    let file_name = path.rsplit('/').next()?;
    let stem = file_name.split('.').next()?;
    stem.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LocalStorageProvider;

    fn test_config() -> StorageConfig {
        StorageConfig {
            provider: "local".to_string(),
            max_upload_size_bytes: 1024,
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            thumbnail_sizes: vec![64],
            public_base_url: "http://localhost:8080/media/".to_string(),
            local: Default::default(),
            s3: Default::default(),
        }
    }

    async fn store_in(dir: &tempfile::TempDir) -> PhotoStore {
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        PhotoStore::with_provider(Arc::new(provider), test_config())
    }

    #[tokio::test]
    async fn test_validate_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        assert_eq!(store.validate_upload("image/jpeg", 512).unwrap(), "jpg");
        assert!(store.validate_upload("image/jpeg", 0).is_err());
        assert!(store.validate_upload("image/jpeg", 4096).is_err());
        assert!(store.validate_upload("application/pdf", 512).is_err());
    }

    #[tokio::test]
    async fn test_store_and_delete_photo() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let png = {
            use image::{ImageFormat, Rgb, RgbImage};
            let img = RgbImage::from_pixel(16, 16, Rgb([10, 20, 30]));
            let mut buf = std::io::Cursor::new(Vec::new());
            img.write_to(&mut buf, ImageFormat::Png).unwrap();
            Bytes::from(buf.into_inner())
        };

        let stored = store.store_photo("image/png", png).await.unwrap();
        assert_eq!(stored.path, format!("photos/{}.png", stored.photo_id));
        assert!(stored.url.starts_with("http://localhost:8080/media/photos/"));
        assert_eq!(stored.thumbnail_paths.len(), 1);

        let meta = store.metadata(&stored.path).await.unwrap();
        assert!(meta.size_bytes > 0);

        store.delete_photo(&stored.path).await.unwrap();
        assert!(store.metadata(&stored.path).await.is_err());
    }

    #[tokio::test]
    async fn test_store_avatar_has_no_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let user_id = Uuid::new_v4();
        let png = {
            use image::{ImageFormat, Rgb, RgbImage};
            let img = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
            let mut buf = std::io::Cursor::new(Vec::new());
            img.write_to(&mut buf, ImageFormat::Png).unwrap();
            Bytes::from(buf.into_inner())
        };

        let stored = store.store_avatar(user_id, "image/png", png).await.unwrap();
        assert!(stored.path.starts_with(&format!("avatars/{user_id}/")));
        assert!(stored.thumbnail_paths.is_empty());
    }

    #[test]
    fn test_photo_id_from_path() {
        let id = Uuid::new_v4();
        let path = format!("photos/{id}.jpg");
        assert_eq!(photo_id_from_path(&path), Some(id));
        assert_eq!(photo_id_from_path("photos/not-a-uuid.jpg"), None);
    }
}
