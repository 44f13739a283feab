//! Thumbnail generation for issue photos.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::ImageFormat;
use uuid::Uuid;

use civicwatch_core::error::{AppError, ErrorKind};
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::storage::StorageProvider;

/// Generates resized thumbnails for uploaded photos.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Storage provider for reading source photos and writing thumbnails.
    provider: Arc<dyn StorageProvider>,
    /// Thumbnail output directory path.
    output_dir: String,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator.
    pub fn new(provider: Arc<dyn StorageProvider>, output_dir: &str) -> Self {
        Self {
            provider,
            output_dir: output_dir.to_string(),
        }
    }

    /// Check if a content type is a supported image format for thumbnailing.
    pub fn is_supported(mime_type: &str) -> bool {
        matches!(
            mime_type,
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/bmp"
        )
    }

    /// Storage path of the thumbnail for a photo at the given size.
    pub fn thumbnail_path(&self, photo_id: Uuid, size: u32) -> String {
        format!("{}/{}/{}x{}.jpg", self.output_dir, photo_id, size, size)
    }

    /// Generate a thumbnail of the specified size.
    ///
    /// Returns the storage path of the generated thumbnail.
    pub async fn generate(&self, source_path: &str, photo_id: Uuid, size: u32) -> AppResult<String> {
        let source_bytes = self.provider.read_bytes(source_path).await?;

        let thumbnail_bytes =
            tokio::task::spawn_blocking(move || resize_image(&source_bytes, size))
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e)
                })??;

        let thumb_path = self.thumbnail_path(photo_id, size);

        self.provider.write(&thumb_path, thumbnail_bytes).await?;

        tracing::debug!(
            source = source_path,
            size,
            output = %thumb_path,
            "Generated thumbnail"
        );

        Ok(thumb_path)
    }

    /// Generate thumbnails at multiple sizes.
    pub async fn generate_multiple(
        &self,
        source_path: &str,
        photo_id: Uuid,
        sizes: &[u32],
    ) -> AppResult<Vec<String>> {
        let mut paths = Vec::new();
        for &size in sizes {
            let path = self.generate(source_path, photo_id, size).await?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Delete the thumbnails for a photo at the given sizes.
    pub async fn delete_thumbnails(&self, photo_id: Uuid, sizes: &[u32]) -> AppResult<()> {
        for &size in sizes {
            self.provider
                .delete(&self.thumbnail_path(photo_id, size))
                .await?;
        }
        Ok(())
    }
}

/// Resize an image to fit within a square bounding box, re-encoded as JPEG.
fn resize_image(data: &[u8], max_size: u32) -> AppResult<Bytes> {
    if data.is_empty() {
        return Err(AppError::validation("Empty image data"));
    }

    let img = image::load_from_memory(data)
        .map_err(|e| AppError::with_source(ErrorKind::Validation, "Unreadable image data", e))?;

    // JPEG has no alpha channel, so flatten before encoding.
    let resized = img.thumbnail(max_size, max_size).to_rgb8();

    let mut buf = Cursor::new(Vec::new());
    resized
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to encode thumbnail", e))?;

    Ok(Bytes::from(buf.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([120, 80, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_resize_shrinks_large_image() {
        let data = sample_png(640, 480);
        let thumb = resize_image(&data, 128).unwrap();

        let decoded = image::load_from_memory(&thumb).unwrap();
        assert!(decoded.width() <= 128);
        assert!(decoded.height() <= 128);
    }

    #[test]
    fn test_resize_rejects_garbage() {
        assert!(resize_image(&[], 128).is_err());
        assert!(resize_image(b"not an image", 128).is_err());
    }

    #[test]
    fn test_supported_formats() {
        assert!(ThumbnailGenerator::is_supported("image/jpeg"));
        assert!(ThumbnailGenerator::is_supported("image/webp"));
        assert!(!ThumbnailGenerator::is_supported("application/pdf"));
    }
}
