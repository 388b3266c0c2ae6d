//! Image normalizer - decode by extension, re-encode as JPEG

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use intake_core::constants::NORMALIZED_IMAGE_DPI;
use intake_core::models::{ConvertedFile, FileRecord, ImageMetadata, NormalizedMetadata};
use intake_core::naming::{base_name, extension};
use intake_storage::Storage;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::normalizer::{Normalizer, OutputLayout};

pub struct ImageNormalizer {
    storage: Arc<dyn Storage>,
    layout: OutputLayout,
    quality: u8,
}

impl ImageNormalizer {
    pub fn new(storage: Arc<dyn Storage>, layout: OutputLayout, quality: u8) -> Self {
        Self {
            storage,
            layout,
            quality,
        }
    }
}

/// Decoder for a lowercase extension. Only the formats accepted at upload decode.
fn format_for_extension(ext: &str) -> Result<ImageFormat, ConversionError> {
    match ext {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "gif" => Ok(ImageFormat::Gif),
        other => Err(ConversionError::UnsupportedImageFormat(format!(".{}", other))),
    }
}

/// Decode `data` as `format` and re-encode it as an RGB JPEG at `quality`.
pub fn transcode_to_jpeg(
    data: &[u8],
    format: ImageFormat,
    quality: u8,
) -> Result<(Vec<u8>, ImageMetadata), ConversionError> {
    let decoded =
        image::load_from_memory_with_format(data, format).map_err(ConversionError::Decode)?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
    encoder.encode_image(&rgb).map_err(ConversionError::Encode)?;

    let metadata = ImageMetadata {
        width,
        height,
        color_space: "RGB".to_string(),
        compression: "JPEG".to_string(),
        dpi: NORMALIZED_IMAGE_DPI,
        has_alpha: false,
    };

    Ok((encoded, metadata))
}

#[async_trait]
impl Normalizer for ImageNormalizer {
    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    async fn normalize(&self, record: &FileRecord) -> Result<ConvertedFile, ConversionError> {
        let ext = extension(&record.original_file_path).unwrap_or_default();
        let format = format_for_extension(&ext)?;

        let data = self
            .storage
            .read(&record.original_file_path)
            .await
            .map_err(|source| ConversionError::ReadOriginal {
                path: record.original_file_path.clone(),
                source,
            })?;

        let quality = self.quality;
        let (encoded, metadata) =
            tokio::task::spawn_blocking(move || transcode_to_jpeg(&data, format, quality))
                .await??;

        let output_key = self.layout.output_key(record, "jpg");
        let size = self
            .storage
            .write(&output_key, encoded)
            .await
            .map_err(|source| ConversionError::WriteOutput {
                path: output_key.clone(),
                source,
            })?;

        tracing::info!(
            output = %output_key,
            width = metadata.width,
            height = metadata.height,
            size_bytes = size,
            "Image normalized to JPEG"
        );

        Ok(ConvertedFile {
            file_name: base_name(&output_key).to_string(),
            file_path: output_key,
            size: size as i64,
            metadata: NormalizedMetadata::Image(metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::{Rgba, RgbaImage};
    use intake_core::models::FileKind;
    use intake_storage::LocalStorage;
    use std::io::Cursor;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 128]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        match format {
            ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .write_to(&mut cursor, format)
                .unwrap(),
            _ => img.write_to(&mut cursor, format).unwrap(),
        }
        buffer
    }

    fn record_for(path: &str) -> FileRecord {
        let now = Utc::now();
        let (directory, name) = path.rsplit_once('/').unwrap();
        FileRecord {
            id: Uuid::new_v4(),
            original_filename: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            file_name: name.to_string(),
            directory: directory.to_string(),
            slot: 1,
            original_file_path: path.to_string(),
            file_path: None,
            size: 0,
            file_kind: Some(FileKind::Image),
            metadata: None,
            caption: None,
            tag: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_transcode_png_with_alpha() {
        let png = create_test_image(500, 300, ImageFormat::Png);
        let (jpeg, meta) = transcode_to_jpeg(&png, ImageFormat::Png, 90).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!((meta.width, meta.height), (500, 300));
        assert_eq!(meta.color_space, "RGB");
        assert_eq!(meta.compression, "JPEG");
        assert_eq!(meta.dpi, 72);
        assert!(!meta.has_alpha);

        let reloaded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (500, 300));
    }

    #[test]
    fn test_transcode_is_deterministic() {
        let gif = create_test_image(16, 9, ImageFormat::Gif);
        let first = transcode_to_jpeg(&gif, ImageFormat::Gif, 90).unwrap();
        let second = transcode_to_jpeg(&gif, ImageFormat::Gif, 90).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transcode_rejects_garbage() {
        let result = transcode_to_jpeg(b"not an image", ImageFormat::Png, 90);
        assert!(matches!(result, Err(ConversionError::Decode(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            format_for_extension("bmp"),
            Err(ConversionError::UnsupportedImageFormat(_))
        ));
        assert_eq!(format_for_extension("jpeg").unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_normalize_writes_processed_jpeg() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let jpeg_in = create_test_image(40, 20, ImageFormat::Jpeg);
        storage
            .write("original/2026/10/19/3.jpg", jpeg_in)
            .await
            .unwrap();

        let normalizer =
            ImageNormalizer::new(storage.clone(), OutputLayout::new("original", "processed"), 90);
        let converted = normalizer
            .normalize(&record_for("original/2026/10/19/3.jpg"))
            .await
            .unwrap();

        assert_eq!(converted.file_path, "processed/2026/10/19/3.jpg");
        assert_eq!(converted.file_name, "3.jpg");
        let on_disk = storage.content_length(&converted.file_path).await.unwrap();
        assert_eq!(converted.size, on_disk as i64);
    }

    #[tokio::test]
    async fn test_normalize_missing_original() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let normalizer =
            ImageNormalizer::new(storage, OutputLayout::new("original", "processed"), 90);

        let result = normalizer
            .normalize(&record_for("original/2026/10/19/9.png"))
            .await;
        assert!(matches!(result, Err(ConversionError::ReadOriginal { .. })));
    }
}
