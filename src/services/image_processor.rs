// src/services/image_processor.rs
use crate::errors::AppError;
use image::{GenericImageView, ImageFormat as ImgFormat};

const MAX_ACCEPTED_DIMENSION: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
}

pub struct ImageProcessor {
    max_dimension: u32,
}

impl ImageProcessor {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Checks the payload is a decodable PNG, JPEG or WEBP within size limits.
    /// The mime type comes from the content, never from the client.
    pub fn validate_image(&self, data: &[u8]) -> Result<ImageInfo, AppError> {
        if data.is_empty() {
            return Err(AppError::ImageProcessing("Image is empty".to_string()));
        }

        let format = image::guess_format(data)
            .map_err(|e| AppError::ImageProcessing(format!("Unrecognized image format: {}", e)))?;
        let mime_type = supported_mime_type(format).ok_or_else(|| {
            AppError::ImageProcessing(format!("Unsupported image format: {:?}", format))
        })?;

        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| AppError::ImageProcessing(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();

        if width > MAX_ACCEPTED_DIMENSION || height > MAX_ACCEPTED_DIMENSION {
            return Err(AppError::ImageProcessing(
                "Image dimensions exceed 4096x4096".to_string(),
            ));
        }

        Ok(ImageInfo {
            width,
            height,
            mime_type,
        })
    }

    /// Downscales to the configured maximum, re-encoding as PNG. Images that
    /// already fit are returned unchanged along with their own mime type.
    pub fn resize_if_needed(
        &self,
        data: &[u8],
        info: &ImageInfo,
    ) -> Result<(Vec<u8>, &'static str), AppError> {
        let max_size = self.max_dimension;
        if info.width <= max_size && info.height <= max_size {
            return Ok((data.to_vec(), info.mime_type));
        }

        let img = image::load_from_memory(data)
            .map_err(|e| AppError::ImageProcessing(format!("Failed to load image: {}", e)))?;

        let ratio = (max_size as f32 / info.width.max(info.height) as f32).min(1.0);
        let new_width = ((info.width as f32 * ratio) as u32).max(1);
        let new_height = ((info.height as f32 * ratio) as u32).max(1);

        let resized = img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3);

        let mut output = Vec::new();
        resized
            .write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
            .map_err(|e| {
                AppError::ImageProcessing(format!("Failed to encode resized image: {}", e))
            })?;

        Ok((output, "image/png"))
    }
}

fn supported_mime_type(format: ImgFormat) -> Option<&'static str> {
    match format {
        ImgFormat::Png => Some("image/png"),
        ImgFormat::Jpeg => Some("image/jpeg"),
        ImgFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Png)
    }

    pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Jpeg)
    }

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), format)
            .unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn accepts_png_and_jpeg_with_content_derived_mime() {
        let processor = ImageProcessor::new(2048);
        let png = processor.validate_image(&png_bytes(4, 3)).unwrap();
        assert_eq!((png.width, png.height, png.mime_type), (4, 3, "image/png"));
        let jpeg = processor.validate_image(&jpeg_bytes(4, 3)).unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");
    }

    #[test]
    fn rejects_empty_and_garbage_payloads() {
        let processor = ImageProcessor::new(2048);
        assert!(matches!(
            processor.validate_image(&[]),
            Err(AppError::ImageProcessing(_))
        ));
        assert!(processor.validate_image(b"hello world").is_err());
    }

    #[test]
    fn small_images_pass_through_unchanged() {
        let processor = ImageProcessor::new(16);
        let data = jpeg_bytes(8, 8);
        let info = processor.validate_image(&data).unwrap();
        let (out, mime) = processor.resize_if_needed(&data, &info).unwrap();
        assert_eq!(out, data);
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn large_images_are_downscaled_to_png() {
        let processor = ImageProcessor::new(10);
        let data = jpeg_bytes(40, 20);
        let info = processor.validate_image(&data).unwrap();
        let (out, mime) = processor.resize_if_needed(&data, &info).unwrap();
        assert_eq!(mime, "image/png");
        let resized = processor.validate_image(&out).unwrap();
        assert_eq!((resized.width, resized.height), (10, 5));
    }
}
