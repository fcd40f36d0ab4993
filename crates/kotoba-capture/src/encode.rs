use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use kotoba_types::{ImageBuffer, ImageMime};

use crate::device::Frame;
use crate::error::CaptureError;

/// Encode a frame at its native resolution as JPEG
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<ImageBuffer, CaptureError> {
    if !frame.has_dimensions() {
        return Err(CaptureError::NotReady);
    }

    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.rgb.len() != expected {
        return Err(CaptureError::Encode(format!(
            "frame is {}x{} but carries {} bytes",
            frame.width,
            frame.height,
            frame.rgb.len()
        )));
    }

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(
            &frame.rgb,
            frame.width,
            frame.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    Ok(ImageBuffer::new(buffer, ImageMime::Jpeg).with_dimensions(frame.width, frame.height))
}

/// Read an image from local storage without re-encoding it
pub async fn load_image_file(path: &Path) -> Result<ImageBuffer, CaptureError> {
    let bytes = tokio::fs::read(path).await?;
    image_from_bytes(bytes)
}

pub fn image_from_bytes(bytes: Vec<u8>) -> Result<ImageBuffer, CaptureError> {
    if bytes.is_empty() {
        return Err(CaptureError::UnsupportedImage("file is empty".to_string()));
    }

    let format = image::guess_format(&bytes)
        .map_err(|_| CaptureError::UnsupportedImage("unrecognized format".to_string()))?;

    let mime = match format {
        ImageFormat::Jpeg => ImageMime::Jpeg,
        ImageFormat::Png => ImageMime::Png,
        ImageFormat::WebP => ImageMime::Webp,
        ImageFormat::Gif => ImageMime::Gif,
        other => {
            return Err(CaptureError::UnsupportedImage(format!("{:?}", other)));
        }
    };

    let dimensions = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .ok();

    let image = ImageBuffer::new(bytes, mime);
    Ok(match dimensions {
        Some((width, height)) => image.with_dimensions(width, height),
        None => image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let rgb = (0..width * height)
            .flat_map(|i| [(i % 256) as u8, 128, 64])
            .collect();
        Frame::new(width, height, rgb)
    }

    #[test]
    fn test_encode_jpeg_keeps_native_resolution() {
        let image = encode_jpeg(&gradient(64, 48), 80).unwrap();

        assert_eq!(image.mime, ImageMime::Jpeg);
        assert_eq!(image.width, Some(64));
        assert_eq!(image.height, Some(48));
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_encode_rejects_zero_size() {
        let result = encode_jpeg(&Frame::new(0, 0, vec![]), 80);
        assert!(matches!(result, Err(CaptureError::NotReady)));
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let result = encode_jpeg(&Frame::new(4, 4, vec![0; 10]), 80);
        assert!(matches!(result, Err(CaptureError::Encode(_))));
    }

    #[test]
    fn test_image_from_png_bytes() {
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(&[255u8; 3 * 5 * 2], 5, 2, ExtendedColorType::Rgb8)
            .unwrap();

        let image = image_from_bytes(png.clone()).unwrap();
        assert_eq!(image.mime, ImageMime::Png);
        assert_eq!(image.bytes, png);
        assert_eq!((image.width, image.height), (Some(5), Some(2)));
    }

    #[test]
    fn test_image_from_text_is_rejected() {
        let result = image_from_bytes(b"just some notes".to_vec());
        assert!(matches!(result, Err(CaptureError::UnsupportedImage(_))));
        assert!(matches!(
            image_from_bytes(vec![]),
            Err(CaptureError::UnsupportedImage(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_image_file(Path::new("/definitely/not/here.jpg")).await;
        assert!(matches!(result, Err(CaptureError::IoError(_))));
    }
}
