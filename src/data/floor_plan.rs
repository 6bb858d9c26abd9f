//! Floor-plan and branding images.

use anyhow::{Context, Result};
use base64::prelude::*;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Decoded background image. Its size defines the click canvas and the plot
/// extent of every rendered frame.
#[derive(Debug, Clone)]
pub struct FloorPlan {
    image: Arc<RgbaImage>,
}

impl FloorPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to open floor plan {}", path.display()))?
            .to_rgba8();
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn to_data_url(&self) -> Result<String> {
        png_data_url(&self.image)
    }
}

/// PNG-encode an image into bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .context("PNG encoding failed")?;
    Ok(buf.into_inner())
}

/// `data:image/png;base64,...` URL the webview can drop into an `<img>`.
pub fn png_data_url(image: &RgbaImage) -> Result<String> {
    let bytes = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", BASE64_STANDARD.encode(bytes)))
}

/// Read an image file as-is and inline it as a data URL, keeping its bytes.
pub fn file_data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let mime = match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        _ => "image/jpeg",
    };
    Ok(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)))
}
