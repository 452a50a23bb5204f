// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! Decodes image files (and video poster frames) into RGBA pixel buffers
//! suitable for uploading as an egui texture. Video frame decoding is
//! external to this application: a video task ships a poster image plus a
//! declared frame count and rate.

use anyhow::{Context, Result};
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// A decoded image as straight (unmultiplied) RGBA bytes.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode an image file into RGBA pixels.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let result = load_image(Path::new("/nonexistent/media.png"));
        assert!(result.is_err());
    }

    #[test]
    fn decodes_a_png_round_trip() {
        let dir = std::env::temp_dir().join("lariat-media-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.png");

        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(loaded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&loaded.pixels[..4], &[10, 20, 30, 255]);

        std::fs::remove_file(&path).ok();
    }
}
