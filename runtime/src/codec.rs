//! QR code rendering and detection.
//!
//! Rendering uses `qrcode` for the module matrix and paints it into a
//! greyscale PNG with `image`. Detection decodes any raster format `image`
//! understands and hands the luma plane to `rqrr`.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use ticketgate_core::CodecError;
use ticketgate_core::environment::CodeCodec;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Largest rendered image side in pixels.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// QR codec with configurable module size and quiet zone.
#[derive(Debug, Clone, Copy)]
pub struct QrCodec {
    module_size: u32,
    border: u32,
    ec_level: EcLevel,
}

impl Default for QrCodec {
    /// 10px modules, 4-module border, low error correction
    fn default() -> Self {
        Self::new(10, 4)
    }
}

impl QrCodec {
    /// Create a codec rendering `module_size` pixels per module and a quiet
    /// zone `border` modules wide. A zero module size is raised to 1.
    ///
    /// Settings whose image would be wider than [`MAX_IMAGE_SIDE`] make
    /// [`CodeCodec::encode`] fail with [`CodecError::Render`].
    #[must_use]
    pub fn new(module_size: u32, border: u32) -> Self {
        Self {
            module_size: module_size.max(1),
            border,
            ec_level: EcLevel::L,
        }
    }

    /// Use a different error correction level
    #[must_use]
    pub const fn with_ec_level(mut self, ec_level: EcLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    /// Parse an error correction level name (`L`, `M`, `Q`, `H`).
    #[must_use]
    pub fn parse_ec_level(name: &str) -> Option<EcLevel> {
        match name.trim().to_ascii_uppercase().as_str() {
            "L" => Some(EcLevel::L),
            "M" => Some(EcLevel::M),
            "Q" => Some(EcLevel::Q),
            "H" => Some(EcLevel::H),
            _ => None,
        }
    }

    /// Side length in pixels of the rendered image for a code `modules` wide.
    ///
    /// Returns `None` when the settings would overflow or exceed
    /// [`MAX_IMAGE_SIDE`].
    fn image_side(&self, modules: u32) -> Option<u32> {
        self.border
            .checked_mul(2)
            .and_then(|quiet| quiet.checked_add(modules))
            .and_then(|total| total.checked_mul(self.module_size))
            .filter(|side| *side <= MAX_IMAGE_SIDE)
    }

    #[allow(clippy::cast_possible_truncation)] // QR codes are at most 177 modules wide
    fn render(&self, code: &QrCode) -> Result<GrayImage, CodecError> {
        let width = code.width();
        let modules = width as u32;
        let side = self.image_side(modules).ok_or_else(|| {
            CodecError::Render(format!(
                "{modules} modules at {}px with a {}-module border exceed {MAX_IMAGE_SIDE}px",
                self.module_size, self.border
            ))
        })?;
        let mut img = GrayImage::from_pixel(side, side, LIGHT);

        for (index, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let x0 = ((index % width) as u32 + self.border) * self.module_size;
            let y0 = ((index / width) as u32 + self.border) * self.module_size;
            for dy in 0..self.module_size {
                for dx in 0..self.module_size {
                    img.put_pixel(x0 + dx, y0 + dy, DARK);
                }
            }
        }

        Ok(img)
    }
}

impl CodeCodec for QrCodec {
    fn encode(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)
            .map_err(|e| CodecError::Render(e.to_string()))?;

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(self.render(&code)?)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| CodecError::Render(e.to_string()))?;

        Ok(png)
    }

    fn decode(&self, image: &[u8]) -> Result<Vec<String>, CodecError> {
        let luma = image::load_from_memory(image)
            .map_err(|e| CodecError::UnreadableImage(e.to_string()))?
            .to_luma8();

        let (width, height) = luma.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| {
                #[allow(clippy::cast_possible_truncation)] // bounded by the u32 dimensions
                let pixel = luma.get_pixel(x as u32, y as u32);
                pixel.0[0]
            },
        );

        let codes = prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(content),
                Err(e) => {
                    tracing::debug!(error = ?e, "Found a QR grid that could not be decoded");
                    None
                },
            })
            .collect();

        Ok(codes)
    }
}
