//! Grayscale reference raster and bilinear sampling.
//!
//! The raster is immutable once built. It keeps either 8-bit or 16-bit
//! samples as decoded; nothing is rescaled, so vessel measurements see
//! the full precision of the source.

use image::{ColorType, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

use crate::geom::Vec2;
use crate::types::{Dimensions, GrayImage, RasterError};

/// 16-bit single-channel image buffer.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Sample format of a [`Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// One byte per sample.
    Gray8,
    /// Two bytes per sample.
    Gray16,
}

impl PixelFormat {
    /// Largest representable sample value.
    #[must_use]
    pub const fn max_value(self) -> f64 {
        match self {
            Self::Gray8 => 255.0,
            Self::Gray16 => 65535.0,
        }
    }

    /// Bytes per sample.
    #[must_use]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Gray16 => 2,
        }
    }
}

#[derive(Debug, Clone)]
enum Samples {
    Gray8(GrayImage),
    Gray16(Gray16Image),
}

/// A grayscale raster with bilinear, edge-clamped sampling.
#[derive(Debug, Clone)]
pub struct Raster {
    samples: Samples,
}

impl Raster {
    /// Take ownership of an 8-bit image.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::ZeroArea`] if either dimension is zero.
    pub fn from_gray_image(image: GrayImage) -> Result<Self, RasterError> {
        check_area(image.width(), image.height())?;
        Ok(Self::from_samples(Samples::Gray8(image)))
    }

    /// Take ownership of a 16-bit image.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::ZeroArea`] if either dimension is zero.
    pub fn from_gray16_image(image: Gray16Image) -> Result<Self, RasterError> {
        check_area(image.width(), image.height())?;
        Ok(Self::from_samples(Samples::Gray16(image)))
    }

    /// Take ownership of a row-major 8-bit sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::ZeroArea`] for a zero dimension and
    /// [`RasterError::BufferSize`] if `samples` does not hold exactly
    /// `width * height` values.
    pub fn from_gray8(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, RasterError> {
        check_area(width, height)?;
        let len = samples.len();
        let image = GrayImage::from_raw(width, height, samples)
            .filter(|img| img.as_raw().len() == pixel_count(width, height))
            .ok_or(RasterError::BufferSize { len, width, height })?;
        Ok(Self::from_samples(Samples::Gray8(image)))
    }

    /// Take ownership of a row-major 16-bit sample buffer.
    ///
    /// # Errors
    ///
    /// Same as [`from_gray8`](Self::from_gray8).
    pub fn from_gray16(width: u32, height: u32, samples: Vec<u16>) -> Result<Self, RasterError> {
        check_area(width, height)?;
        let len = samples.len();
        let image = Gray16Image::from_raw(width, height, samples)
            .filter(|img| img.as_raw().len() == pixel_count(width, height))
            .ok_or(RasterError::BufferSize { len, width, height })?;
        Ok(Self::from_samples(Samples::Gray16(image)))
    }

    /// Decode encoded image bytes (PNG, JPEG, BMP, WebP, TIFF).
    ///
    /// Sources with more than 8 bits per channel become 16-bit rasters;
    /// everything else is converted to 8-bit luma.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::EmptyInput`] if `bytes` is empty and
    /// [`RasterError::ImageDecode`] if the format is unrecognized or the
    /// data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self, RasterError> {
        if bytes.is_empty() {
            return Err(RasterError::EmptyInput);
        }
        let img = image::load_from_memory(bytes)?;
        let wide = matches!(
            img.color(),
            ColorType::L16
                | ColorType::La16
                | ColorType::Rgb16
                | ColorType::Rgba16
                | ColorType::Rgb32F
                | ColorType::Rgba32F
        );
        if wide {
            Self::from_gray16_image(img.to_luma16())
        } else {
            Self::from_gray_image(img.to_luma8())
        }
    }

    const fn from_samples(samples: Samples) -> Self {
        Self { samples }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        match &self.samples {
            Samples::Gray8(img) => img.width(),
            Samples::Gray16(img) => img.width(),
        }
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        match &self.samples {
            Samples::Gray8(img) => img.height(),
            Samples::Gray16(img) => img.height(),
        }
    }

    /// Width and height.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Sample format.
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        match self.samples {
            Samples::Gray8(_) => PixelFormat::Gray8,
            Samples::Gray16(_) => PixelFormat::Gray16,
        }
    }

    /// The 8-bit image, if this is an 8-bit raster.
    #[must_use]
    pub const fn as_gray8(&self) -> Option<&GrayImage> {
        match &self.samples {
            Samples::Gray8(img) => Some(img),
            Samples::Gray16(_) => None,
        }
    }

    /// The 16-bit image, if this is a 16-bit raster.
    #[must_use]
    pub const fn as_gray16(&self) -> Option<&Gray16Image> {
        match &self.samples {
            Samples::Gray16(img) => Some(img),
            Samples::Gray8(_) => None,
        }
    }

    /// Raw sample value at integer pixel coordinates, or `None` outside
    /// the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<f64> {
        match &self.samples {
            Samples::Gray8(img) => img.get_pixel_checked(x, y).map(|p| f64::from(p.0[0])),
            Samples::Gray16(img) => img.get_pixel_checked(x, y).map(|p| f64::from(p.0[0])),
        }
    }

    /// Bilinear sample at a sub-pixel position, in raw sample units.
    ///
    /// Pixel centers sit at integer coordinates. Neighbors outside the
    /// image are clamped to the nearest edge pixel.
    #[must_use]
    pub fn value_at(&self, p: Vec2) -> f64 {
        let x0 = p.x.floor();
        let y0 = p.y.floor();
        let dx = p.x - x0;
        let dy = p.y - y0;

        let (w, h) = (self.width(), self.height());
        let (i0, i1) = (clamp_index(x0, w), clamp_index(x0 + 1.0, w));
        let (j0, j1) = (clamp_index(y0, h), clamp_index(y0 + 1.0, h));
        let at = |i, j| self.pixel(i, j).unwrap_or_default();

        let top = at(i0, j0).mul_add(1.0 - dx, at(i1, j0) * dx);
        let bottom = at(i0, j1).mul_add(1.0 - dx, at(i1, j1) * dx);
        top.mul_add(1.0 - dy, bottom * dy)
    }
}

fn check_area(width: u32, height: u32) -> Result<(), RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::ZeroArea { width, height });
    }
    Ok(())
}

fn pixel_count(width: u32, height: u32) -> usize {
    (width as usize).saturating_mul(height as usize)
}

/// Clamp a floored coordinate into `[0, len)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(v: f64, len: u32) -> u32 {
    let last = len.saturating_sub(1);
    if v.is_nan() || v <= 0.0 {
        0
    } else if v >= f64::from(last) {
        last
    } else {
        v as u32
    }
}
