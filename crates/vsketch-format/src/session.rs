//! Session file: reference image plus contour in one file.
//!
//! Layout, with `\n` line endings:
//!
//! ```text
//! VSCL0001
//! key_image
//! <width>
//! <height>
//! <format>          1 = 8-bit, 2 = 16-bit
//! <raw pixels>      width * height samples, row-major, little-endian
//! key_contour
//! ...               contour record, see crate::text
//! ```
//!
//! The pixel bytes follow the format line directly, so the file is
//! handled as bytes rather than text.

use std::fmt::Write;

use vsketch_model::{Contour, PixelFormat, Raster};

use crate::FormatError;
use crate::text::{Records, write_contour};

/// Version line every session file starts with.
pub const SESSION_VERSION: &str = "VSCL0001";

/// Key line opening the image record.
pub const IMAGE_KEY: &str = "key_image";

/// Contents of a session file.
#[derive(Debug, Clone)]
pub struct Session {
    /// Reference image.
    pub raster: Raster,
    /// Curves drawn over it.
    pub contour: Contour,
}

const fn format_code(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Gray8 => 1,
        PixelFormat::Gray16 => 2,
    }
}

/// Serialize a raster and contour into session file bytes.
#[must_use]
pub fn write_session(raster: &Raster, contour: &Contour) -> Vec<u8> {
    let mut header = String::new();
    let _ = writeln!(header, "{SESSION_VERSION}");
    let _ = writeln!(header, "{IMAGE_KEY}");
    let _ = writeln!(header, "{}", raster.width());
    let _ = writeln!(header, "{}", raster.height());
    let _ = writeln!(header, "{}", format_code(raster.format()));

    let mut bytes = header.into_bytes();
    if let Some(img) = raster.as_gray8() {
        bytes.extend_from_slice(img.as_raw());
    } else if let Some(img) = raster.as_gray16() {
        bytes.extend(img.as_raw().iter().flat_map(|v| v.to_le_bytes()));
    }

    let mut text = String::new();
    write_contour(contour, &mut text);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Parse session file bytes.
///
/// # Errors
///
/// Returns [`FormatError::UnsupportedVersion`] for an unknown version
/// line, [`FormatError::UnsupportedPixelFormat`] for a format code other
/// than 1 or 2, [`FormatError::TruncatedPixels`] when the pixel block is
/// short, [`FormatError::Raster`] for a zero-sized image, and any
/// contour record error from [`crate::parse_contour`].
pub fn read_session(bytes: &[u8]) -> Result<Session, FormatError> {
    let mut reader = ByteReader::new(bytes);

    let version = reader.line("the session version")?;
    if version != SESSION_VERSION {
        return Err(FormatError::UnsupportedVersion(version.to_owned()));
    }

    let key = reader.line(IMAGE_KEY)?;
    if key != IMAGE_KEY {
        return Err(FormatError::UnexpectedKey {
            line: reader.line_number(),
            expected: IMAGE_KEY,
            found: key.to_owned(),
        });
    }
    let width: u32 = reader.number("the image width")?;
    let height: u32 = reader.number("the image height")?;
    let format = match reader.number::<u32>("the pixel format")? {
        1 => PixelFormat::Gray8,
        2 => PixelFormat::Gray16,
        other => return Err(FormatError::UnsupportedPixelFormat(other)),
    };

    let len = usize::try_from(u64::from(width) * u64::from(height))
        .ok()
        .and_then(|n| n.checked_mul(format.bytes_per_sample()))
        .ok_or(FormatError::ImageTooLarge { width, height })?;
    let pixels = reader.take(len)?;
    let raster = match format {
        PixelFormat::Gray8 => Raster::from_gray8(width, height, pixels.to_vec())?,
        PixelFormat::Gray16 => Raster::from_gray16(
            width,
            height,
            pixels
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        )?,
    };

    let text = std::str::from_utf8(reader.rest())?;
    let contour = Records::starting_at(text, reader.line_number()).contour()?;
    Ok(Session { raster, contour })
}

/// Reads `\n`-terminated lines and raw byte blocks from a buffer.
struct ByteReader<'a> {
    bytes: &'a [u8],
    line: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, line: 0 }
    }

    const fn line_number(&self) -> usize {
        self.line
    }

    /// Next line without its terminator. Lines that are not UTF-8 are
    /// returned empty so they fail the caller's comparison or parse.
    fn line(&mut self, expected: &'static str) -> Result<&'a str, FormatError> {
        if self.bytes.is_empty() {
            return Err(FormatError::UnexpectedEof { expected });
        }
        let end = self.bytes.iter().position(|&b| b == b'\n');
        let (line, rest) = match end {
            Some(end) => (&self.bytes[..end], &self.bytes[end + 1..]),
            None => (self.bytes, &self.bytes[self.bytes.len()..]),
        };
        self.bytes = rest;
        self.line += 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(std::str::from_utf8(line).unwrap_or_default())
    }

    fn number<T: std::str::FromStr>(&mut self, expected: &'static str) -> Result<T, FormatError> {
        let text = self.line(expected)?;
        text.trim().parse().map_err(|_| FormatError::InvalidNumber {
            line: self.line,
            text: text.to_owned(),
        })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if self.bytes.len() < len {
            return Err(FormatError::TruncatedPixels {
                expected: len,
                found: self.bytes.len(),
            });
        }
        let (block, rest) = self.bytes.split_at(len);
        self.bytes = rest;
        Ok(block)
    }

    const fn rest(&self) -> &'a [u8] {
        self.bytes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vsketch_model::{CurvePoint, GrayImage, Vec2};

    use super::*;

    fn gray8() -> Raster {
        Raster::from_gray8(3, 2, vec![0, 10, 20, 30, 40, 250]).unwrap()
    }

    fn one_curve() -> Contour {
        let mut contour = Contour::new();
        let id = contour.add_curve();
        contour
            .curve_mut(id)
            .unwrap()
            .points_mut()
            .extend([CurvePoint::at(0.5, 1.0, 2.0), CurvePoint::at(2.0, 1.5, 0.25)]);
        contour
    }

    #[test]
    fn header_layout() {
        let bytes = write_session(&gray8(), &Contour::new());
        let expected: Vec<u8> = [
            b"VSCL0001\nkey_image\n3\n2\n1\n".as_slice(),
            &[0, 10, 20, 30, 40, 250],
            b"key_contour\n0\n",
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn sixteen_bit_samples_are_little_endian() {
        let raster = Raster::from_gray16(2, 1, vec![0x0102, 0xfffe]).unwrap();
        let bytes = write_session(&raster, &Contour::new());
        let header = b"VSCL0001\nkey_image\n2\n1\n2\n";
        assert_eq!(&bytes[header.len()..header.len() + 4], &[0x02, 0x01, 0xfe, 0xff]);
    }

    #[test]
    fn round_trip_gray8() {
        let bytes = write_session(&gray8(), &one_curve());
        let session = read_session(&bytes).unwrap();
        assert_eq!(session.raster.format(), PixelFormat::Gray8);
        assert_eq!(session.raster.as_gray8().unwrap().as_raw(), &[0, 10, 20, 30, 40, 250]);
        assert_eq!(session.contour.len(), 1);
        let curve = session.contour.curves().next().unwrap();
        assert_eq!(curve.points().to_vec()[1].position, Vec2::new(2.0, 1.5));
    }

    #[test]
    fn round_trip_gray16() {
        let raster = Raster::from_gray16(2, 2, vec![0, 1, 0x0a0a, 65535]).unwrap();
        let session = read_session(&write_session(&raster, &one_curve())).unwrap();
        assert_eq!(session.raster.format(), PixelFormat::Gray16);
        assert_eq!(session.raster.as_gray16().unwrap().as_raw(), &[0, 1, 0x0a0a, 65535]);
    }

    #[test]
    fn pixel_bytes_that_look_like_newlines_survive() {
        let img = GrayImage::from_raw(4, 1, vec![b'\n', b'\r', b'\n', 0]).unwrap();
        let raster = Raster::from_gray_image(img).unwrap();
        let session = read_session(&write_session(&raster, &one_curve())).unwrap();
        assert_eq!(session.raster.as_gray8().unwrap().as_raw(), &[b'\n', b'\r', b'\n', 0]);
        assert_eq!(session.contour.len(), 1);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let err = read_session(b"VSCL0002\nkey_image\n").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedVersion(v) if v == "VSCL0002"));
    }

    #[test]
    fn unknown_pixel_format_is_rejected() {
        let err = read_session(b"VSCL0001\nkey_image\n1\n1\n4\n\0").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedPixelFormat(4)));
    }

    #[test]
    fn short_pixel_block_is_rejected() {
        let err = read_session(b"VSCL0001\nkey_image\n4\n4\n1\nabc").unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedPixels {
                expected: 16,
                found: 3
            }
        ));
    }

    #[test]
    fn zero_area_image_is_rejected() {
        let err = read_session(b"VSCL0001\nkey_image\n0\n5\n1\nkey_contour\n0\n").unwrap_err();
        assert!(matches!(err, FormatError::Raster(_)));
    }

    #[test]
    fn missing_image_key_is_rejected() {
        let err = read_session(b"VSCL0001\nkey_contour\n0\n").unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedKey { line: 2, .. }));
    }

    #[test]
    fn contour_errors_report_file_lines() {
        let err = read_session(b"VSCL0001\nkey_image\n1\n1\n1\nXkey_curve\n0\n").unwrap_err();
        assert!(matches!(err, FormatError::UnexpectedKey { line: 6, .. }), "{err}");
    }

    #[test]
    fn empty_input_is_eof() {
        assert!(matches!(read_session(b"").unwrap_err(), FormatError::UnexpectedEof { .. }));
    }
}
