//! vsketch-format: Pure format serializers (sans-IO)
//!
//! Reads and writes the line-oriented contour format and the session
//! file that bundles a reference image with its contour, and exports
//! contours to SVG. All functions work on in-memory strings and byte
//! slices; file access lives in the `vsketch` CLI.

mod error;
pub mod session;
pub mod svg;
pub mod text;

pub use error::FormatError;
pub use session::{Session, read_session, write_session};
pub use svg::{SvgMetadata, to_svg};
pub use text::{contour_to_string, parse_contour, parse_curve, write_contour, write_curve};
