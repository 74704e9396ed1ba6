//! Media element classification.

use std::fmt;

/// What kind of visual media an element renders.
///
/// The kind selects the copy strategy when the lightbox opens: vector
/// graphics are resized to fit the viewport, raster media is copied as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// An element in the SVG namespace.
    VectorGraphic,
    /// An HTML image.
    Raster,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VectorGraphic => f.write_str("vector graphic"),
            Self::Raster => f.write_str("raster image"),
        }
    }
}
