//! Responsive sizing for enlarged vector graphics.
//!
//! The enlarged copy keeps a margin around it and never shrinks below a
//! minimum usable size:
//!
//! ```
//! use horizon_lightbox::sizing::{ViewBox, fit_vector_graphic};
//! use horizon_lightbox_dom::Viewport;
//!
//! let view_box = ViewBox::parse("0 0 400 200");
//! let size = fit_vector_graphic(Viewport::new(1000.0, 800.0), view_box);
//! assert_eq!(size.width_css(), "904px");
//! assert_eq!(size.height_css(), "452px");
//! ```

use horizon_lightbox_dom::Viewport;

/// Space reserved around the enlarged graphic, in CSS pixels, per axis.
pub const VIEWPORT_MARGIN: f64 = 96.0;

/// Smallest width the enlarged graphic is fitted into.
pub const MIN_WIDTH: f64 = 320.0;

/// Smallest height the enlarged graphic is fitted into.
pub const MIN_HEIGHT: f64 = 240.0;

/// A parsed SVG `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewBox {
    /// Parse a `viewBox` attribute: four numbers separated by whitespace
    /// and/or commas. Returns `None` unless the box is usable, that is, has
    /// a positive width and height.
    pub fn parse(value: &str) -> Option<Self> {
        let mut numbers = value
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse::<f64>);

        let mut next = || numbers.next()?.ok().filter(|n| n.is_finite());
        let view_box = Self {
            min_x: next()?,
            min_y: next()?,
            width: next()?,
            height: next()?,
        };
        if numbers.next().is_some() {
            return None;
        }
        view_box.is_usable().then_some(view_box)
    }

    /// Check if the box has a positive width and height.
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// The box an enlarged graphic must fit in for a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Maximum width.
    pub max_width: f64,
    /// Maximum height.
    pub max_height: f64,
}

/// Compute the fitting box: the viewport minus margins, clamped to the
/// minimum usable size.
pub fn bounds_for(viewport: Viewport) -> Bounds {
    Bounds {
        max_width: (viewport.width - VIEWPORT_MARGIN).max(MIN_WIDTH),
        max_height: (viewport.height - VIEWPORT_MARGIN).max(MIN_HEIGHT),
    }
}

/// Size applied to an enlarged vector graphic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsiveSize {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels, or `None` for `auto`.
    pub height: Option<f64>,
}

impl ResponsiveSize {
    /// The `width` style value.
    pub fn width_css(&self) -> String {
        format!("{}px", self.width)
    }

    /// The `height` style value.
    pub fn height_css(&self) -> String {
        match self.height {
            Some(height) => format!("{height}px"),
            None => "auto".to_string(),
        }
    }
}

/// Fit a graphic into the viewport, preserving the `viewBox` aspect ratio.
///
/// Width is fitted first; if the resulting height overflows, the height is
/// fitted instead. Without a usable `viewBox` the graphic gets the maximum
/// width and an automatic height.
pub fn fit_vector_graphic(viewport: Viewport, view_box: Option<ViewBox>) -> ResponsiveSize {
    let bounds = bounds_for(viewport);

    let Some(view_box) = view_box.filter(ViewBox::is_usable) else {
        return ResponsiveSize {
            width: bounds.max_width,
            height: None,
        };
    };

    let height = bounds.max_width * view_box.height / view_box.width;
    if height <= bounds.max_height {
        ResponsiveSize {
            width: bounds.max_width,
            height: Some(height),
        }
    } else {
        ResponsiveSize {
            width: bounds.max_height * view_box.width / view_box.height,
            height: Some(bounds.max_height),
        }
    }
}
