use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::Rect;

/// Viewport size the renderer falls back to when extraction did not report one.
pub const DEFAULT_PAGE_WIDTH: f32 = 800.0;
pub const DEFAULT_PAGE_HEIGHT: f32 = 1200.0;

/// Scale the viewer renders pages at; fragment pixels are produced at this scale.
pub const DEFAULT_EXTRACTION_SCALE: f32 = 1.2;

fn default_page_width() -> f32 {
    DEFAULT_PAGE_WIDTH
}

fn default_page_height() -> f32 {
    DEFAULT_PAGE_HEIGHT
}

/// A positioned piece of extracted PDF text.
///
/// Coordinates are viewport pixels at the extraction scale with the origin at
/// the top-left corner of the page: `x`/`y` is the top-left corner of the glyph
/// box, `y + height` its bottom edge. `page_width`/`page_height` are the viewport
/// extents of the page the fragment was extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFragment {
    pub text: String,
    #[serde(alias = "pageNumber")]
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_page_width")]
    pub page_width: f32,
    #[serde(default = "default_page_height")]
    pub page_height: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, page: u32, x: f32, y: f32, width: f32, height: f32) -> Self {
        TextFragment {
            text: text.into(),
            page,
            x,
            y,
            width,
            height,
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
        }
    }

    pub fn with_viewport(mut self, page_width: f32, page_height: f32) -> Self {
        self.page_width = page_width;
        self.page_height = page_height;
        self
    }

    /// Build a fragment from a box in PDF user space (points, bottom-left
    /// origin), given as `[x0, y0, x1, y1]`.
    pub fn from_user_space(
        text: impl Into<String>,
        page: u32,
        bbox: [f32; 4],
        viewport: &PageViewport,
    ) -> Self {
        let (x0, x1) = (bbox[0].min(bbox[2]), bbox[0].max(bbox[2]));
        let (y0, y1) = (bbox[1].min(bbox[3]), bbox[1].max(bbox[3]));
        let s = viewport.scale;

        TextFragment {
            text: text.into(),
            page,
            x: x0 * s,
            y: viewport.height - y1 * s,
            width: (x1 - x0) * s,
            height: (y1 - y0) * s,
            page_width: viewport.width,
            page_height: viewport.height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.x, self.y, self.width, self.height)
    }

    /// A fragment can take part in geometry only with a finite position and a
    /// finite, positive extent.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" p{} ({:.1}, {:.1}) {:.1}x{:.1}",
            self.text, self.page, self.x, self.y, self.width, self.height
        )
    }
}

/// Size of a rendered page in viewport pixels and the scale it was rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageViewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl PageViewport {
    /// Viewport for a page whose media box is `width_pts` x `height_pts` points.
    pub fn from_media_box(width_pts: f32, height_pts: f32, scale: f32) -> Self {
        PageViewport {
            width: width_pts * scale,
            height: height_pts * scale,
            scale,
        }
    }
}
