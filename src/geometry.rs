//! Highlight geometry for a set of matched fragments.

use serde::{Deserialize, Serialize};

use crate::fragment::TextFragment;
use crate::geo::Rect;
use crate::layout::{group_into_lines, TextLine};
use crate::logging::GEOMETRY;

/// A box in viewport pixels as the highlight renderer expects it.
///
/// `x1..x2`/`y1..y2` are the box edges; `width`/`height` carry the page
/// viewport size so the renderer can scale the box, not the box's extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub width: f32,
    pub height: f32,
    pub page_number: u32,
}

impl BoundingRect {
    pub fn from_rect(rect: Rect, page_number: u32, page_width: f32, page_height: f32) -> Self {
        BoundingRect {
            x1: rect.x0,
            y1: rect.y0,
            x2: rect.x1,
            y2: rect.y1,
            width: page_width,
            height: page_height,
            page_number,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.x2, self.y2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPosition {
    pub page_number: u32,
    pub bounding_rect: BoundingRect,
    pub rects: Vec<BoundingRect>,
}

/// Geometry built from matched fragments, with the count of fragments that
/// had to be skipped for malformed boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub position: Option<HighlightPosition>,
    pub malformed: usize,
}

/// Split off malformed fragments, logging each one.
fn well_formed<'a>(fragments: &[&'a TextFragment]) -> (Vec<&'a TextFragment>, usize) {
    let mut kept = Vec::with_capacity(fragments.len());
    let mut malformed = 0;
    for &fragment in fragments {
        if fragment.is_well_formed() {
            kept.push(fragment);
        } else {
            malformed += 1;
            tracing::warn!(target: GEOMETRY, fragment = %fragment, "Skipping malformed fragment");
        }
    }
    (kept, malformed)
}

/// Smallest box enclosing every fragment on the first fragment's page.
/// Fragments on other pages are ignored.
pub fn bounding_box(fragments: &[&TextFragment]) -> Option<BoundingRect> {
    let first = fragments.first()?;
    let page = first.page;
    let rect = Rect::enclosing(
        fragments
            .iter()
            .filter(|f| f.page == page)
            .map(|f| f.rect()),
    )?;
    if !rect.is_finite() {
        return None;
    }
    Some(BoundingRect::from_rect(
        rect,
        page,
        first.page_width,
        first.page_height,
    ))
}

/// One box per visual line of the fragments on the first fragment's page,
/// top to bottom.
pub fn line_rects(fragments: &[&TextFragment], tolerance: f32) -> Vec<BoundingRect> {
    let Some(first) = fragments.first() else {
        return Vec::new();
    };
    let page = first.page;
    let on_page: Vec<&TextFragment> = fragments.iter().copied().filter(|f| f.page == page).collect();

    let lines: Vec<TextLine> = group_into_lines(on_page, tolerance)
        .into_iter()
        .filter_map(|line| TextLine::from_fragments(page, line))
        .collect();

    tracing::debug!(target: GEOMETRY, page, lines = lines.len(), "Grouped matched fragments into lines");

    lines
        .iter()
        .filter(|line| line.bbox.has_area())
        .map(|line| BoundingRect::from_rect(line.bbox, page, first.page_width, first.page_height))
        .collect()
}

/// Build the highlight for matched fragments (reading order). The position is
/// `None` when no valid line could be formed.
pub fn build_geometry(fragments: &[&TextFragment], line_tolerance: f32) -> Geometry {
    let (kept, malformed) = well_formed(fragments);

    let position = bounding_box(&kept).and_then(|bounding_rect| {
        let rects = line_rects(&kept, line_tolerance);
        if rects.is_empty() {
            return None;
        }
        Some(HighlightPosition {
            page_number: bounding_rect.page_number,
            bounding_rect,
            rects,
        })
    });

    Geometry {
        position,
        malformed,
    }
}
