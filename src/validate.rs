use serde::Serialize;
use std::fmt;

use crate::geometry::{BoundingRect, HighlightPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    NonPositivePage,
    BoundsPageMismatch,
    NonFiniteCoordinate,
    DegenerateBounds,
    EmptyRects,
    DegenerateRect { index: usize },
    PageMismatch { index: usize },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NonPositivePage => write!(f, "page number must be positive"),
            InvalidReason::BoundsPageMismatch => {
                write!(f, "bounding rect is on a different page")
            }
            InvalidReason::NonFiniteCoordinate => write!(f, "non-finite coordinate"),
            InvalidReason::DegenerateBounds => write!(f, "bounding rect has no area"),
            InvalidReason::EmptyRects => write!(f, "no line rects"),
            InvalidReason::DegenerateRect { index } => write!(f, "line rect {index} has no area"),
            InvalidReason::PageMismatch { index } => {
                write!(f, "line rect {index} is on a different page")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightValidity {
    Valid,
    Invalid(InvalidReason),
}

impl HighlightValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, HighlightValidity::Valid)
    }
}

fn rect_is_finite(r: &BoundingRect) -> bool {
    [r.x1, r.y1, r.x2, r.y2, r.width, r.height]
        .iter()
        .all(|v| v.is_finite())
}

/// Check a highlight before it is handed to a renderer or persisted.
pub fn validate_highlight(position: &HighlightPosition) -> HighlightValidity {
    use HighlightValidity::Invalid;

    if position.page_number == 0 {
        return Invalid(InvalidReason::NonPositivePage);
    }
    if position.bounding_rect.page_number != position.page_number {
        return Invalid(InvalidReason::BoundsPageMismatch);
    }
    if !rect_is_finite(&position.bounding_rect) || !position.rects.iter().all(rect_is_finite) {
        return Invalid(InvalidReason::NonFiniteCoordinate);
    }
    let bounds = &position.bounding_rect;
    if bounds.x2 <= bounds.x1 || bounds.y2 <= bounds.y1 {
        return Invalid(InvalidReason::DegenerateBounds);
    }
    if position.rects.is_empty() {
        return Invalid(InvalidReason::EmptyRects);
    }
    for (index, rect) in position.rects.iter().enumerate() {
        if rect.page_number != position.page_number {
            return Invalid(InvalidReason::PageMismatch { index });
        }
        if rect.x2 <= rect.x1 || rect.y2 <= rect.y1 {
            return Invalid(InvalidReason::DegenerateRect { index });
        }
    }
    HighlightValidity::Valid
}
