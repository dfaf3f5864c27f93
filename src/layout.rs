use ordered_float::OrderedFloat;
use std::borrow::Borrow;
use std::collections::BTreeMap;

use crate::config::ReadingOrderConfig;
use crate::fragment::TextFragment;
use crate::geo::Rect;
use crate::logging::READING_ORDER;

/// Column structure detected on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    Single,
    TwoColumn { left: usize, right: usize },
}

/// A single visual line of fragments, left to right.
#[derive(Debug, Clone)]
pub struct TextLine<'a> {
    pub page_number: u32,
    pub fragments: Vec<&'a TextFragment>,
    pub bbox: Rect,
}

impl<'a> TextLine<'a> {
    /// `None` when `fragments` is empty.
    pub fn from_fragments(page_number: u32, fragments: Vec<&'a TextFragment>) -> Option<Self> {
        let bbox = Rect::enclosing(fragments.iter().map(|f| f.rect()))?;

        tracing::trace!(
            target: READING_ORDER,
            page = page_number,
            fragments = fragments.len(),
            "Created text line"
        );

        Some(TextLine {
            page_number,
            fragments,
            bbox,
        })
    }

    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Two fragments share a line when their tops differ by at most `tolerance`
/// times their average height.
pub fn on_same_line(a: &TextFragment, b: &TextFragment, tolerance: f32) -> bool {
    let avg_height = (a.height + b.height) / 2.0;
    (a.y - b.y).abs() <= avg_height * tolerance
}

/// Group fragments into lines, top to bottom, each line sorted left to right.
///
/// Fragments are ordered by `y` first and then swept: a fragment joins the
/// current line when it is on the same line as the previous member. Unlike a
/// tolerance-based comparator this is a total order, so the result is stable
/// for any input.
pub fn group_into_lines<T: Borrow<TextFragment>>(mut items: Vec<T>, tolerance: f32) -> Vec<Vec<T>> {
    items.sort_by_key(|f| OrderedFloat(f.borrow().y));

    let mut lines: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();

    for item in items {
        let breaks = current
            .last()
            .is_some_and(|last| !on_same_line(last.borrow(), item.borrow(), tolerance));
        if breaks {
            lines.push(std::mem::take(&mut current));
        }
        current.push(item);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by_key(|f| OrderedFloat(f.borrow().x));
    }

    lines
}

pub fn detect_columns(
    fragments: &[TextFragment],
    page_width: f32,
    config: &ReadingOrderConfig,
) -> ColumnLayout {
    let center = page_width / 2.0;
    let left = fragments.iter().filter(|f| f.x < center).count();
    let right = fragments.len() - left;

    if left > config.column_min_fragments && right > config.column_min_fragments {
        ColumnLayout::TwoColumn { left, right }
    } else {
        ColumnLayout::Single
    }
}

fn sort_lines(fragments: Vec<TextFragment>, tolerance: f32) -> Vec<TextFragment> {
    group_into_lines(fragments, tolerance)
        .into_iter()
        .flatten()
        .collect()
}

/// Reorder one page's fragments for natural reading.
///
/// Two-column pages are read left column first, then right column; each
/// column (or the whole page) is read line by line, top to bottom.
pub fn sort_reading_order(
    fragments: Vec<TextFragment>,
    page_width: f32,
    config: &ReadingOrderConfig,
) -> Vec<TextFragment> {
    if fragments.is_empty() {
        return fragments;
    }

    let layout = detect_columns(&fragments, page_width, config);
    tracing::debug!(
        target: READING_ORDER,
        page = fragments[0].page,
        fragments = fragments.len(),
        layout = ?layout,
        "Detected page layout"
    );

    match layout {
        ColumnLayout::Single => sort_lines(fragments, config.line_tolerance),
        ColumnLayout::TwoColumn { .. } => {
            let center = page_width / 2.0;
            let (left, right): (Vec<_>, Vec<_>) =
                fragments.into_iter().partition(|f| f.x < center);
            let mut ordered = sort_lines(left, config.line_tolerance);
            ordered.extend(sort_lines(right, config.line_tolerance));
            ordered
        }
    }
}

/// Put an extraction-ordered, multi-page fragment list into reading order:
/// pages ascending, each page sorted with its own viewport width.
pub fn order_document(fragments: Vec<TextFragment>, config: &ReadingOrderConfig) -> Vec<TextFragment> {
    let mut pages_map: BTreeMap<u32, Vec<TextFragment>> = BTreeMap::new();
    for fragment in fragments {
        pages_map.entry(fragment.page).or_default().push(fragment);
    }

    let mut ordered = Vec::new();
    for (_, page_fragments) in pages_map {
        let page_width = page_fragments[0].page_width;
        ordered.extend(sort_reading_order(page_fragments, page_width, config));
    }
    ordered
}
