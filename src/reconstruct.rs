//! Reading-ordered fragments joined into one searchable string.

use crate::config::MappingConfig;
use crate::fragment::TextFragment;
use crate::layout::order_document;
use crate::logging::RECONSTRUCT;
use crate::mapper::fragments_in_range;
use crate::normalize::NormalizedText;

/// Where a character of the full text came from.
///
/// `offset` is the char offset inside the fragment's text. An inserted
/// separator points at the preceding fragment with `offset` equal to that
/// fragment's char length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharMapping {
    pub fragment: usize,
    pub offset: usize,
}

/// A document's text in reading order with per-character provenance.
///
/// Built once per document and shared read-only by every chunk lookup.
#[derive(Debug, Clone)]
pub struct ReconstructedDocument {
    fragments: Vec<TextFragment>,
    full_text: String,
    char_map: Vec<CharMapping>,
    normalized: NormalizedText,
    compat_fold: bool,
}

impl ReconstructedDocument {
    /// Build from fragments that are already in reading order.
    pub fn from_ordered(fragments: Vec<TextFragment>) -> Self {
        Self::build(fragments, false)
    }

    /// Sort extraction-ordered fragments into reading order, then build.
    pub fn from_extracted(fragments: Vec<TextFragment>, config: &MappingConfig) -> Self {
        let ordered = order_document(fragments, &config.reading_order);
        Self::build(ordered, config.compat_fold)
    }

    /// Like [`from_ordered`](Self::from_ordered), normalizing with the config's folding rules.
    pub fn from_ordered_with(fragments: Vec<TextFragment>, config: &MappingConfig) -> Self {
        Self::build(fragments, config.compat_fold)
    }

    fn build(fragments: Vec<TextFragment>, compat_fold: bool) -> Self {
        let mut full_text = String::new();
        let mut char_map = Vec::new();

        for (i, fragment) in fragments.iter().enumerate() {
            let mut len = 0;
            for ch in fragment.text.chars() {
                full_text.push(ch);
                char_map.push(CharMapping {
                    fragment: i,
                    offset: len,
                });
                len += 1;
            }

            let is_last = i + 1 == fragments.len();
            let ends_in_space = fragment.text.chars().last().is_some_and(char::is_whitespace);
            if !is_last && !ends_in_space {
                full_text.push(' ');
                char_map.push(CharMapping {
                    fragment: i,
                    offset: len,
                });
            }
        }

        let normalized = NormalizedText::new(&full_text, compat_fold);

        tracing::debug!(
            target: RECONSTRUCT,
            fragments = fragments.len(),
            chars = char_map.len(),
            normalized_chars = normalized.len(),
            "Reconstructed document text"
        );

        ReconstructedDocument {
            fragments,
            full_text,
            char_map,
            normalized,
            compat_fold,
        }
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    pub fn fragment(&self, index: usize) -> Option<&TextFragment> {
        self.fragments.get(index)
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn char_map(&self) -> &[CharMapping] {
        &self.char_map
    }

    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    /// Whether the text was normalized with NFKC compatibility folding.
    /// Chunks searched in this document must be normalized the same way.
    pub fn compat_fold(&self) -> bool {
        self.compat_fold
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment indices touched by the normalized char range `[start, end)`,
    /// in reading order.
    pub fn fragments_for_range(&self, start: usize, end: usize) -> Vec<usize> {
        match self.normalized.raw_range(start, end) {
            Some((raw_start, raw_end)) => fragments_in_range(raw_start, raw_end, &self.char_map),
            None => Vec::new(),
        }
    }
}
