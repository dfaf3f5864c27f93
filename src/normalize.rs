//! Text normalization for matching.
//!
//! Matching never happens on raw extracted text: both sides are lowercased,
//! whitespace runs are collapsed to one space and the ends are trimmed.
//! [`NormalizedText`] keeps, for every normalized character, the index of the
//! raw character it came from, so offsets found in the normalized text can be
//! resolved back against the reconstructed document's character map.

use unicode_normalization::UnicodeNormalization;

/// Lowercase, collapse whitespace runs to a single space and trim.
pub fn normalize_text(text: &str) -> String {
    NormalizedText::new(text, false).text
}

/// Same as [`normalize_text`], with NFKC compatibility folding when `compat_fold` is set.
pub fn normalize_with(text: &str, compat_fold: bool) -> String {
    NormalizedText::new(text, compat_fold).text
}

/// A maximal run of non-space characters, as a half-open char range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub text: String,
    /// Raw char index for each normalized char.
    pub origin: Vec<usize>,
    /// Byte offset of each char in `text`, plus a final entry for `text.len()`.
    byte_offsets: Vec<usize>,
    tokens: Vec<Token>,
}

impl NormalizedText {
    pub fn new(raw: &str, compat_fold: bool) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut origin = Vec::with_capacity(raw.len());
        let mut pending_space: Option<usize> = None;

        for (raw_idx, c) in raw.chars().enumerate() {
            if compat_fold {
                for folded in std::iter::once(c).nfkc() {
                    push_char(folded, raw_idx, &mut text, &mut origin, &mut pending_space);
                }
            } else {
                push_char(c, raw_idx, &mut text, &mut origin, &mut pending_space);
            }
        }

        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_offsets.push(text.len());

        let tokens = tokenize(&text);

        NormalizedText {
            text,
            origin,
            byte_offsets,
            tokens,
        }
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Substring for the char range `[start, end)`, clamped to the text.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.byte_offsets[start]..self.byte_offsets[end]]
    }

    fn char_index_of_byte(&self, byte: usize) -> usize {
        self.byte_offsets.partition_point(|&b| b < byte)
    }

    /// First occurrence of `needle` at or after char `from`, as a char index.
    pub fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        let from = from.min(self.len());
        let byte_from = self.byte_offsets[from];
        self.text[byte_from..]
            .find(needle)
            .map(|b| self.char_index_of_byte(byte_from + b))
    }

    pub fn token_text(&self, token: Token) -> &str {
        self.slice(token.start, token.end)
    }

    /// Words of the char window `[start, end)`; words cut by the window edges
    /// keep only the part inside the window.
    pub fn window_words(&self, start: usize, end: usize) -> impl Iterator<Item = Token> + '_ {
        let first = self.tokens.partition_point(|t| t.end <= start);
        self.tokens[first..]
            .iter()
            .take_while(move |t| t.start < end)
            .map(move |t| Token {
                start: t.start.max(start),
                end: t.end.min(end),
            })
            .filter(|t| !t.is_empty())
    }

    /// Raw char range covered by the normalized range `[start, end)`.
    pub fn raw_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end || end > self.len() {
            return None;
        }
        Some((self.origin[start], self.origin[end - 1] + 1))
    }
}

fn push_char(
    c: char,
    raw_idx: usize,
    text: &mut String,
    origin: &mut Vec<usize>,
    pending_space: &mut Option<usize>,
) {
    if c.is_whitespace() {
        if !text.is_empty() && pending_space.is_none() {
            *pending_space = Some(raw_idx);
        }
        return;
    }
    if let Some(space_idx) = pending_space.take() {
        text.push(' ');
        origin.push(space_idx);
    }
    for lower in c.to_lowercase() {
        text.push(lower);
        origin.push(raw_idx);
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut idx = 0;
    for c in text.chars() {
        if c == ' ' {
            if let Some(s) = start.take() {
                tokens.push(Token { start: s, end: idx });
            }
        } else if start.is_none() {
            start = Some(idx);
        }
        idx += 1;
    }
    if let Some(s) = start {
        tokens.push(Token { start: s, end: idx });
    }
    tokens
}

/// Words of already-normalized text with at least `min_chars` characters.
pub fn significant_words(normalized: &str, min_chars: usize) -> Vec<&str> {
    normalized
        .split(' ')
        .filter(|w| w.chars().count() >= min_chars)
        .collect()
}
