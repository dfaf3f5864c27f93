//! Locating a chunk inside a document's normalized text.
//!
//! Strategies run in order of precision and the first one that produces a
//! candidate wins:
//!
//! 1. exact substring,
//! 2. high-fidelity fuzzy window scan,
//! 3. loose fuzzy window scan,
//! 4. anchor phrases at word boundaries.
//!
//! The fuzzy scans slide windows of several sizes over the whole corpus and
//! dominate the cost (corpus length x window sizes x window words), so a scan
//! stops at the first candidate reaching `early_exit_score`.

use std::collections::HashSet;

use crate::config::MappingConfig;
use crate::logging::MATCHER;
use crate::normalize::{significant_words, NormalizedText, Token};
use crate::similarity::jaccard;
use crate::trace::{MatchResult, MatchTrace, Strategy};

/// A char window of the corpus and its similarity to the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub trimmed: bool,
}

/// The normalized chunk being searched for.
struct Target<'t> {
    text: &'t str,
    chars: usize,
    /// Significant words in order.
    words: Vec<&'t str>,
    set: HashSet<&'t str>,
}

impl<'t> Target<'t> {
    fn new(text: &'t str, min_word_chars: usize) -> Self {
        let words = significant_words(text, min_word_chars);
        let set = words.iter().copied().collect();
        Target {
            text,
            chars: text.chars().count(),
            words,
            set,
        }
    }
}

/// How a word of the corpus may match an anchor word.
#[derive(Clone, Copy)]
enum Cut {
    None,
    /// The word sits at the window start: either word may be a suffix of the other.
    Head,
    /// The word sits at the window end: either word may be a prefix of the other.
    Tail,
}

fn word_matches(candidate: &str, wanted: &str, cut: Cut) -> bool {
    match cut {
        Cut::None => candidate == wanted,
        Cut::Head => candidate.ends_with(wanted) || wanted.ends_with(candidate),
        Cut::Tail => candidate.starts_with(wanted) || wanted.starts_with(candidate),
    }
}

fn run_matches(words: &[(Token, &str)], at: usize, phrase: &[&str], first: Cut, last: Cut) -> bool {
    if at + phrase.len() > words.len() {
        return false;
    }
    phrase.iter().enumerate().all(|(j, wanted)| {
        let cut = match (j == 0, j + 1 == phrase.len()) {
            (true, true) if matches!(first, Cut::None) => last,
            (true, _) => first,
            (false, true) => last,
            (false, false) => Cut::None,
        };
        word_matches(words[at + j].1, wanted, cut)
    })
}

pub struct Matcher<'a> {
    corpus: &'a NormalizedText,
    config: &'a MappingConfig,
}

impl<'a> Matcher<'a> {
    pub fn new(corpus: &'a NormalizedText, config: &'a MappingConfig) -> Self {
        Matcher { corpus, config }
    }

    /// Run the strategy cascade for an already-normalized target, recording
    /// every attempt in `trace`.
    pub fn locate(&self, target: &str, trace: &mut MatchTrace) -> Option<MatchResult> {
        let target = Target::new(target, self.config.min_word_chars);
        if target.chars == 0 || self.corpus.is_empty() {
            return None;
        }

        if let Some(found) = self.exact(&target) {
            trace.record(Strategy::Exact, Some(1.0), true);
            return Some(self.accept(found, Strategy::Exact));
        }
        trace.record(Strategy::Exact, None, false);

        let fuzzy = [
            (Strategy::HighFidelityFuzzy, self.config.high_fidelity_threshold),
            (Strategy::LooseFuzzy, self.config.loose_threshold),
        ];
        for (strategy, threshold) in fuzzy {
            let (found, best_seen) = self.fuzzy_scan(&target, threshold);
            trace.record(strategy, best_seen, found.is_some());
            if let Some(window) = found {
                return Some(self.accept(window, strategy));
            }
        }

        let found = self.word_boundary(&target);
        trace.record(
            Strategy::WordBoundary,
            found.map(|w| w.score),
            found.is_some(),
        );
        if let Some(window) = found {
            return Some(self.accept(window, Strategy::WordBoundary));
        }

        tracing::debug!(target: MATCHER, chars = target.chars, "No strategy located the chunk");
        None
    }

    fn accept(&self, window: Window, strategy: Strategy) -> MatchResult {
        tracing::debug!(
            target: MATCHER,
            %strategy,
            start = window.start,
            end = window.end,
            score = window.score,
            trimmed = window.trimmed,
            "Located chunk"
        );
        MatchResult {
            start: window.start,
            end: window.end,
            score: window.score,
            strategy,
            trimmed: window.trimmed,
        }
    }

    fn exact(&self, target: &Target) -> Option<Window> {
        let start = self.corpus.find_from(target.text, 0)?;
        Some(Window {
            start,
            end: start + target.chars,
            score: 1.0,
            trimmed: false,
        })
    }

    fn window_significant(&self, start: usize, end: usize) -> Vec<(Token, &'a str)> {
        let corpus = self.corpus;
        let min = self.config.min_word_chars;
        corpus
            .window_words(start, end)
            .map(|t| (t, corpus.token_text(t)))
            .filter(|(_, w)| w.chars().count() >= min)
            .collect()
    }

    /// Word-set similarity between the target and the corpus window `[start, end)`.
    pub fn window_similarity(&self, target: &str, start: usize, end: usize) -> f64 {
        let target = Target::new(target, self.config.min_word_chars);
        self.score(&target, start, end)
    }

    fn score(&self, target: &Target, start: usize, end: usize) -> f64 {
        let window: HashSet<&str> = self
            .window_significant(start, end)
            .into_iter()
            .map(|(_, w)| w)
            .collect();
        jaccard(&target.set, &window)
    }

    fn window_sizes(&self, target_chars: usize) -> Vec<usize> {
        let mut sizes: Vec<usize> = Vec::new();
        for scale in &self.config.window_scales {
            let size = (target_chars as f64 * scale).floor() as usize;
            if size > 0 && size <= self.corpus.len() && !sizes.contains(&size) {
                sizes.push(size);
            }
        }
        sizes
    }

    /// Slide every window size over the corpus. Returns the best window that
    /// reached `threshold` (after trimming) and the best score seen at all.
    fn fuzzy_scan(&self, target: &Target, threshold: f64) -> (Option<Window>, Option<f64>) {
        let mut best: Option<Window> = None;
        let mut best_seen: Option<f64> = None;

        for size in self.window_sizes(target.chars) {
            for start in 0..=(self.corpus.len() - size) {
                let end = start + size;
                let score = self.score(target, start, end);
                if best_seen.map_or(true, |s| score > s) {
                    best_seen = Some(score);
                }
                if score < threshold {
                    continue;
                }

                let candidate = self.trim(target, Window {
                    start,
                    end,
                    score,
                    trimmed: false,
                });
                if best.map_or(true, |b| candidate.score > b.score) {
                    best = Some(candidate);
                    if candidate.score >= self.config.early_exit_score {
                        return (best, best_seen.map(|s| s.max(candidate.score)));
                    }
                }
            }
        }

        let best_seen = match (best_seen, best) {
            (Some(seen), Some(b)) => Some(seen.max(b.score)),
            (seen, _) => seen,
        };
        (best, best_seen)
    }

    /// Shrink `window` to the target's leading and trailing anchor phrases
    /// when that does not lower the similarity.
    pub fn trim_window(&self, target: &str, start: usize, end: usize) -> Window {
        let target = Target::new(target, self.config.min_word_chars);
        let score = self.score(&target, start, end);
        self.trim(&target, Window {
            start,
            end,
            score,
            trimmed: false,
        })
    }

    fn trim(&self, target: &Target, window: Window) -> Window {
        let k = self.config.anchor_words.min(target.words.len());
        if k == 0 {
            return window;
        }
        let head = &target.words[..k];
        let tail = &target.words[target.words.len() - k..];

        let words = self.window_significant(window.start, window.end);
        if words.len() < k {
            return window;
        }

        // Only a word clipped by the window edge may match an anchor word partially.
        let head_cut = |i: usize| {
            if words[i].0.start == window.start {
                Cut::Head
            } else {
                Cut::None
            }
        };
        let tail_cut = |i: usize| {
            if words[i + k - 1].0.end == window.end {
                Cut::Tail
            } else {
                Cut::None
            }
        };

        let last_start = words.len() - k;
        let Some(p) = (0..=last_start).find(|&i| run_matches(&words, i, head, head_cut(i), Cut::None)) else {
            return window;
        };
        let Some(q) = (p..=last_start)
            .rev()
            .find(|&i| run_matches(&words, i, tail, Cut::None, tail_cut(i)))
        else {
            return window;
        };

        let start = words[p].0.start;
        let end = words[q + k - 1].0.end;
        if (start, end) == (window.start, window.end) {
            return window;
        }

        let score = self.score(target, start, end);
        if score >= window.score {
            tracing::trace!(
                target: MATCHER,
                before = window.score,
                after = score,
                "Trimmed fuzzy window"
            );
            Window {
                start,
                end,
                score,
                trimmed: true,
            }
        } else {
            window
        }
    }

    /// Find the target's leading and trailing anchor phrases in the corpus and
    /// accept the span between them when its word count is plausible.
    fn word_boundary(&self, target: &Target) -> Option<Window> {
        let k = self.config.anchor_words;
        let m = target.words.len();
        if m < k {
            return None;
        }
        let head = &target.words[..k];
        let tail = &target.words[m - k..];

        let words = self.window_significant(0, self.corpus.len());
        if words.len() < k {
            return None;
        }
        let last_start = words.len() - k;

        for p in (0..=last_start).filter(|&i| run_matches(&words, i, head, Cut::None, Cut::None)) {
            let tail_at = (p..=last_start).find(|&i| run_matches(&words, i, tail, Cut::None, Cut::None));
            let Some(q) = tail_at else {
                // No trailing anchor after this head; later heads cannot do better.
                return None;
            };

            let span_words = q + k - p;
            let ratio = span_words as f64 / m as f64;
            if ratio >= self.config.word_ratio_min && ratio <= self.config.word_ratio_max {
                let start = words[p].0.start;
                let end = words[q + k - 1].0.end;
                return Some(Window {
                    start,
                    end,
                    score: self.score(target, start, end),
                    trimmed: false,
                });
            }
        }
        None
    }
}
