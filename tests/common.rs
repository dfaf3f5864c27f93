#![allow(dead_code)]

use std::sync::Once;

use delver_highlight::{MappingConfig, ReconstructedDocument, TextFragment};

static INIT: Once = Once::new();

/// Route library logs through the test harness so `--nocapture` shows them.
pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const CHAR_WIDTH: f32 = 6.0;
pub const LINE_HEIGHT: f32 = 12.0;
pub const LINE_STEP: f32 = 16.0;

/// Builds the fragments of one page the way a viewer-side extractor reports
/// them: viewport pixels, top-left origin.
pub struct PageBuilder {
    page: u32,
    width: f32,
    height: f32,
    fragments: Vec<TextFragment>,
}

impl PageBuilder {
    pub fn new(page: u32) -> Self {
        Self::with_size(page, 800.0, 1200.0)
    }

    pub fn with_size(page: u32, width: f32, height: f32) -> Self {
        PageBuilder {
            page,
            width,
            height,
            fragments: Vec::new(),
        }
    }

    /// A fragment with an explicit box.
    pub fn fragment(mut self, text: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.fragments.push(
            TextFragment::new(text, self.page, x, y, width, height)
                .with_viewport(self.width, self.height),
        );
        self
    }

    /// A fragment sized from its text at the default glyph metrics.
    pub fn text(self, text: &str, x: f32, y: f32) -> Self {
        let width = text.chars().count() as f32 * CHAR_WIDTH;
        self.fragment(text, x, y, width, LINE_HEIGHT)
    }

    /// One fragment per line, lines stacked from `y` downwards.
    pub fn lines(mut self, x: f32, y: f32, lines: &[&str]) -> Self {
        for (i, line) in lines.iter().enumerate() {
            self = self.text(line, x, y + i as f32 * LINE_STEP);
        }
        self
    }

    pub fn build(self) -> Vec<TextFragment> {
        self.fragments
    }
}

pub fn config() -> MappingConfig {
    MappingConfig::default()
}

pub fn document(fragments: Vec<TextFragment>) -> ReconstructedDocument {
    ReconstructedDocument::from_ordered(fragments)
}

/// A single-column article page of `lines` lines.
pub fn article(lines: &[&str]) -> ReconstructedDocument {
    document(PageBuilder::new(1).lines(72.0, 100.0, lines).build())
}

pub const ARTICLE: &[&str] = &[
    "Revenue for the quarter increased",
    "by twelve percent compared with",
    "the prior year, driven mainly by",
    "strong demand in industrial markets.",
    "Operating margins improved as raw",
    "material costs declined steadily.",
];
