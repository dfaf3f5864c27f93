mod common;

use common::{article, config, document, setup, PageBuilder, ARTICLE, LINE_HEIGHT};
use delver_highlight::{
    map_chunks, map_keyed_chunks, map_text_to_coordinates, trace_text_to_coordinates,
    validate_highlight, MappingConfig, ReconstructedDocument, Rejection, Strategy, TextFragment,
};
use pretty_assertions::assert_eq;

const TWO_LINES: &str = "by twelve percent compared with the prior year, driven mainly by";

#[test]
fn chunk_spanning_two_lines_gets_one_rect_per_line() {
    setup();
    let doc = article(ARTICLE);
    let report = trace_text_to_coordinates(&doc, TWO_LINES, &config());

    let position = report.highlight().cloned().unwrap();
    assert_eq!(report.trace.strategy(), Some(Strategy::Exact));
    assert_eq!(report.trace.fragment_indices, vec![1, 2]);
    assert_eq!(report.trace.quality, Some(1.0));

    assert_eq!(position.page_number, 1);
    assert_eq!(position.rects.len(), 2);

    let first = position.rects[0];
    assert_eq!((first.x1, first.y1, first.x2, first.y2), (72.0, 116.0, 258.0, 128.0));
    let second = position.rects[1];
    assert_eq!((second.x1, second.y1, second.x2, second.y2), (72.0, 132.0, 264.0, 144.0));

    let bounds = position.bounding_rect;
    assert_eq!((bounds.x1, bounds.y1, bounds.x2, bounds.y2), (72.0, 116.0, 264.0, 144.0));
    assert_eq!((bounds.width, bounds.height), (800.0, 1200.0));
    for rect in &position.rects {
        assert!(bounds.to_rect().contains(&rect.to_rect()));
    }
    assert!(validate_highlight(&position).is_valid());
}

#[test]
fn unrelated_chunk_maps_to_none() {
    let doc = article(ARTICLE);
    let chunk = "photosynthesis converts sunlight into chemical energy";
    assert_eq!(map_text_to_coordinates(&doc, chunk, &config()), None);

    let report = trace_text_to_coordinates(&doc, chunk, &config());
    assert_eq!(report.outcome, Err(Rejection::NotFound));
    assert_eq!(report.trace.rejection, Some(Rejection::NotFound));
}

#[test]
fn short_chunks_are_rejected_before_matching() {
    let doc = article(ARTICLE);
    let report = trace_text_to_coordinates(&doc, "  Revenue ", &config());
    assert_eq!(report.outcome, Err(Rejection::ChunkTooShort { chars: 7 }));
    assert!(report.trace.attempts.is_empty());
}

#[test]
fn empty_document_rejects_every_chunk() {
    let doc = document(Vec::new());
    let report = trace_text_to_coordinates(&doc, "revenue for the quarter", &config());
    assert_eq!(report.outcome, Err(Rejection::EmptyDocument));
}

#[test]
fn matched_fragments_must_resemble_the_chunk() {
    // Exact hit on a sliver of a long fragment: the fragment text as a whole
    // shares too few words with the chunk.
    let doc = document(
        PageBuilder::new(1)
            .text(
                "Our auditors reviewed quarterly revenue recognition policies across every subsidiary",
                72.0,
                100.0,
            )
            .build(),
    );
    let report = trace_text_to_coordinates(&doc, "quarterly revenue", &config());

    match report.outcome {
        Err(Rejection::LowConfidence { similarity }) => {
            assert!((similarity - 0.2).abs() < 1e-9);
        }
        other => panic!("expected low confidence, got {other:?}"),
    }
    assert_eq!(report.trace.strategy(), Some(Strategy::Exact));
}

#[test]
fn quality_threshold_is_configurable() {
    let doc = document(
        PageBuilder::new(1)
            .text(
                "Our auditors reviewed quarterly revenue recognition policies across every subsidiary",
                72.0,
                100.0,
            )
            .build(),
    );
    let lenient = MappingConfig {
        quality_threshold: 0.1,
        ..MappingConfig::default()
    };
    let position = map_text_to_coordinates(&doc, "quarterly revenue", &lenient).unwrap();
    assert_eq!(position.rects.len(), 1);
}

#[test]
fn fuzzy_match_is_reported_with_its_strategy() {
    let doc = article(ARTICLE);
    let report = trace_text_to_coordinates(
        &doc,
        "Revenue for the quarter increased at twelve percent compared with",
        &config(),
    );
    assert!(report.outcome.is_ok());
    assert_eq!(report.trace.strategy(), Some(Strategy::HighFidelityFuzzy));
    assert_eq!(report.trace.fragment_indices, vec![0, 1]);
}

#[test]
fn mapping_is_idempotent() {
    let doc = article(ARTICLE);
    let chunks = [
        TWO_LINES,
        "strong demand in industrial markets operating margins improved as raw",
        "photosynthesis converts sunlight into chemical energy",
    ];
    for chunk in chunks {
        assert_eq!(
            trace_text_to_coordinates(&doc, chunk, &config()),
            trace_text_to_coordinates(&doc, chunk, &config())
        );
    }
}

#[test]
fn malformed_fragments_are_skipped_in_geometry() {
    let mut fragments = PageBuilder::new(1)
        .lines(72.0, 100.0, &["Operating margins improved as raw"])
        .build();
    fragments.push(TextFragment::new(
        "material costs declined steadily.",
        1,
        f32::NAN,
        116.0,
        198.0,
        LINE_HEIGHT,
    ));
    let doc = ReconstructedDocument::from_ordered(fragments);

    let report = trace_text_to_coordinates(
        &doc,
        "operating margins improved as raw material costs declined steadily.",
        &config(),
    );
    let position = report.highlight().cloned().unwrap();
    assert_eq!(report.trace.malformed_fragments, 1);
    assert_eq!(position.rects.len(), 1);
    assert_eq!(position.rects[0].x2, 72.0 + 33.0 * 6.0);
}

#[test]
fn chunk_on_malformed_fragments_only_has_no_geometry() {
    let doc = document(vec![TextFragment::new(
        "material costs declined steadily.",
        1,
        72.0,
        100.0,
        0.0,
        LINE_HEIGHT,
    )]);
    let report = trace_text_to_coordinates(&doc, "material costs declined", &config());
    assert_eq!(report.outcome, Err(Rejection::NoGeometry));
}

#[test]
fn highlight_stays_on_the_first_matched_page() {
    let mut fragments = PageBuilder::new(1)
        .text("The board met on Tuesday to review", 72.0, 1100.0)
        .build();
    fragments.extend(
        PageBuilder::new(2)
            .text("the acquisition proposal in detail.", 72.0, 80.0)
            .build(),
    );
    let doc = document(fragments);

    let report = trace_text_to_coordinates(
        &doc,
        "the board met on tuesday to review the acquisition proposal in detail.",
        &config(),
    );
    let position = report.highlight().cloned().unwrap();
    assert_eq!(report.trace.fragment_indices, vec![0, 1]);
    assert_eq!(position.page_number, 1);
    assert!(position.rects.iter().all(|r| r.page_number == 1));
    assert_eq!(position.rects.len(), 1);
}

#[test]
fn ligatures_match_only_with_compatibility_folding() {
    let fragments = PageBuilder::new(1)
        .text("The e\u{FB03}cient frontier of o\u{FB03}ce portfolios", 72.0, 100.0)
        .build();
    let chunk = "the efficient frontier of office portfolios";

    let plain = ReconstructedDocument::from_ordered(fragments.clone());
    assert_eq!(map_text_to_coordinates(&plain, chunk, &config()), None);

    let folding = MappingConfig {
        compat_fold: true,
        ..MappingConfig::default()
    };
    let folded = ReconstructedDocument::from_ordered_with(fragments, &folding);
    let report = trace_text_to_coordinates(&folded, chunk, &folding);
    assert_eq!(report.trace.strategy(), Some(Strategy::Exact));
    assert!(report.outcome.is_ok());
}

#[test]
fn chunks_follow_the_normalization_of_their_document() {
    let text = "The e\u{FB03}cient frontier of o\u{FB03}ce portfolios";
    let doc = document(PageBuilder::new(1).text(text, 72.0, 100.0).build());
    let folding = MappingConfig {
        compat_fold: true,
        ..MappingConfig::default()
    };

    // The document was built without folding, so the chunk must not be folded either.
    assert!(!doc.compat_fold());
    let report = trace_text_to_coordinates(&doc, text, &folding);
    assert_eq!(report.trace.strategy(), Some(Strategy::Exact));
    assert_eq!(report.trace.quality, Some(1.0));
    assert!(report.outcome.is_ok());
}

#[test]
fn fragments_on_one_line_map_to_a_single_rect() {
    setup();
    let doc = document(
        PageBuilder::new(1)
            .text("The quick ", 10.0, 100.0)
            .text("brown fox ", 70.0, 100.0)
            .text("jumps.", 130.0, 100.0)
            .build(),
    );
    let report = trace_text_to_coordinates(&doc, "The quick brown fox jumps.", &config());

    assert_eq!(report.trace.strategy(), Some(Strategy::Exact));
    assert_eq!(report.trace.fragment_indices, vec![0, 1, 2]);

    let position = report.highlight().cloned().unwrap();
    assert_eq!(position.page_number, 1);
    assert_eq!(position.rects.len(), 1);

    let bounds = position.bounding_rect;
    assert_eq!((bounds.x1, bounds.y1, bounds.x2, bounds.y2), (10.0, 100.0, 166.0, 100.0 + LINE_HEIGHT));
    let line = position.rects[0];
    assert_eq!((line.x1, line.y1, line.x2, line.y2), (10.0, 100.0, 166.0, 112.0));
}

#[test]
fn batch_keeps_input_order_and_omits_misses() {
    setup();
    let doc = article(ARTICLE);
    let chunks = vec![
        "strong demand in industrial markets. Operating margins improved as raw",
        "photosynthesis converts sunlight into chemical energy",
        TWO_LINES,
        "short",
    ];

    let results = map_chunks(&doc, &chunks, &config());
    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, vec![chunks[0], chunks[2]]);

    for (chunk, position) in &results {
        assert_eq!(Some(position), map_text_to_coordinates(&doc, chunk, &config()).as_ref());
    }
}

#[test]
fn keyed_batch_uses_caller_keys() {
    let doc = article(ARTICLE);
    let chunks = vec![
        (7u32, TWO_LINES.to_string()),
        (3u32, "nothing like this appears anywhere".to_string()),
        (1u32, "Revenue for the quarter increased".to_string()),
    ];

    let results = map_keyed_chunks(&doc, &chunks, &config());
    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![7, 1]);
    assert_eq!(results[&1].rects.len(), 1);
    assert_eq!(results[&7].rects.len(), 2);
}

#[test]
fn reports_serialize_with_renderer_field_names() {
    let doc = article(ARTICLE);
    let position = map_text_to_coordinates(&doc, TWO_LINES, &config()).unwrap();
    let json = serde_json::to_value(&position).unwrap();

    assert_eq!(json["pageNumber"], 1);
    assert_eq!(json["boundingRect"]["x1"], 72.0);
    assert_eq!(json["boundingRect"]["pageNumber"], 1);
    assert_eq!(json["rects"].as_array().map(Vec::len), Some(2));

    let report = trace_text_to_coordinates(&doc, "short", &config());
    let json = serde_json::to_value(&report.trace).unwrap();
    assert_eq!(json["rejection"]["kind"], "chunk_too_short");
    assert_eq!(json["rejection"]["chars"], 5);
}
