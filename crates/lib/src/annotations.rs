//! # Annotation Collector
//!
//! Flattens a `VisionResult` into a uniform list of `Annotation`s, one per
//! entry, tagged with the category of the list it came from.

use crate::types::{Annotation, AnnotationCategory, ScoredEntity, VisionResult};

/// Confidence assigned to OCR text, which the vision service does not score.
pub const TEXT_CONFIDENCE: f32 = 1.0;

/// Collects every label, web entity, object and text span as an `Annotation`.
///
/// Source order within each category is preserved. Entries with a blank
/// description are dropped. A scored entry missing its score gets `0.0`,
/// so it can never pass a confidence threshold.
pub fn collect(result: &VisionResult) -> Vec<Annotation> {
    let mut annotations = Vec::with_capacity(
        result.labels.len()
            + result.web_detection.web_entities.len()
            + result.objects.len()
            + result.texts.len(),
    );

    push_scored(&mut annotations, AnnotationCategory::Label, &result.labels);
    push_scored(
        &mut annotations,
        AnnotationCategory::WebEntity,
        &result.web_detection.web_entities,
    );
    push_scored(&mut annotations, AnnotationCategory::Object, &result.objects);

    annotations.extend(
        result
            .texts
            .iter()
            .filter(|t| !t.description.trim().is_empty())
            .map(|t| {
                Annotation::new(
                    AnnotationCategory::Text,
                    t.description.clone(),
                    t.score.unwrap_or(TEXT_CONFIDENCE),
                )
            }),
    );

    annotations
}

fn push_scored(out: &mut Vec<Annotation>, category: AnnotationCategory, entries: &[ScoredEntity]) {
    out.extend(
        entries
            .iter()
            .filter(|e| !e.description.trim().is_empty())
            .map(|e| Annotation::new(category, e.description.clone(), e.score.unwrap_or(0.0))),
    );
}
