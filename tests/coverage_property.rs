//! Property tests for the segmentation coverage invariant.

use docsmith::model::{Section, sections_cover_source};
use proptest::prelude::*;

fn section_bodies() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{2,12}( [a-z]{2,12}){0,6}", 1..8)
}

proptest! {
    /// A synthetic partition of the source always passes the coverage check,
    /// regardless of how whitespace falls between sections.
    #[test]
    fn exact_partitions_cover_the_source(bodies in section_bodies()) {
        let source = bodies.join("\n\n");
        let sections: Vec<Section> = bodies
            .iter()
            .enumerate()
            .map(|(index, body)| Section {
                title: format!("Section {index}"),
                content: body.clone(),
            })
            .collect();
        prop_assert!(sections_cover_source(&sections, &source));
    }

    /// Dropping any one section makes the check fail: segmentation that
    /// loses text is always detected.
    #[test]
    fn dropping_a_section_breaks_coverage(
        bodies in section_bodies(),
        drop_seed in any::<prop::sample::Index>(),
    ) {
        let source = bodies.join("\n\n");
        let drop_at = drop_seed.index(bodies.len());
        let sections: Vec<Section> = bodies
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != drop_at)
            .map(|(index, body)| Section {
                title: format!("Section {index}"),
                content: body.clone(),
            })
            .collect();
        prop_assert!(!sections_cover_source(&sections, &source));
    }

    /// Leading/trailing whitespace added per section never counts as a
    /// coverage violation; only dropped characters do.
    #[test]
    fn whitespace_redistribution_is_tolerated(bodies in section_bodies()) {
        let source = bodies.join(" ");
        let sections: Vec<Section> = bodies
            .iter()
            .map(|body| Section {
                title: "S".to_string(),
                content: format!("  {body}\n"),
            })
            .collect();
        prop_assert!(sections_cover_source(&sections, &source));
    }
}
