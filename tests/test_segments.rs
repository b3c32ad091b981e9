//! Integration tests for run segmentation and interloper detection.

use std::collections::BTreeSet;

use shelfcheck::arrangement::segments::{runs, segment, Segment};

fn seg(label: &str, start: usize, end: usize) -> Segment {
    Segment {
        label: label.to_string(),
        start,
        end,
    }
}

fn flagged(indices: &[usize]) -> BTreeSet<usize> {
    indices.iter().copied().collect()
}

#[test]
fn test_runs_are_maximal() {
    assert_eq!(
        runs(&["a", "a", "b", "a"]),
        vec![seg("a", 0, 1), seg("b", 2, 2), seg("a", 3, 3)]
    );
    assert_eq!(runs(&["a"]), vec![seg("a", 0, 0)]);
    assert!(runs::<&str>(&[]).is_empty());
}

#[test]
fn test_uniform_row_has_no_interlopers() {
    let analysis = segment(&["a", "a", "a"]);

    assert_eq!(analysis.segments, vec![seg("a", 0, 2)]);
    assert!(analysis.misplaced.is_empty());
}

#[test]
fn test_single_interloper_is_flagged() {
    let analysis = segment(&["a", "a", "b", "a"]);

    assert_eq!(analysis.misplaced, flagged(&[2]));
}

#[test]
fn test_alternating_labels() {
    // a spans 0..=2 and flags 1; b spans 1..=3 and flags 2
    let analysis = segment(&["a", "b", "a", "b"]);

    assert_eq!(analysis.misplaced, flagged(&[1, 2]));
}

#[test]
fn test_split_label_itself_is_not_blamed() {
    let analysis = segment(&["a", "b", "b", "a"]);

    assert_eq!(analysis.misplaced, flagged(&[1, 2]));
}

#[test]
fn test_overlapping_spans_flag_each_index_once() {
    // a spans 0..=3 flagging 1,2; b spans 1..=4 flagging 2,3
    let analysis = segment(&["a", "b", "c", "a", "b"]);

    assert_eq!(analysis.misplaced, flagged(&[1, 2, 3]));
}

#[test]
fn test_contiguous_blocks_are_correct() {
    let analysis = segment(&["a", "a", "b", "b", "c"]);

    assert_eq!(analysis.segments.len(), 3);
    assert!(analysis.misplaced.is_empty());
}

#[test]
fn test_empty_row() {
    let analysis = segment::<&str>(&[]);

    assert!(analysis.segments.is_empty());
    assert!(analysis.misplaced.is_empty());
}
