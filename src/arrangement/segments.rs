use std::collections::{BTreeSet, HashMap};

/// A maximal run of identical labels, `start..=end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentAnalysis {
    pub segments: Vec<Segment>,
    pub misplaced: BTreeSet<usize>,
}

/// Split a row's normalized labels into maximal runs.
pub fn runs<S: AsRef<str>>(labels: &[S]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let Some(first) = labels.first() else {
        return segments;
    };

    let mut current = first.as_ref();
    let mut start = 0;
    for (i, label) in labels.iter().enumerate().skip(1) {
        let label = label.as_ref();
        if label != current {
            segments.push(Segment {
                label: current.to_string(),
                start,
                end: i - 1,
            });
            current = label;
            start = i;
        }
    }
    segments.push(Segment {
        label: current.to_string(),
        start,
        end: labels.len() - 1,
    });
    segments
}

/// Find interlopers: for every label split across several runs, each index
/// between its first run's start and last run's end carrying another label.
///
/// The split label's own instances are never blamed.
pub fn segment<S: AsRef<str>>(labels: &[S]) -> SegmentAnalysis {
    let segments = runs(labels);

    let mut by_label: HashMap<&str, Vec<&Segment>> = HashMap::new();
    for segment in &segments {
        by_label.entry(segment.label.as_str()).or_default().push(segment);
    }

    let mut misplaced = BTreeSet::new();
    for (label, spans) in &by_label {
        if spans.len() < 2 {
            continue;
        }
        let first = spans[0].start;
        let last = spans[spans.len() - 1].end;
        misplaced.extend((first..=last).filter(|&i| labels[i].as_ref() != *label));
    }

    SegmentAnalysis {
        segments,
        misplaced,
    }
}
