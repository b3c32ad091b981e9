//! Integration tests for shelf row clustering.

mod common;

use shelfcheck::arrangement::cluster_rows;

use common::*;

#[test]
fn test_rows_ordered_top_to_bottom() -> anyhow::Result<()> {
    let detections = vec![labelled("Low", 50, 500), labelled("High", 50, 100)];

    let rows = cluster_rows(&detections, 30.0)?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].members, vec![1]);
    assert_eq!(rows[1].members, vec![0]);
    assert_eq!(rows[0].y_mean, 100.0);
    assert_eq!(rows[1].y_mean, 500.0);
    Ok(())
}

#[test]
fn test_threshold_is_inclusive() -> anyhow::Result<()> {
    let same_row = vec![labelled("A", 0, 100), labelled("B", 50, 130)];
    assert_eq!(cluster_rows(&same_row, 30.0)?.len(), 1);

    let split = vec![labelled("A", 0, 100), labelled("B", 50, 131)];
    assert_eq!(cluster_rows(&split, 30.0)?.len(), 2);
    Ok(())
}

#[test]
fn test_row_mean_drifts_as_members_join() -> anyhow::Result<()> {
    // 140 is 40px from the first detection but within 30px of the mean 112.5
    let detections = vec![
        labelled("A", 0, 100),
        labelled("B", 50, 125),
        labelled("C", 100, 140),
    ];

    let rows = cluster_rows(&detections, 30.0)?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].members, vec![0, 1, 2]);
    assert!((rows[0].y_mean - 365.0 / 3.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_first_matching_row_wins() -> anyhow::Result<()> {
    // 125 is within 30px of both rows; it joins the one created first
    let detections = vec![
        labelled("A", 0, 100),
        labelled("B", 0, 150),
        labelled("C", 50, 125),
    ];

    let rows = cluster_rows(&detections, 30.0)?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].members, vec![0, 2]);
    assert_eq!(rows[1].members, vec![1]);
    Ok(())
}

#[test]
fn test_every_detection_lands_in_one_row() -> anyhow::Result<()> {
    let detections: Vec<Detection> = (0..12)
        .map(|i| labelled("P", 40 * i, 100 + 200 * (i % 3) + i % 5))
        .collect();

    let rows = cluster_rows(&detections, 30.0)?;

    let mut seen: Vec<usize> = rows.iter().flat_map(|r| r.members.clone()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..detections.len()).collect::<Vec<_>>());
    assert_eq!(rows.len(), 3);
    Ok(())
}

#[test]
fn test_empty_input_is_rejected() {
    let result = cluster_rows(&[], 30.0);

    assert!(
        matches!(result, Err(ArrangementError::InvalidInput { .. })),
        "Empty input should be InvalidInput, got: {:?}",
        result
    );
}

#[test]
fn test_non_positive_threshold_is_rejected() {
    let detections = vec![labelled("A", 0, 100)];

    for thresh in [0.0, -5.0, f64::NAN] {
        let result = cluster_rows(&detections, thresh);
        assert!(
            matches!(result, Err(ArrangementError::InvalidConfig { .. })),
            "Threshold {} should be rejected",
            thresh
        );
    }
}
