//! Pure aggregation queries over a snapshot of detection records.
//!
//! Every function takes `&[DetectionRecord]` so callers can aggregate any
//! window produced by [`crate::AnalyticsStore::snapshot`] without holding
//! the store lock.

use std::collections::BTreeMap;

use fpulse_models::{AnalyticsSummary, ClassCount, DetectionRecord, TransitionEdge};

/// Summarize a window of records: frame and detection totals, number of
/// distinct classes, and the top `k` classes by count.
///
/// Ties in the top-K ranking break by ascending label. Classes with zero
/// observed detections never appear.
pub fn summarize(records: &[DetectionRecord], top_k: usize) -> AnalyticsSummary {
    let class_totals = windowed_class_totals(records);

    // BTreeMap iterates alphabetically, so the stable sort keeps equal
    // counts in label order.
    let mut ranked: Vec<ClassCount> = class_totals
        .iter()
        .map(|(label, count)| ClassCount::new(label.clone(), *count))
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_k);

    AnalyticsSummary {
        frame_count: records.len() as u64,
        total_detections: records.iter().map(|r| r.total_detections).sum(),
        unique_class_count: class_totals.len() as u64,
        top_classes: ranked,
    }
}

/// Sum per-class counts across the window. Classes absent from every record
/// are omitted, so the result never contains zero entries.
pub fn windowed_class_totals(records: &[DetectionRecord]) -> BTreeMap<String, u64> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        for (label, count) in &record.per_class_counts {
            *totals.entry(label.clone()).or_insert(0) += count;
        }
    }
    totals
}

/// One edge per adjacent pair of records, weighted by the later record's
/// detection total. Fewer than two records yield no edges.
pub fn transitions(records: &[DetectionRecord]) -> Vec<TransitionEdge> {
    records
        .windows(2)
        .map(|pair| {
            TransitionEdge::new(
                pair[0].frame_ordinal,
                pair[1].frame_ordinal,
                pair[1].total_detections,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpulse_models::FrameObservation;

    fn record(ordinal: u64, counts: &[(&str, u64)]) -> DetectionRecord {
        let per_class_counts: BTreeMap<String, u64> = counts
            .iter()
            .map(|(label, count)| (label.to_string(), *count))
            .collect();
        DetectionRecord::new(
            ordinal,
            FrameObservation {
                total_detections: per_class_counts.values().sum(),
                per_class_counts,
                classes_available: true,
            },
        )
    }

    #[test]
    fn test_summarize_totals() {
        let records = vec![
            record(1, &[("cat", 1)]),
            record(2, &[("dog", 2), ("cat", 1)]),
        ];
        let summary = summarize(&records, 5);

        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.total_detections, 4);
        assert_eq!(summary.unique_class_count, 2);
    }

    #[test]
    fn test_summarize_total_matches_record_sum() {
        let records = vec![
            record(1, &[("person", 3)]),
            record(2, &[]),
            record(3, &[("car", 2), ("person", 1)]),
        ];
        let summary = summarize(&records, 5);
        let expected: u64 = records.iter().map(|r| r.total_detections).sum();
        assert_eq!(summary.total_detections, expected);
    }

    #[test]
    fn test_top_k_ranking_and_truncation() {
        let records = vec![record(
            1,
            &[("person", 5), ("car", 3), ("dog", 1), ("cat", 2)],
        )];
        let summary = summarize(&records, 2);

        assert_eq!(summary.top_classes.len(), 2);
        assert_eq!(summary.top_classes[0], ClassCount::new("person", 5));
        assert_eq!(summary.top_classes[1], ClassCount::new("car", 3));
        // unique_class_count still reflects the full distribution
        assert_eq!(summary.unique_class_count, 4);
    }

    #[test]
    fn test_top_k_ties_break_alphabetically() {
        let records = vec![record(1, &[("dog", 2), ("cat", 2), ("ant", 1)])];
        let summary = summarize(&records, 2);

        assert_eq!(summary.top_classes[0], ClassCount::new("cat", 2));
        assert_eq!(summary.top_classes[1], ClassCount::new("dog", 2));
    }

    #[test]
    fn test_summarize_empty_window() {
        let summary = summarize(&[], 5);
        assert_eq!(summary.frame_count, 0);
        assert_eq!(summary.total_detections, 0);
        assert_eq!(summary.unique_class_count, 0);
        assert!(summary.top_classes.is_empty());
    }

    #[test]
    fn test_windowed_class_totals_sums_across_records() {
        let records = vec![
            record(1, &[("cat", 1)]),
            record(2, &[("dog", 2), ("cat", 1)]),
        ];
        let totals = windowed_class_totals(&records);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("cat"), Some(&2));
        assert_eq!(totals.get("dog"), Some(&2));
    }

    #[test]
    fn test_windowed_class_totals_omits_absent_classes() {
        let records = vec![record(1, &[]), record(2, &[("bird", 1)])];
        let totals = windowed_class_totals(&records);
        assert_eq!(totals.len(), 1);
        assert!(!totals.contains_key("cat"));
    }

    #[test]
    fn test_transitions_adjacent_pairs() {
        let mut second = record(2, &[("person", 5)]);
        second.total_detections = 5;
        let records = vec![record(1, &[("person", 3)]), second];

        let edges = transitions(&records);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0], TransitionEdge::new(1, 2, 5));
        assert_eq!(edges[0].from, "1");
        assert_eq!(edges[0].to, "2");
    }

    #[test]
    fn test_transitions_need_two_records() {
        assert!(transitions(&[]).is_empty());
        assert!(transitions(&[record(1, &[("cat", 1)])]).is_empty());
    }

    #[test]
    fn test_transitions_length() {
        let records: Vec<_> = (1..=5).map(|i| record(i, &[("person", i)])).collect();
        assert_eq!(transitions(&records).len(), 4);
    }
}
