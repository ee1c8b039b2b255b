// Property-based tests for label parsing and velocity invariants

use chrono::NaiveDate;
use proptest::prelude::*;
use sprint_velocity::metrics::classifier::is_baseline;
use sprint_velocity::metrics::labels::{ai_points_from_labels, parse_ai_label};
use sprint_velocity::metrics::{calculate_velocity, IssueRules, Sprint, SprintRecord, SprintState, WorkItem};

fn sprint_with_completed(id: u64, points: f64) -> Sprint {
    let record = SprintRecord {
        id,
        name: format!("Sprint {}", id),
        state: SprintState::Closed,
        start_date: None,
        end_date: Some("2023-06-01".to_string()),
    };
    let issues = vec![WorkItem::new(format!("P-{}", id), "Done", "Story").with_story_points(points)];
    Sprint::from_record(record, issues, &IssueRules::default())
}

proptest! {
    #[test]
    fn valid_labels_parse_to_their_value(points in 1u32..=999, lower in any::<bool>(), pad in 0usize..3) {
        let prefix = if lower { "ai" } else { "AI" };
        let label = format!("{}{}{}", " ".repeat(pad), prefix, points);
        prop_assert_eq!(parse_ai_label(&label), Some(f64::from(points)));
    }

    #[test]
    fn out_of_range_values_are_rejected(points in 1000u32..10_000_000) {
        let label = format!("AI{}", points);
        prop_assert_eq!(parse_ai_label(&label), None);
    }

    #[test]
    fn labels_with_extra_characters_are_rejected(points in 1u32..=999, suffix in "[a-zA-Z.-]{1,3}") {
        let trailing = format!("AI{}{}", points, suffix);
        let spaced = format!("AI {}", points);
        prop_assert_eq!(parse_ai_label(&trailing), None);
        prop_assert_eq!(parse_ai_label(&spaced), None);
    }

    #[test]
    fn parsed_values_stay_in_range(label in "\\PC{0,8}") {
        if let Some(points) = parse_ai_label(&label) {
            prop_assert!((1.0..=999.0).contains(&points));
            prop_assert_eq!(points.fract(), 0.0);
        }
    }

    #[test]
    fn first_valid_label_wins(first in 1u32..=999, second in 1u32..=999) {
        let labels = vec![
            "backend".to_string(),
            format!("AI{}", first),
            format!("AI{}", second),
        ];
        prop_assert_eq!(ai_points_from_labels(&labels), Some(f64::from(first)));
    }

    #[test]
    fn velocity_ignores_non_positive_sprints(values in prop::collection::vec(-5i32..40, 0..12)) {
        let sprints: Vec<Sprint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| sprint_with_completed(i as u64, f64::from(*v)))
            .collect();
        let stat = calculate_velocity(&sprints);

        let positive: Vec<f64> = values.iter().filter(|v| **v > 0).map(|v| f64::from(*v)).collect();
        prop_assert_eq!(stat.sprint_count, positive.len());
        prop_assert!(stat.velocities.iter().all(|v| *v > 0.0));
        if positive.is_empty() {
            prop_assert_eq!(stat.average_velocity, 0.0);
        } else {
            let min = positive.iter().cloned().fold(f64::MAX, f64::min);
            let max = positive.iter().cloned().fold(0.0, f64::max);
            prop_assert!(stat.average_velocity >= min - 0.01 && stat.average_velocity <= max + 0.01);
        }
    }

    #[test]
    fn classification_matches_date_order(offset in -400i64..400) {
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = cutoff + chrono::Duration::days(offset);
        let text = format!("{}T12:00:00.000Z", end.format("%Y-%m-%d"));
        prop_assert_eq!(is_baseline(Some(text.as_str()), cutoff), offset < 0);
    }
}
