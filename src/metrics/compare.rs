use super::classifier::is_baseline;
use super::types::*;
use chrono::NaiveDate;

/// Percentage reported when the baseline is zero but the post period is not
pub const ZERO_BASELINE_IMPROVEMENT: f64 = 100.0;

/// Split sprints into (baseline, post-adoption) by end date.
///
/// Sprints without any end date take part in neither side.
pub fn split_by_adoption(sprints: &[Sprint], cutoff: NaiveDate) -> (Vec<&Sprint>, Vec<&Sprint>) {
    sprints
        .iter()
        .filter(|sprint| sprint.end_date.as_deref().is_some_and(|d| !d.is_empty()))
        .partition(|sprint| is_baseline(sprint.end_date.as_deref(), cutoff))
}

pub fn velocity_improvement(baseline: &VelocityStat, post_ai: &VelocityStat) -> VelocityImprovement {
    let baseline_velocity = baseline.average_velocity;
    let post_ai_velocity = post_ai.average_velocity;

    let improvement_percent = if baseline_velocity == 0.0 {
        if post_ai_velocity == 0.0 {
            0.0
        } else {
            ZERO_BASELINE_IMPROVEMENT
        }
    } else {
        (post_ai_velocity - baseline_velocity) / baseline_velocity * 100.0
    };

    VelocityImprovement {
        baseline_velocity,
        post_ai_velocity,
        improvement_percent: round2(improvement_percent),
        improvement_points: round2(post_ai_velocity - baseline_velocity),
    }
}

fn average_defects(sprints: &[&Sprint]) -> f64 {
    if sprints.is_empty() {
        return 0.0;
    }
    let total: usize = sprints.iter().map(|s| s.metrics.defect_count).sum();
    total as f64 / sprints.len() as f64
}

/// Compare average defects per sprint before and after adoption.
///
/// Unlike velocity, sprints with zero defects count toward the averages.
pub fn defect_metrics(sprints: &[Sprint], cutoff: NaiveDate) -> DefectMetrics {
    let (baseline, post_ai) = split_by_adoption(sprints, cutoff);
    defect_metrics_from_averages(average_defects(&baseline), average_defects(&post_ai))
}

pub fn defect_metrics_from_averages(baseline_avg: f64, post_ai_avg: f64) -> DefectMetrics {
    let (defect_reduction, defect_reduction_percent) = if baseline_avg > 0.0 {
        let reduction = baseline_avg - post_ai_avg;
        (reduction, reduction / baseline_avg * 100.0)
    } else {
        (0.0, 0.0)
    };

    DefectMetrics {
        baseline_avg_defects: round2(baseline_avg),
        post_ai_avg_defects: round2(post_ai_avg),
        defect_reduction: round2(defect_reduction),
        defect_reduction_percent: round2(defect_reduction_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(average_velocity: f64) -> VelocityStat {
        VelocityStat {
            average_velocity,
            ..Default::default()
        }
    }

    fn sprint(id: u64, end_date: Option<&str>, defects: usize) -> Sprint {
        Sprint {
            id,
            name: format!("Sprint {}", id),
            state: SprintState::Closed,
            start_date: None,
            end_date: end_date.map(String::from),
            metrics: SprintMetricsSummary {
                defect_count: defects,
                ..Default::default()
            },
        }
    }

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_improvement_edge_policies() {
        assert_eq!(velocity_improvement(&stat(0.0), &stat(0.0)).improvement_percent, 0.0);
        assert_eq!(velocity_improvement(&stat(0.0), &stat(5.0)).improvement_percent, 100.0);
        assert_eq!(velocity_improvement(&stat(10.0), &stat(15.0)).improvement_percent, 50.0);
    }

    #[test]
    fn test_improvement_points_are_unbounded() {
        let improvement = velocity_improvement(&stat(0.0), &stat(42.5));
        assert_eq!(improvement.improvement_percent, 100.0);
        assert_eq!(improvement.improvement_points, 42.5);

        let regression = velocity_improvement(&stat(20.0), &stat(15.0));
        assert_eq!(regression.improvement_percent, -25.0);
        assert_eq!(regression.improvement_points, -5.0);
    }

    #[test]
    fn test_zero_baseline_defects_never_goes_negative() {
        let metrics = defect_metrics_from_averages(0.0, 3.0);
        assert_eq!(metrics.defect_reduction, 0.0);
        assert_eq!(metrics.defect_reduction_percent, 0.0);
        assert_eq!(metrics.post_ai_avg_defects, 3.0);
    }

    #[test]
    fn test_defects_only_after_adoption() {
        let sprints = vec![
            sprint(1, Some("2024-02-01"), 2),
            sprint(2, Some("2024-03-01T09:00:00.000Z"), 4),
        ];
        let metrics = defect_metrics(&sprints, cutoff());

        assert_eq!(metrics.baseline_avg_defects, 0.0);
        assert_eq!(metrics.post_ai_avg_defects, 3.0);
        assert_eq!(metrics.defect_reduction, 0.0);
        assert_eq!(metrics.defect_reduction_percent, 0.0);
    }

    #[test]
    fn test_one_defect_in_eight_sprints_rounds_to_even() {
        let mut sprints: Vec<Sprint> = (1..=7).map(|id| sprint(id, Some("2023-06-01"), 0)).collect();
        sprints.push(sprint(8, Some("2023-07-01"), 1));
        let metrics = defect_metrics(&sprints, cutoff());

        assert_eq!(metrics.baseline_avg_defects, 0.12);
        assert_eq!(metrics.defect_reduction, 0.12);
        assert_eq!(metrics.defect_reduction_percent, 100.0);
    }

    #[test]
    fn test_defect_averages_include_zero_sprints() {
        let sprints = vec![
            sprint(1, Some("2023-10-01"), 4),
            sprint(2, Some("2023-11-01"), 0),
            sprint(3, Some("2024-02-01T10:00:00.000Z"), 1),
            sprint(4, Some("2024-03-01"), 0),
        ];
        let metrics = defect_metrics(&sprints, cutoff());

        assert_eq!(metrics.baseline_avg_defects, 2.0);
        assert_eq!(metrics.post_ai_avg_defects, 0.5);
        assert_eq!(metrics.defect_reduction, 1.5);
        assert_eq!(metrics.defect_reduction_percent, 75.0);
    }

    #[test]
    fn test_split_skips_sprints_without_end_date() {
        let sprints = vec![
            sprint(1, None, 9),
            sprint(2, Some(""), 9),
            sprint(3, Some("garbage"), 1),
            sprint(4, Some("2024-06-01"), 1),
        ];
        let (baseline, post_ai) = split_by_adoption(&sprints, cutoff());

        assert_eq!(baseline.iter().map(|s| s.id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(post_ai.iter().map(|s| s.id).collect::<Vec<_>>(), vec![4]);
    }
}
