use super::labels::ai_points_from_labels;
use super::types::*;
use tracing::{debug, info};

/// Reduce one sprint's issues into the summary stored on the sprint
pub fn summarize(issues: Vec<WorkItem>, rules: &IssueRules) -> SprintMetricsSummary {
    let total_story_points: f64 = issues.iter().filter_map(|i| i.story_points).sum();
    let completed_story_points: f64 = issues
        .iter()
        .filter(|i| rules.is_completed(&i.status))
        .filter_map(|i| i.story_points)
        .sum();
    let completed_issues = issues
        .iter()
        .filter(|i| rules.is_completed(&i.status))
        .count();
    let defect_count = issues
        .iter()
        .filter(|i| rules.is_defect(&i.issue_type))
        .count();

    SprintMetricsSummary {
        total_issues: issues.len(),
        completed_issues,
        total_story_points,
        completed_story_points,
        defect_count,
        issues,
    }
}

impl Sprint {
    /// Attach issues to a tracker sprint record, computing its summary once
    pub fn from_record(record: SprintRecord, issues: Vec<WorkItem>, rules: &IssueRules) -> Self {
        Self {
            id: record.id,
            name: record.name,
            state: record.state,
            start_date: record.start_date,
            end_date: record.end_date,
            metrics: summarize(issues, rules),
        }
    }
}

/// Effort saved on one item.
///
/// The cached value wins unless it is zero or absent, in which case the
/// labels are parsed again. A cached value that is genuinely zero cannot be
/// told apart from one that was never computed.
pub fn effort_saved(item: &WorkItem) -> f64 {
    match item.ai_points_saved {
        Some(points) if points != 0.0 => points,
        _ => ai_points_from_labels(&item.labels).unwrap_or(0.0),
    }
}

/// Metrics for the sprint being reported on, including the AI-adjusted figures
pub fn current_sprint_metrics(sprint: &Sprint, rules: &IssueRules) -> CurrentSprintMetrics {
    let summary = &sprint.metrics;
    let total_story_points = summary.total_story_points;
    let completed_story_points = summary.completed_story_points;

    let mut time_saved_total = 0.0;
    let mut time_saved_completed = 0.0;
    let mut contributing = 0usize;

    for issue in &summary.issues {
        let saved = effort_saved(issue);
        if saved <= 0.0 {
            continue;
        }

        contributing += 1;
        debug!(
            key = %issue.key,
            points_saved = saved,
            labels = ?issue.labels,
            story_points = ?issue.story_points,
            "Issue carries saved effort"
        );

        time_saved_total += saved;
        if rules.is_completed_ignore_case(&issue.status) {
            time_saved_completed += saved;
        }
    }

    if contributing > 0 {
        info!(
            sprint = %sprint.name,
            issues = contributing,
            points_saved = time_saved_total,
            "Found issues with saved effort"
        );
    }

    let ai_story_points_committed = total_story_points + time_saved_total;
    let ai_story_points_completed = completed_story_points + time_saved_completed;

    let time_saved_percent = if ai_story_points_committed > 0.0 {
        round2(time_saved_total / ai_story_points_committed * 100.0)
    } else {
        0.0
    };

    let completion_rate = if total_story_points > 0.0 {
        round2(completed_story_points / total_story_points * 100.0)
    } else {
        0.0
    };

    CurrentSprintMetrics {
        sprint_name: sprint.name.clone(),
        committed_story_points: round2(total_story_points),
        completed_story_points: round2(completed_story_points),
        completion_rate,
        defect_count: summary.defect_count,
        total_issues: summary.total_issues,
        completed_issues: summary.completed_issues,
        ai_story_points_committed: round2(ai_story_points_committed),
        ai_story_points_completed: round2(ai_story_points_completed),
        time_saved_total: round2(time_saved_total),
        time_saved_completed: round2(time_saved_completed),
        time_saved_percent,
        has_ai_data: ai_story_points_committed > 0.0,
    }
}
