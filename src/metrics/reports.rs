use super::types::*;

pub struct MetricsReporter;

impl MetricsReporter {
    /// Plain-text summary printed after metrics are calculated for a team
    pub fn format_metrics_summary(metrics: &ComprehensiveMetrics) -> String {
        let mut report = String::new();

        report.push_str("📊 METRICS SUMMARY\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        match &metrics.current_sprint {
            Some(current) => {
                report.push_str(&format!("🏃 CURRENT SPRINT: {}\n", current.sprint_name));
                report.push_str(&format!(
                    "   Story Points Committed: {}\n",
                    current.committed_story_points
                ));
                report.push_str(&format!(
                    "   Story Points Completed: {}\n",
                    current.completed_story_points
                ));
                report.push_str(&format!("   Completion Rate:        {}%\n", current.completion_rate));
                report.push_str(&format!("   Defects:                {}\n", current.defect_count));
                report.push('\n');

                if current.has_ai_data {
                    report.push_str("🤖 AI IMPACT\n");
                    report.push_str(&format!(
                        "   Story Points without AI: {} SP\n",
                        current.ai_story_points_committed
                    ));
                    report.push_str(&format!(
                        "   Story Points with AI:    {} SP\n",
                        current.committed_story_points
                    ));
                    report.push_str(&format!(
                        "   Time Saved:              {} SP ({}%)\n",
                        current.time_saved_total, current.time_saved_percent
                    ));
                    report.push_str(&format!(
                        "   Time Saved (Completed):  {} SP\n",
                        current.time_saved_completed
                    ));
                    report.push('\n');
                }
            }
            None => {
                report.push_str("🏃 CURRENT SPRINT: unknown\n\n");
            }
        }

        let improvement = &metrics.velocity_improvement;
        report.push_str("🚀 VELOCITY IMPROVEMENT\n");
        report.push_str(&format!(
            "   Baseline Velocity: {} SP ({} sprints)\n",
            improvement.baseline_velocity, metrics.baseline_velocity.sprint_count
        ));
        report.push_str(&format!(
            "   Post-AI Velocity:  {} SP ({} sprints)\n",
            improvement.post_ai_velocity, metrics.post_ai_velocity.sprint_count
        ));
        report.push_str(&format!(
            "   Improvement:       {}%\n",
            improvement.improvement_percent
        ));
        report.push('\n');

        let defects = &metrics.defect_metrics;
        report.push_str("🐞 DEFECT METRICS\n");
        report.push_str(&format!(
            "   Baseline Avg Defects: {}\n",
            defects.baseline_avg_defects
        ));
        report.push_str(&format!(
            "   Post-AI Avg Defects:  {}\n",
            defects.post_ai_avg_defects
        ));
        report.push_str(&format!(
            "   Defect Reduction:     {}%\n",
            defects.defect_reduction_percent
        ));

        if metrics.baseline_velocity.sprint_count == 0 || metrics.post_ai_velocity.sprint_count == 0 {
            report.push('\n');
            report.push_str(&format!(
                "   Note: one comparison period has no sprints with completed work (adoption date {})\n",
                metrics.ai_adoption_date
            ));
        }

        report
    }
}
