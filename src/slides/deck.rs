use super::chart::bar_chart;
use crate::metrics::{ComprehensiveMetrics, CurrentSprintMetrics};
use chrono::NaiveDateTime;

const FRONT_MATTER: &str = "---\nmarp: true\ntheme: default\npaginate: true\n---\n";
const SLIDE_BREAK: &str = "\n---\n\n";

/// Renders a team's metrics as a Marp markdown slide deck
#[derive(Debug, Clone)]
pub struct DeckRenderer {
    team_name: String,
}

impl DeckRenderer {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
        }
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Full deck; the AI impact slide only appears when the sprint has AI data
    pub fn render(&self, metrics: &ComprehensiveMetrics, generated_at: NaiveDateTime) -> String {
        let mut slides = vec![
            self.title_slide(metrics, generated_at),
            current_sprint_slide(metrics.current_sprint.as_ref()),
        ];

        if let Some(current) = metrics.current_sprint.as_ref().filter(|c| c.has_ai_data) {
            slides.push(ai_impact_slide(current));
        }

        slides.push(velocity_slide(metrics));
        slides.push(defect_slide(metrics));
        slides.push(takeaways_slide(metrics));

        let mut deck = String::from(FRONT_MATTER);
        deck.push('\n');
        deck.push_str(&slides.join(SLIDE_BREAK));
        deck
    }

    fn title_slide(&self, metrics: &ComprehensiveMetrics, generated_at: NaiveDateTime) -> String {
        let sprint_name = metrics
            .current_sprint
            .as_ref()
            .map(|c| c.sprint_name.as_str())
            .unwrap_or("Current Sprint");

        format!(
            "<!-- _class: lead -->\n\n# {} Sprint Velocity Report\n\nSprint: {} | Generated: {}\n",
            self.team_name,
            sprint_name,
            generated_at.format("%B %d, %Y")
        )
    }
}

fn table(rows: &[(&str, String)]) -> String {
    let mut out = String::from("| Metric | Value |\n|---|---|\n");
    for (label, value) in rows {
        out.push_str(&format!("| {} | {} |\n", label, value));
    }
    out
}

fn current_sprint_slide(current: Option<&CurrentSprintMetrics>) -> String {
    let Some(current) = current else {
        return "## Current Sprint Metrics\n\nNo current sprint data available.\n".to_string();
    };

    format!(
        "## Current Sprint Metrics\n\n{}",
        table(&[
            ("Story Points Committed", current.committed_story_points.to_string()),
            ("Story Points Completed", current.completed_story_points.to_string()),
            ("Completion Rate", format!("{}%", current.completion_rate)),
            ("Defects Found", current.defect_count.to_string()),
            ("Total Issues", current.total_issues.to_string()),
            ("Completed Issues", current.completed_issues.to_string()),
        ])
    )
}

fn ai_impact_slide(current: &CurrentSprintMetrics) -> String {
    let chart = bar_chart(
        &[
            ("Without AI", current.ai_story_points_committed),
            ("With AI", current.committed_story_points),
        ],
        "SP",
    );

    format!(
        "## AI Impact: Time Saved Analysis\n\n{}\n```text\n{}```\n",
        table(&[
            ("Story Points without AI", format!("{} SP", current.ai_story_points_committed)),
            ("Story Points with AI", format!("{} SP", current.committed_story_points)),
            (
                "Time Saved",
                format!("{} SP ({}%)", current.time_saved_total, current.time_saved_percent)
            ),
            ("Time Saved (Completed)", format!("{} SP", current.time_saved_completed)),
        ]),
        chart
    )
}

fn velocity_slide(metrics: &ComprehensiveMetrics) -> String {
    let improvement = &metrics.velocity_improvement;
    let chart = bar_chart(
        &[
            ("Before AI", improvement.baseline_velocity),
            ("After AI", improvement.post_ai_velocity),
        ],
        "SP",
    );

    format!(
        "## Velocity Improvement After AI Adoption\n\n{}\n```text\n{}```\n",
        table(&[
            (
                "Baseline Velocity (Before AI)",
                format!(
                    "{} SP ({} sprints)",
                    improvement.baseline_velocity, metrics.baseline_velocity.sprint_count
                )
            ),
            (
                "Post-AI Velocity",
                format!(
                    "{} SP ({} sprints)",
                    improvement.post_ai_velocity, metrics.post_ai_velocity.sprint_count
                )
            ),
            ("Improvement", format!("{}%", improvement.improvement_percent)),
        ]),
        chart
    )
}

fn defect_slide(metrics: &ComprehensiveMetrics) -> String {
    let defects = &metrics.defect_metrics;
    let chart = bar_chart(
        &[
            ("Before AI", defects.baseline_avg_defects),
            ("After AI", defects.post_ai_avg_defects),
        ],
        "",
    );

    format!(
        "## Defect Metrics\n\n{}\n```text\n{}```\n",
        table(&[
            ("Avg Defects (Before AI)", defects.baseline_avg_defects.to_string()),
            ("Avg Defects (After AI)", defects.post_ai_avg_defects.to_string()),
            ("Defect Reduction", format!("{}%", defects.defect_reduction_percent)),
        ]),
        chart
    )
}

fn takeaways_slide(metrics: &ComprehensiveMetrics) -> String {
    let committed = metrics
        .current_sprint
        .as_ref()
        .map(|c| c.committed_story_points)
        .unwrap_or_default();

    let mut points = vec![
        format!("Story Points Committed: {}", committed),
        format!(
            "Velocity Improvement: {}%",
            metrics.velocity_improvement.improvement_percent
        ),
        format!(
            "Defect Reduction: {}%",
            metrics.defect_metrics.defect_reduction_percent
        ),
    ];

    if let Some(current) = metrics.current_sprint.as_ref().filter(|c| c.has_ai_data) {
        points.push(format!(
            "Time Saved This Sprint: {} SP ({}%)",
            current.time_saved_total, current.time_saved_percent
        ));
    }
    points.push(format!("AI Adoption Date: {}", metrics.ai_adoption_date));

    let mut slide = String::from("## Key Takeaways\n\n");
    for point in points {
        slide.push_str(&format!("- {}\n", point));
    }
    slide
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DefectMetrics, VelocityImprovement, VelocityStat};
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn current(has_ai_data: bool) -> CurrentSprintMetrics {
        CurrentSprintMetrics {
            sprint_name: "ELECOM Sprint 14".to_string(),
            committed_story_points: 10.0,
            completed_story_points: 8.0,
            completion_rate: 80.0,
            defect_count: 2,
            total_issues: 6,
            completed_issues: 4,
            ai_story_points_committed: 12.0,
            ai_story_points_completed: 10.0,
            time_saved_total: 2.0,
            time_saved_completed: 2.0,
            time_saved_percent: 16.67,
            has_ai_data,
        }
    }

    fn metrics(current: Option<CurrentSprintMetrics>) -> ComprehensiveMetrics {
        ComprehensiveMetrics {
            current_sprint: current,
            baseline_velocity: VelocityStat {
                average_velocity: 20.0,
                sprint_count: 4,
                velocities: vec![20.0; 4],
            },
            post_ai_velocity: VelocityStat {
                average_velocity: 25.0,
                sprint_count: 2,
                velocities: vec![25.0; 2],
            },
            velocity_improvement: VelocityImprovement {
                baseline_velocity: 20.0,
                post_ai_velocity: 25.0,
                improvement_percent: 25.0,
                improvement_points: 5.0,
            },
            defect_metrics: DefectMetrics {
                baseline_avg_defects: 4.0,
                post_ai_avg_defects: 2.0,
                defect_reduction: 2.0,
                defect_reduction_percent: 50.0,
            },
            ai_adoption_date: "2024-01-01".to_string(),
        }
    }

    fn slide_titles(deck: &str) -> Vec<String> {
        deck.lines()
            .filter(|line| line.starts_with("# ") || line.starts_with("## "))
            .map(|line| line.trim_start_matches('#').trim().to_string())
            .collect()
    }

    #[test]
    fn test_slide_order_with_ai_data() {
        let deck = DeckRenderer::new("ELECOM").render(&metrics(Some(current(true))), generated_at());

        assert!(deck.starts_with("---\nmarp: true"));
        assert_eq!(
            slide_titles(&deck),
            vec![
                "ELECOM Sprint Velocity Report",
                "Current Sprint Metrics",
                "AI Impact: Time Saved Analysis",
                "Velocity Improvement After AI Adoption",
                "Defect Metrics",
                "Key Takeaways",
            ]
        );
        assert!(deck.contains("Sprint: ELECOM Sprint 14 | Generated: March 05, 2024"));
        assert!(deck.contains("| Time Saved | 2 SP (16.67%) |"));
        assert!(deck.contains("- Time Saved This Sprint: 2 SP (16.67%)"));
    }

    #[test]
    fn test_ai_slide_skipped_without_data() {
        let deck = DeckRenderer::new("ELECOM").render(&metrics(Some(current(false))), generated_at());

        let titles = slide_titles(&deck);
        assert_eq!(titles.len(), 5);
        assert!(!titles.iter().any(|t| t.starts_with("AI Impact")));
        assert!(!deck.contains("Time Saved This Sprint"));
    }

    #[test]
    fn test_missing_current_sprint() {
        let deck = DeckRenderer::new("Web").render(&metrics(None), generated_at());

        assert!(deck.contains("Sprint: Current Sprint |"));
        assert!(deck.contains("No current sprint data available."));
        assert!(deck.contains("- Story Points Committed: 0"));
    }

    #[test]
    fn test_metric_values_rendered() {
        let deck = DeckRenderer::new("ELECOM").render(&metrics(Some(current(true))), generated_at());

        assert!(deck.contains("| Completion Rate | 80% |"));
        assert!(deck.contains("| Baseline Velocity (Before AI) | 20 SP (4 sprints) |"));
        assert!(deck.contains("| Defect Reduction | 50% |"));
        assert!(deck.contains("- AI Adoption Date: 2024-01-01"));
        // closing front matter plus one break between each of the 6 slides
        assert_eq!(deck.matches(SLIDE_BREAK).count(), 6);
    }
}
