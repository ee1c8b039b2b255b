// Sprint velocity and AI impact metrics
// Turns tracker sprints into the comparison report consumed by the slide deck

pub mod aggregate;
pub mod classifier;
pub mod compare;
pub mod labels;
pub mod reports;
pub mod types;
pub mod velocity;

pub use aggregate::{current_sprint_metrics, effort_saved, summarize};
pub use classifier::{is_baseline, EndDate};
pub use labels::ai_points_from_labels;
pub use reports::MetricsReporter;
pub use types::*;
pub use velocity::calculate_velocity;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything the calculator needs to know about the team's conventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// First day of the post-adoption period
    pub ai_adoption_date: NaiveDate,
    #[serde(default)]
    pub rules: IssueRules,
}

impl MetricsSettings {
    pub fn new(ai_adoption_date: NaiveDate) -> Self {
        Self {
            ai_adoption_date,
            rules: IssueRules::default(),
        }
    }
}

/// Calculates velocity metrics and AI impact for one team
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    settings: MetricsSettings,
}

impl MetricsCalculator {
    pub fn new(settings: MetricsSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MetricsSettings {
        &self.settings
    }

    pub fn ai_adoption_date(&self) -> NaiveDate {
        self.settings.ai_adoption_date
    }

    /// Build a sprint from tracker data using this team's status rules
    pub fn sprint(&self, record: SprintRecord, issues: Vec<WorkItem>) -> Sprint {
        Sprint::from_record(record, issues, &self.settings.rules)
    }

    pub fn is_before_ai_adoption<'a>(&self, end_date: impl Into<EndDate<'a>>) -> bool {
        is_baseline(end_date, self.settings.ai_adoption_date)
    }

    pub fn calculate_baseline_velocity(&self, sprints: &[Sprint]) -> VelocityStat {
        let (baseline, _) = compare::split_by_adoption(sprints, self.settings.ai_adoption_date);
        calculate_velocity(baseline)
    }

    pub fn calculate_post_ai_velocity(&self, sprints: &[Sprint]) -> VelocityStat {
        let (_, post_ai) = compare::split_by_adoption(sprints, self.settings.ai_adoption_date);
        calculate_velocity(post_ai)
    }

    pub fn calculate_velocity_improvement(
        &self,
        baseline: &VelocityStat,
        post_ai: &VelocityStat,
    ) -> VelocityImprovement {
        compare::velocity_improvement(baseline, post_ai)
    }

    pub fn calculate_defect_metrics(&self, sprints: &[Sprint]) -> DefectMetrics {
        compare::defect_metrics(sprints, self.settings.ai_adoption_date)
    }

    pub fn calculate_current_sprint_metrics(&self, sprint: &Sprint) -> CurrentSprintMetrics {
        current_sprint_metrics(sprint, &self.settings.rules)
    }

    /// Assemble the full report for a current sprint and its comparison history
    pub fn generate_comprehensive_metrics(
        &self,
        current_sprint: Option<&Sprint>,
        historical_sprints: &[Sprint],
    ) -> ComprehensiveMetrics {
        let baseline_velocity = self.calculate_baseline_velocity(historical_sprints);
        let post_ai_velocity = self.calculate_post_ai_velocity(historical_sprints);
        let velocity_improvement =
            self.calculate_velocity_improvement(&baseline_velocity, &post_ai_velocity);
        let defect_metrics = self.calculate_defect_metrics(historical_sprints);
        let current_sprint = current_sprint.map(|sprint| self.calculate_current_sprint_metrics(sprint));

        ComprehensiveMetrics {
            current_sprint,
            baseline_velocity,
            post_ai_velocity,
            velocity_improvement,
            defect_metrics,
            ai_adoption_date: self.settings.ai_adoption_date.format("%Y-%m-%d").to_string(),
        }
    }
}
