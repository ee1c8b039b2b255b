use serde::{Deserialize, Serialize};
use std::fmt;

/// A single tracker issue, normalized from whichever API shape it arrived in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub issue_type: String,
    /// `None` means "not estimated", which is not the same as zero
    pub story_points: Option<f64>,
    pub labels: Vec<String>,
    /// Effort saved, derived once when the item is normalized
    pub ai_points_saved: Option<f64>,
    pub created: Option<String>,
    pub resolved: Option<String>,
}

impl WorkItem {
    pub fn new(key: impl ToString, status: impl ToString, issue_type: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            summary: String::new(),
            status: status.to_string(),
            issue_type: issue_type.to_string(),
            story_points: None,
            labels: Vec::new(),
            ai_points_saved: None,
            created: None,
            resolved: None,
        }
    }

    pub fn with_story_points(mut self, points: f64) -> Self {
        self.story_points = Some(points);
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_ai_points_saved(mut self, points: f64) -> Self {
        self.ai_points_saved = Some(points);
        self
    }
}

/// Status and type vocabulary used to classify work items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRules {
    pub completion_statuses: Vec<String>,
    pub defect_types: Vec<String>,
}

impl Default for IssueRules {
    fn default() -> Self {
        Self {
            completion_statuses: vec!["Done".into(), "Closed".into(), "Resolved".into()],
            defect_types: vec!["bug".into(), "defect".into(), "error".into()],
        }
    }
}

impl IssueRules {
    /// Exact, case-sensitive status match
    pub fn is_completed(&self, status: &str) -> bool {
        self.completion_statuses.iter().any(|s| s == status)
    }

    /// Case-insensitive status match, used when attributing saved effort
    pub fn is_completed_ignore_case(&self, status: &str) -> bool {
        let status = status.to_lowercase();
        self.completion_statuses
            .iter()
            .any(|s| s.to_lowercase() == status)
    }

    pub fn is_defect(&self, issue_type: &str) -> bool {
        let issue_type = issue_type.to_lowercase();
        self.defect_types
            .iter()
            .any(|t| t.to_lowercase() == issue_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Active,
    Closed,
    Future,
    #[serde(untagged)]
    Other(String),
}

impl SprintState {
    pub fn parse(state: &str) -> Self {
        match state.to_lowercase().as_str() {
            "active" => SprintState::Active,
            "closed" => SprintState::Closed,
            "future" => SprintState::Future,
            _ => SprintState::Other(state.to_string()),
        }
    }
}

impl fmt::Display for SprintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SprintState::Active => write!(f, "active"),
            SprintState::Closed => write!(f, "closed"),
            SprintState::Future => write!(f, "future"),
            SprintState::Other(state) => write!(f, "{}", state),
        }
    }
}

/// Sprint metadata as reported by the tracker, before any issues are attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintRecord {
    pub id: u64,
    pub name: String,
    pub state: SprintState,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: u64,
    pub name: String,
    pub state: SprintState,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub metrics: SprintMetricsSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SprintMetricsSummary {
    pub total_issues: usize,
    pub completed_issues: usize,
    pub total_story_points: f64,
    pub completed_story_points: f64,
    pub defect_count: usize,
    pub issues: Vec<WorkItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityStat {
    pub average_velocity: f64,
    pub sprint_count: usize,
    pub velocities: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityImprovement {
    pub baseline_velocity: f64,
    pub post_ai_velocity: f64,
    pub improvement_percent: f64,
    pub improvement_points: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefectMetrics {
    pub baseline_avg_defects: f64,
    pub post_ai_avg_defects: f64,
    pub defect_reduction: f64,
    pub defect_reduction_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSprintMetrics {
    pub sprint_name: String,
    pub committed_story_points: f64,
    pub completed_story_points: f64,
    pub completion_rate: f64,
    pub defect_count: usize,
    pub total_issues: usize,
    pub completed_issues: usize,
    /// Committed points plus the effort saved, i.e. the estimate without AI help
    pub ai_story_points_committed: f64,
    pub ai_story_points_completed: f64,
    pub time_saved_total: f64,
    pub time_saved_completed: f64,
    pub time_saved_percent: f64,
    pub has_ai_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveMetrics {
    pub current_sprint: Option<CurrentSprintMetrics>,
    pub baseline_velocity: VelocityStat,
    pub post_ai_velocity: VelocityStat,
    pub velocity_improvement: VelocityImprovement,
    pub defect_metrics: DefectMetrics,
    pub ai_adoption_date: String,
}

/// Round to two decimal places for presentation; exact halves go to the even digit
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
