// Gathers tracker data for one team and turns it into comprehensive metrics

use crate::config::TeamConfig;
use crate::metrics::{ComprehensiveMetrics, MetricsCalculator, Sprint, SprintRecord, WorkItem};
use crate::tracker::{TrackerError, TrackerOps};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("No sprints found for board {0}")]
    NoSprints(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Sprint to report on when the board has no active sprint
    pub sprint_name: Option<String>,
    /// Closed sprints used for the before/after comparison
    pub history_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sprint_name: None,
            history_limit: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TeamReport {
    pub team: TeamConfig,
    pub current_sprint: Sprint,
    pub historical_sprints: Vec<Sprint>,
    pub metrics: ComprehensiveMetrics,
}

/// Active sprint, else the named sprint, else the most recent closed one
pub async fn resolve_current_sprint(
    tracker: &dyn TrackerOps,
    board_id: &str,
    sprint_name: Option<&str>,
) -> Result<Option<SprintRecord>, TrackerError> {
    if let Some(active) = tracker.active_sprint(board_id).await? {
        return Ok(Some(active));
    }

    if let Some(name) = sprint_name {
        if let Some(named) = tracker.sprint_by_name(board_id, name).await? {
            return Ok(Some(named));
        }
        warn!("No sprint matching '{}' on board {}", name, board_id);
    }

    warn!("No active sprint found for board {}, using most recent closed sprint", board_id);
    Ok(tracker.closed_sprints(board_id, 1).await?.pop())
}

/// Issues for a comparison sprint; a failed fetch counts as an empty sprint
async fn historical_issues(
    tracker: &dyn TrackerOps,
    board_id: &str,
    record: &SprintRecord,
) -> Result<Vec<WorkItem>, TrackerError> {
    match tracker.sprint_issues(board_id, record.id).await {
        Ok(issues) => Ok(issues),
        Err(e) if e.is_auth_failure() => Err(e),
        Err(e) => {
            warn!("Could not fetch issues for sprint '{}': {}", record.name, e);
            Ok(Vec::new())
        }
    }
}

pub async fn collect_team_metrics(
    tracker: &dyn TrackerOps,
    calculator: &MetricsCalculator,
    team: &TeamConfig,
    options: &ReportOptions,
) -> Result<TeamReport, ReportError> {
    let board_id = team.board_id.as_str();

    info!("Fetching current sprint for board {}", board_id);
    let record = resolve_current_sprint(tracker, board_id, options.sprint_name.as_deref())
        .await?
        .ok_or_else(|| ReportError::NoSprints(board_id.to_string()))?;
    info!("Current sprint: {}", record.name);

    let issues = tracker.sprint_issues(board_id, record.id).await?;
    let current_sprint = calculator.sprint(record, issues);

    info!("Fetching historical sprints");
    let records = tracker.closed_sprints(board_id, options.history_limit).await?;
    let mut historical_sprints = Vec::with_capacity(records.len());
    for record in records {
        let issues = historical_issues(tracker, board_id, &record).await?;
        historical_sprints.push(calculator.sprint(record, issues));
    }
    info!("Found {} historical sprints", historical_sprints.len());

    let metrics = calculator.generate_comprehensive_metrics(Some(&current_sprint), &historical_sprints);

    Ok(TeamReport {
        team: team.clone(),
        current_sprint,
        historical_sprints,
        metrics,
    })
}
