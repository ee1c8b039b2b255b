// Issue tracker access
// Sprints and their issues come from Jira; everything above this module only
// sees SprintRecord and WorkItem

pub mod client;
pub mod errors;
pub mod fields;
pub mod types;

pub use client::JiraClient;
pub use errors::TrackerError;
pub use fields::FieldMapping;

use crate::metrics::{SprintRecord, WorkItem};
use async_trait::async_trait;

/// Read-only sprint operations needed to build a velocity report
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TrackerOps: Send + Sync {
    /// Display name of a board, also used as a connectivity check
    async fn board_name(&self, board_id: &str) -> Result<String, TrackerError>;

    async fn active_sprint(&self, board_id: &str) -> Result<Option<SprintRecord>, TrackerError>;

    /// First sprint whose name contains `name`, ignoring case
    async fn sprint_by_name(&self, board_id: &str, name: &str) -> Result<Option<SprintRecord>, TrackerError>;

    /// The most recent `limit` closed sprints, oldest first
    async fn closed_sprints(&self, board_id: &str, limit: usize) -> Result<Vec<SprintRecord>, TrackerError>;

    async fn sprint_issues(&self, board_id: &str, sprint_id: u64) -> Result<Vec<WorkItem>, TrackerError>;
}
