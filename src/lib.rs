// sprint-velocity library - sprint velocity and AI impact reporting for Jira teams
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod confluence;
pub mod http;
pub mod metrics;
pub mod report;
pub mod slides;
pub mod telemetry;
pub mod tracker;

// Re-export key types for easy access
pub use config::{ReportConfig, TeamConfig};
pub use confluence::{ConfluencePublisher, PublishError};
pub use http::RateLimitedHttpClient;
pub use metrics::{ComprehensiveMetrics, MetricsCalculator, MetricsSettings, Sprint, SprintRecord, WorkItem};
pub use report::{collect_team_metrics, ReportError, ReportOptions, TeamReport};
pub use slides::DeckRenderer;
pub use telemetry::{create_team_span, generate_correlation_id, init_telemetry};
pub use tracker::{FieldMapping, JiraClient, TrackerError, TrackerOps};
