use super::{jira_client, print_config_help, Command};
use crate::config::ReportConfig;
use crate::tracker::TrackerOps;
use anyhow::{bail, Result};

pub struct CheckCommand {
    config: ReportConfig,
}

impl CheckCommand {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Describe a board's sprint situation; `Err` when the board is unreachable
    pub async fn check_board(tracker: &dyn TrackerOps, board_id: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        let name = tracker.board_name(board_id).await?;
        lines.push(format!("✅ Board accessible: {}", name));

        match tracker.active_sprint(board_id).await? {
            Some(sprint) => lines.push(format!("✅ Active sprint found: {}", sprint.name)),
            None => {
                let closed = tracker.closed_sprints(board_id, usize::MAX).await?;
                if closed.is_empty() {
                    lines.push("⚠️  No sprints found for this board".to_string());
                } else {
                    lines.push(format!(
                        "⚠️  No active sprint, but {} closed sprint(s) found",
                        closed.len()
                    ));
                }
            }
        }
        Ok(lines)
    }
}

impl Command for CheckCommand {
    async fn execute(&self) -> Result<()> {
        println!("🔌 Testing Jira Connection");
        println!("==========================");

        if let Err(e) = self.config.validate() {
            println!("❌ Configuration invalid: {}", e);
            print_config_help();
            return Err(e);
        }

        let settings = self.config.metrics_settings();
        println!();
        println!("✅ Configuration loaded");
        println!("   Server: {}", self.config.jira.server);
        println!("   Email: {}", self.config.jira.email.as_deref().unwrap_or_default());
        println!("   AI Adoption Date: {}", settings.ai_adoption_date);

        let tracker = jira_client(&self.config)?;
        println!();
        println!("Found {} team(s):", self.config.teams.len());

        let mut failures = 0;
        for team in &self.config.teams {
            println!();
            println!("  Team: {}", team.name);
            println!("    Board ID: {}", team.board_id);
            println!("    Project: {}", team.project_key);

            match Self::check_board(&tracker, &team.board_id).await {
                Ok(lines) => {
                    for line in lines {
                        println!("    {}", line);
                    }
                }
                Err(e) => {
                    failures += 1;
                    println!("    ❌ Error accessing board: {:#}", e);
                }
            }
        }

        println!();
        if failures > 0 {
            println!("Troubleshooting:");
            println!("1. Verify your JIRA_API_TOKEN is correct");
            println!("2. Check that your email matches your Jira account");
            println!("3. Ensure you have access to the specified boards");
            bail!("{} board(s) could not be checked", failures);
        }

        println!("✅ Connection test completed successfully!");
        Ok(())
    }
}
