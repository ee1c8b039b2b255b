use super::{jira_client, print_config_help, Command};
use crate::config::{ReportConfig, TeamConfig};
use crate::confluence::ConfluencePublisher;
use crate::metrics::{MetricsCalculator, MetricsReporter};
use crate::report::{collect_team_metrics, ReportOptions};
use crate::slides::{write_report, DeckRenderer, ReportFiles};
use crate::telemetry::{create_team_span, generate_correlation_id};
use crate::tracker::TrackerOps;
use anyhow::{bail, Result};
use chrono::Local;
use std::path::PathBuf;
use tracing::{error, Instrument};

pub struct ReportCommand {
    pub team: Option<String>,
    pub sprint: Option<String>,
    pub history: Option<usize>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub publish: bool,
    config: ReportConfig,
}

impl ReportCommand {
    pub fn new(
        team: Option<String>,
        sprint: Option<String>,
        history: Option<usize>,
        output: Option<PathBuf>,
        json: bool,
        publish: bool,
        config: ReportConfig,
    ) -> Self {
        Self {
            team,
            sprint,
            history,
            output,
            json,
            publish,
            config,
        }
    }

    fn options(&self) -> ReportOptions {
        ReportOptions {
            sprint_name: self.sprint.clone(),
            history_limit: self.history.unwrap_or(self.config.metrics.history_limit),
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.config.output.reports_dir.clone())
    }

    /// Configured teams, narrowed to `--team` when given
    pub fn selected_teams(&self) -> Vec<TeamConfig> {
        match &self.team {
            Some(name) => self
                .config
                .teams
                .iter()
                .filter(|team| team.name.eq_ignore_ascii_case(name))
                .cloned()
                .collect(),
            None => self.config.teams.clone(),
        }
    }

    async fn generate_for_team(
        &self,
        tracker: &dyn TrackerOps,
        calculator: &MetricsCalculator,
        team: &TeamConfig,
    ) -> Result<ReportFiles> {
        println!();
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("📋 Generating report for team: {}", team.name);
        println!("   Board ID: {} | Project: {}", team.board_id, team.project_key);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let report = collect_team_metrics(tracker, calculator, team, &self.options()).await?;
        println!("🏃 Current Sprint: {}", report.current_sprint.name);
        println!("📚 Found {} historical sprints", report.historical_sprints.len());
        println!();
        print!("{}", MetricsReporter::format_metrics_summary(&report.metrics));
        println!();

        let files = write_report(
            &self.output_dir(),
            &DeckRenderer::new(&team.name),
            &report.metrics,
            Local::now().naive_local(),
            self.json || self.config.output.json_export,
        )?;
        println!("✅ Successfully generated report: {}", files.deck.display());
        if let Some(json) = &files.json {
            println!("   Metrics exported to: {}", json.display());
        }
        Ok(files)
    }

    async fn publish_reports(&self, generated: &[ReportFiles]) -> Result<()> {
        let (server, credentials) = self.config.confluence_connection()?;
        let publisher = ConfluencePublisher::new(
            &server,
            credentials,
            &self.config.jira.rate_limit,
            self.config.confluence.page_id.clone(),
        )?;

        println!();
        println!("📤 Uploading reports to Confluence");
        let mut uploaded = 0;
        for files in generated {
            let name = files
                .deck
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let comment = format!("Velocity metrics report - {}", name);
            match publisher.upload_attachment(&files.deck, None, &comment).await {
                Ok(_) => {
                    uploaded += 1;
                    println!("   ✅ Uploaded: {}", name);
                }
                Err(e) => println!("   ❌ Failed to upload {}: {}", name, e),
            }
        }
        println!("📤 Uploaded: {}/{} reports", uploaded, generated.len());
        Ok(())
    }
}

impl Command for ReportCommand {
    async fn execute(&self) -> Result<()> {
        println!("📊 SPRINT VELOCITY REPORT");
        println!("==========================");

        if let Err(e) = self.config.validate() {
            println!("❌ {}", e);
            print_config_help();
            return Err(e);
        }

        let teams = self.selected_teams();
        if teams.is_empty() {
            match &self.team {
                Some(name) => println!("❌ Team '{}' is not configured", name),
                None => println!("❌ No teams configured. Set TEAMS=TeamName:BoardID:ProjectKey"),
            }
            bail!("No teams to report on");
        }
        println!("Found {} team(s) to process", teams.len());

        let tracker = jira_client(&self.config)?;
        let calculator = MetricsCalculator::new(self.config.metrics_settings());

        let mut generated = Vec::new();
        for team in &teams {
            let correlation_id = generate_correlation_id();
            let span = create_team_span(&team.name, &team.board_id, &correlation_id);
            match self
                .generate_for_team(&tracker, &calculator, team)
                .instrument(span)
                .await
            {
                Ok(files) => generated.push(files),
                Err(e) => {
                    error!(team = %team.name, "Report generation failed: {:#}", e);
                    println!("❌ Error generating report for {}: {:#}", team.name, e);
                }
            }
        }

        println!();
        println!(
            "🏁 Completed: {}/{} reports generated successfully",
            generated.len(),
            teams.len()
        );

        if self.publish && !generated.is_empty() {
            if let Err(e) = self.publish_reports(&generated).await {
                println!("❌ Publishing failed: {:#}", e);
                return Err(e);
            }
        }

        if generated.is_empty() {
            bail!("No reports were generated");
        }
        Ok(())
    }
}
