use super::Command;
use crate::config::ReportConfig;
use crate::confluence::{latest_reports, ConfluencePublisher, LinkOutcome, PublishError};
use anyhow::{bail, Result};
use std::path::PathBuf;

pub struct PublishCommand {
    pub page_id: Option<String>,
    pub dir: Option<PathBuf>,
    pub link: bool,
    config: ReportConfig,
}

impl PublishCommand {
    pub fn new(page_id: Option<String>, dir: Option<PathBuf>, link: bool, config: ReportConfig) -> Self {
        Self {
            page_id,
            dir,
            link,
            config,
        }
    }

    fn reports_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| self.config.output.reports_dir.clone())
    }
}

impl Command for PublishCommand {
    async fn execute(&self) -> Result<()> {
        println!("📤 Uploading Reports to Confluence");
        println!("===================================");
        println!();

        let (server, credentials) = self.config.confluence_connection()?;
        let publisher = ConfluencePublisher::new(
            &server,
            credentials,
            &self.config.jira.rate_limit,
            self.config.confluence.page_id.clone(),
        )?;
        let page_id = self.page_id.as_deref();

        let reports = latest_reports(&self.reports_dir())?;
        if reports.is_empty() {
            println!("ℹ️  No reports found to upload in {}", self.reports_dir().display());
            return Ok(());
        }

        let mut uploaded = 0;
        for path in &reports {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let comment = format!("Velocity metrics report - {}", name);

            match publisher.upload_attachment(path, page_id, &comment).await {
                Ok(outcome) => {
                    uploaded += 1;
                    println!("✅ Uploaded: {} ({:?})", name, outcome);
                }
                Err(e @ (PublishError::MissingPageId | PublishError::PageNotFound(_))) => {
                    println!("❌ {}", e);
                    return Err(e.into());
                }
                Err(e) => println!("❌ Failed to upload {}: {}", name, e),
            }
        }

        println!();
        println!("📤 Uploaded: {}/{} reports", uploaded, reports.len());

        if self.link {
            match publisher.link_reports(page_id).await? {
                LinkOutcome::Linked(count) => {
                    println!("🔗 Added links to {} reports on the page", count);
                }
                LinkOutcome::AlreadyLinked => {
                    println!("🔗 Reports section already exists in page content");
                }
                LinkOutcome::NoReports => println!("ℹ️  No report attachments found to link"),
            }
        }

        if uploaded == 0 {
            bail!("No reports were uploaded");
        }
        Ok(())
    }
}
