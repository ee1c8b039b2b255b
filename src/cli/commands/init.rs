use super::Command;
use crate::config::{ReportConfig, CONFIG_FILE};
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub struct InitCommand {
    pub force: bool,
    path: PathBuf,
}

impl InitCommand {
    pub fn new(force: bool) -> Self {
        Self::with_path(force, PathBuf::from(CONFIG_FILE))
    }

    pub fn with_path(force: bool, path: PathBuf) -> Self {
        Self { force, path }
    }
}

impl Command for InitCommand {
    async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            return Err(anyhow!(
                "{} already exists. Use --force to overwrite",
                self.path.display()
            ));
        }

        ReportConfig::sample().save_to_file(&self.path)?;

        println!("✅ Wrote {}", self.path.display());
        println!();
        println!("Next steps:");
        println!("  1. Set jira.server and add a [[teams]] entry per board");
        println!("  2. Put JIRA_EMAIL and JIRA_API_TOKEN in .env (never commit them)");
        println!("  3. Run 'sprint-velocity check'");
        Ok(())
    }
}
