use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "sprint-velocity")]
#[command(version)]
#[command(about = "Sprint velocity and AI impact reports from Jira")]
#[command(long_about = "sprint-velocity compares team velocity and defect rates before and after AI adoption, \
                       using sprint data from Jira boards. Reports are written as slide decks and can be \
                       published to Confluence. Get started with 'sprint-velocity init'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate velocity reports for the configured teams
    Report {
        /// Only report on this team
        #[arg(long, help = "Team name from the configuration (default: all teams)")]
        team: Option<String>,
        /// Sprint to use when the board has no active sprint
        #[arg(long, help = "Sprint name (case-insensitive substring) used when no sprint is active")]
        sprint: Option<String>,
        /// Number of closed sprints to compare
        #[arg(long, help = "Closed sprints fetched for the before/after comparison")]
        history: Option<usize>,
        /// Directory for generated reports
        #[arg(long, short = 'o', help = "Directory for generated reports (default: reports)")]
        output: Option<PathBuf>,
        /// Also export the metrics as JSON
        #[arg(long, help = "Write the computed metrics as JSON next to each deck")]
        json: bool,
        /// Upload generated reports to Confluence
        #[arg(long, help = "Upload each generated report to the configured Confluence page")]
        publish: bool,
    },
    /// Upload the latest reports to a Confluence page
    Publish {
        /// Confluence page receiving the attachments
        #[arg(long, help = "Confluence page id (default: CONFLUENCE_PAGE_ID)")]
        page_id: Option<String>,
        /// Directory containing reports
        #[arg(long, help = "Directory to upload reports from (default: reports)")]
        dir: Option<PathBuf>,
        /// Add a section linking the reports to the page body
        #[arg(long, help = "Add a 'Sprint Velocity Reports' section listing the newest reports")]
        link: bool,
    },
    /// Check configuration and Jira board access
    Check,
    /// Write a starter sprint-velocity.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, help = "Overwrite an existing sprint-velocity.toml")]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_flags() {
        let cli = Cli::try_parse_from([
            "sprint-velocity",
            "report",
            "--team",
            "ELECOM",
            "--history",
            "5",
            "-o",
            "out",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Report {
                team,
                history,
                output,
                json,
                publish,
                sprint,
            }) => {
                assert_eq!(team.as_deref(), Some("ELECOM"));
                assert_eq!(history, Some(5));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(json);
                assert!(!publish);
                assert!(sprint.is_none());
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["sprint-velocity"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_history_must_be_numeric() {
        assert!(Cli::try_parse_from(["sprint-velocity", "report", "--history", "many"]).is_err());
    }
}
