use crate::http::{Credentials, RateLimitConfig};
use crate::metrics::{IssueRules, MetricsSettings};
use crate::tracker::FieldMapping;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "sprint-velocity.toml";
pub const ENV_PREFIX: &str = "SPRINT_VELOCITY";

/// Adoption date used when none is configured anywhere
pub fn default_ai_adoption_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Main configuration structure for sprint-velocity
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Jira connection and field layout
    pub jira: JiraConfig,
    /// Metric calculation settings
    pub metrics: MetricsConfig,
    /// Teams to report on
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
    /// Confluence publishing (credentials default to the Jira ones)
    pub confluence: ConfluenceConfig,
    /// Where reports are written
    pub output: OutputConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JiraConfig {
    /// Base URL, e.g. https://acme.atlassian.net
    pub server: String,
    /// Account email (can be set via JIRA_EMAIL)
    pub email: Option<String>,
    /// API token (can be set via JIRA_API_TOKEN)
    pub api_token: Option<String>,
    /// Story point custom fields, checked in order
    #[serde(default = "default_story_point_fields")]
    pub story_point_fields: Vec<String>,
    /// Custom field holding the estimate without AI assistance
    pub ai_points_field: Option<String>,
    /// Rate limiting settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_story_point_fields() -> Vec<String> {
    FieldMapping::default().story_point_fields
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// First day of the post-adoption period (YYYY-MM-DD)
    pub ai_adoption_date: Option<NaiveDate>,
    /// Completion statuses and defect issue types
    #[serde(default)]
    pub rules: IssueRules,
    /// Closed sprints fetched for the comparison
    pub history_limit: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            ai_adoption_date: None,
            rules: IssueRules::default(),
            history_limit: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamConfig {
    pub name: String,
    pub board_id: String,
    pub project_key: String,
}

impl TeamConfig {
    /// Parse `name:board_id:project_key[,...]`; malformed entries are skipped
    pub fn parse_list(value: &str) -> Vec<TeamConfig> {
        value
            .split(',')
            .filter_map(|entry| {
                let parts: Vec<&str> = entry.trim().split(':').collect();
                match parts.as_slice() {
                    [name, board_id, project_key] => Some(TeamConfig {
                        name: name.to_string(),
                        board_id: board_id.to_string(),
                        project_key: project_key.to_string(),
                    }),
                    _ => None,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfluenceConfig {
    /// Defaults to the Jira server
    pub server: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    /// Page that receives report attachments
    pub page_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory for generated decks
    pub reports_dir: PathBuf,
    /// Also write the metrics as JSON next to each deck
    pub json_export: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            json_export: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ReportConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (sprint-velocity.toml)
    /// 3. Environment variables (prefixed with SPRINT_VELOCITY__)
    /// 4. Plain variables (JIRA_EMAIL, TEAMS, ...) for anything still unset
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder().add_source(Config::try_from(&ReportConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut report_config: ReportConfig = config.try_deserialize()?;
        report_config.apply_plain_env(lookup)?;
        Ok(report_config)
    }

    /// Fill unset values from the un-prefixed variables
    fn apply_plain_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.jira.server.trim().is_empty() {
            if let Some(server) = get("JIRA_SERVER") {
                self.jira.server = server;
            }
        }
        if self.jira.email.is_none() {
            self.jira.email = get("JIRA_EMAIL");
        }
        if self.jira.api_token.is_none() {
            self.jira.api_token = get("JIRA_API_TOKEN");
        }
        if self.jira.ai_points_field.is_none() {
            self.jira.ai_points_field = get("AI_STORY_POINTS_FIELD_ID");
        }

        if self.metrics.ai_adoption_date.is_none() {
            if let Some(date) = get("AI_ADOPTION_DATE") {
                let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                    .with_context(|| format!("AI_ADOPTION_DATE '{}' is not YYYY-MM-DD", date))?;
                self.metrics.ai_adoption_date = Some(parsed);
            }
        }

        if self.teams.is_empty() {
            if let Some(teams) = get("TEAMS") {
                self.teams = TeamConfig::parse_list(&teams);
            }
        }

        let confluence = &mut self.confluence;
        if confluence.server.is_none() {
            confluence.server = get("CONFLUENCE_SERVER");
        }
        if confluence.email.is_none() {
            confluence.email = get("CONFLUENCE_EMAIL");
        }
        if confluence.api_token.is_none() {
            confluence.api_token = get("CONFLUENCE_API_TOKEN");
        }
        if confluence.page_id.is_none() {
            confluence.page_id = get("CONFLUENCE_PAGE_ID");
        }

        Ok(())
    }

    /// Check that Jira can be reached with these settings
    pub fn validate(&self) -> Result<()> {
        let missing_email = self.jira.email.as_deref().map_or(true, str::is_empty);
        let missing_token = self.jira.api_token.as_deref().map_or(true, str::is_empty);
        if missing_email || missing_token {
            bail!("JIRA_EMAIL and JIRA_API_TOKEN must be set (or jira.email / jira.api_token in {})", CONFIG_FILE);
        }
        if self.jira.server.trim().is_empty() {
            bail!("JIRA_SERVER must be set (or jira.server in {})", CONFIG_FILE);
        }
        Ok(())
    }

    pub fn jira_credentials(&self) -> Result<Credentials> {
        self.validate()?;
        Ok(Credentials {
            email: self.jira.email.clone().unwrap_or_default(),
            api_token: self.jira.api_token.clone().unwrap_or_default(),
        })
    }

    /// Confluence server and credentials, falling back to the Jira ones
    pub fn confluence_connection(&self) -> Result<(String, Credentials)> {
        let server = self
            .confluence
            .server
            .clone()
            .unwrap_or_else(|| self.jira.server.clone());
        let email = self.confluence.email.clone().or_else(|| self.jira.email.clone());
        let api_token = self
            .confluence
            .api_token
            .clone()
            .or_else(|| self.jira.api_token.clone());

        match (email, api_token) {
            (Some(email), Some(api_token)) if !email.is_empty() && !api_token.is_empty() => {
                if server.trim().is_empty() {
                    return Err(anyhow!("CONFLUENCE_SERVER or JIRA_SERVER must be set"));
                }
                Ok((server, Credentials { email, api_token }))
            }
            _ => Err(anyhow!("CONFLUENCE_EMAIL and CONFLUENCE_API_TOKEN must be set")),
        }
    }

    pub fn field_mapping(&self) -> FieldMapping {
        FieldMapping {
            story_point_fields: self.jira.story_point_fields.clone(),
            ai_points_field: self.jira.ai_points_field.clone(),
        }
    }

    pub fn metrics_settings(&self) -> MetricsSettings {
        MetricsSettings {
            ai_adoption_date: self
                .metrics
                .ai_adoption_date
                .unwrap_or_else(default_ai_adoption_date),
            rules: self.metrics.rules.clone(),
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Starter configuration written by `init`
    pub fn sample() -> Self {
        let mut sample = ReportConfig::default();
        sample.jira.server = "https://your-domain.atlassian.net".to_string();
        sample.jira.story_point_fields = default_story_point_fields();
        sample.metrics.ai_adoption_date = Some(default_ai_adoption_date());
        sample.teams = vec![TeamConfig {
            name: "TEAM".to_string(),
            board_id: "1".to_string(),
            project_key: "TEAM".to_string(),
        }];
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_team_list() {
        let teams = TeamConfig::parse_list("ELECOM:58:ELECOM, Web:12:WEB,broken,too:many:parts:here");
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].name, "ELECOM");
        assert_eq!(teams[0].board_id, "58");
        assert_eq!(teams[1].project_key, "WEB");
        assert!(TeamConfig::parse_list("").is_empty());
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = ReportConfig::load_from(&dir.path().join("missing.toml"), env(&[])).unwrap();

        assert_eq!(config.metrics.history_limit, 20);
        assert_eq!(config.output.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.jira.story_point_fields, default_story_point_fields());
        assert_eq!(
            config.metrics_settings().ai_adoption_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_plain_env_fills_unset_values() {
        let dir = TempDir::new().unwrap();
        let config = ReportConfig::load_from(
            &dir.path().join("missing.toml"),
            env(&[
                ("JIRA_SERVER", "https://acme.atlassian.net"),
                ("JIRA_EMAIL", "dev@acme.com"),
                ("JIRA_API_TOKEN", "token"),
                ("AI_ADOPTION_DATE", "2024-03-15"),
                ("AI_STORY_POINTS_FIELD_ID", "customfield_20000"),
                ("TEAMS", "ELECOM:58:ELECOM"),
                ("CONFLUENCE_PAGE_ID", "123"),
            ]),
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.teams.len(), 1);
        assert_eq!(
            config.metrics_settings().ai_adoption_date,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(config.field_mapping().ai_points_field.as_deref(), Some("customfield_20000"));

        let (server, credentials) = config.confluence_connection().unwrap();
        assert_eq!(server, "https://acme.atlassian.net");
        assert_eq!(credentials.email, "dev@acme.com");
        assert_eq!(config.confluence.page_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_invalid_adoption_date_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = ReportConfig::load_from(
            &dir.path().join("missing.toml"),
            env(&[("AI_ADOPTION_DATE", "01/01/2024")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_file_values_win_over_plain_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
[jira]
server = "https://file.atlassian.net"
email = "file@acme.com"

[metrics]
ai_adoption_date = "2023-06-01"
history_limit = 5

[[teams]]
name = "Core"
board_id = "7"
project_key = "CORE"
"#,
        )
        .unwrap();

        let config = ReportConfig::load_from(
            &path,
            env(&[
                ("JIRA_SERVER", "https://env.atlassian.net"),
                ("JIRA_EMAIL", "env@acme.com"),
                ("JIRA_API_TOKEN", "token"),
                ("TEAMS", "Other:1:OTH"),
            ]),
        )
        .unwrap();

        assert_eq!(config.jira.server, "https://file.atlassian.net");
        assert_eq!(config.jira.email.as_deref(), Some("file@acme.com"));
        assert_eq!(config.jira.api_token.as_deref(), Some("token"));
        assert_eq!(config.metrics.history_limit, 5);
        assert_eq!(config.teams[0].name, "Core");
        assert_eq!(
            config.metrics_settings().ai_adoption_date,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_sample_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        ReportConfig::sample().save_to_file(&path).unwrap();

        let loaded = ReportConfig::load_from(&path, env(&[])).unwrap();
        assert_eq!(loaded.teams, ReportConfig::sample().teams);
        assert_eq!(loaded.jira.server, "https://your-domain.atlassian.net");
    }
}
