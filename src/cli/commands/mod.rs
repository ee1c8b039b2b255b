use crate::config::ReportConfig;
use crate::http::RateLimitConfig;
use crate::tracker::JiraClient;
use anyhow::Result;

pub mod check;
pub mod init;
pub mod publish;
pub mod report;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Jira client built from validated configuration
pub fn jira_client(config: &ReportConfig) -> Result<JiraClient> {
    let credentials = config.jira_credentials()?;
    let rate_limit: &RateLimitConfig = &config.jira.rate_limit;
    Ok(JiraClient::new(
        &config.jira.server,
        credentials,
        config.field_mapping(),
        rate_limit,
    )?)
}

/// Print the credential help shown whenever configuration is incomplete
pub fn print_config_help() {
    println!();
    println!("🔧 QUICK FIXES:");
    println!("   → Run 'sprint-velocity init' and edit sprint-velocity.toml");
    println!("   → Or set JIRA_SERVER, JIRA_EMAIL and JIRA_API_TOKEN in a .env file");
    println!("   → Create an API token at: https://id.atlassian.com/manage-profile/security/api-tokens");
}

pub async fn show_usage() -> Result<()> {
    println!("📊 sprint-velocity - Sprint Velocity & AI Impact Reports");
    println!();
    println!("To get started:");
    println!("  ⚙️  sprint-velocity init      # Write a starter sprint-velocity.toml");
    println!("  🔌 sprint-velocity check     # Verify Jira access for each team board");
    println!("  📈 sprint-velocity report    # Generate velocity reports");
    println!("  📤 sprint-velocity publish   # Upload reports to Confluence");
    println!();
    println!("Teams are configured as TEAMS=Name:BoardID:ProjectKey or [[teams]] in sprint-velocity.toml");
    println!();
    println!("💡 Start with 'sprint-velocity check' to confirm your credentials!");
    Ok(())
}
