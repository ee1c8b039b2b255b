use crate::metrics::{SprintRecord, SprintState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of `GET /rest/agile/1.0/board/{id}/sprint`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPage {
    #[serde(default)]
    pub values: Vec<RawSprint>,
    #[serde(default = "default_true")]
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSprint {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl From<RawSprint> for SprintRecord {
    fn from(raw: RawSprint) -> Self {
        SprintRecord {
            id: raw.id,
            name: raw.name,
            state: SprintState::parse(&raw.state),
            start_date: raw.start_date,
            end_date: raw.end_date,
        }
    }
}

/// One page of `GET /rest/agile/1.0/board/{id}/sprint/{id}/issue`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgileIssuePage {
    #[serde(default)]
    pub issues: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

/// One page of `POST /rest/api/3/search/jql`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default = "default_true")]
    pub is_last: bool,
}

/// `GET /rest/agile/1.0/board/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
}

fn default_true() -> bool {
    true
}
