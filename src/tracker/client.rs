use super::errors::TrackerError;
use super::fields::{ai_points_saved, story_points_from_fields, work_item_from_issue, FieldMapping};
use super::types::{AgileIssuePage, Board, RawSprint, SearchPage, SprintPage};
use super::TrackerOps;
use crate::http::{Credentials, HttpResponse, RateLimitConfig, RateLimitedHttpClient};
use crate::metrics::{SprintRecord, WorkItem};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const SPRINT_PAGE_SIZE: u32 = 50;
const AGILE_ISSUE_PAGE_SIZE: u32 = 1000;
const SEARCH_PAGE_SIZE: u32 = 100;

/// Jira Cloud client for the Agile and search REST APIs
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: RateLimitedHttpClient,
    fields: FieldMapping,
}

impl JiraClient {
    pub fn new(
        server: &str,
        credentials: Credentials,
        fields: FieldMapping,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self, TrackerError> {
        if server.trim().is_empty() {
            return Err(TrackerError::Config("Jira server URL is not set".to_string()));
        }
        if credentials.email.is_empty() || credentials.api_token.is_empty() {
            return Err(TrackerError::Config(
                "Jira email and API token are required".to_string(),
            ));
        }

        let http = RateLimitedHttpClient::new(server.trim(), Some(credentials), rate_limit)?;
        Ok(Self { http, fields })
    }

    pub fn field_mapping(&self) -> &FieldMapping {
        &self.fields
    }

    fn board_path(board_id: &str) -> Result<String, TrackerError> {
        let board_id = board_id.trim();
        if board_id.is_empty() || !board_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(TrackerError::InvalidBoard(board_id.to_string()));
        }
        Ok(format!("/rest/agile/1.0/board/{}", board_id))
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, response: &HttpResponse) -> Result<T, TrackerError> {
        if !response.is_success() {
            return Err(TrackerError::status(response.status, self.http.url(path), &response.body));
        }
        response.json().map_err(|source| TrackerError::Decode {
            url: self.http.url(path),
            source,
        })
    }

    /// Every sprint on the board in the given state(s), in board order
    async fn sprints(&self, board_id: &str, state: &str) -> Result<Vec<RawSprint>, TrackerError> {
        let path = format!("{}/sprint", Self::board_path(board_id)?);
        let mut sprints = Vec::new();
        let mut start_at: u64 = 0;

        loop {
            let query = [
                ("state", state.to_string()),
                ("startAt", start_at.to_string()),
                ("maxResults", SPRINT_PAGE_SIZE.to_string()),
            ];
            let response = self.http.get(&path, &query).await?;
            let page: SprintPage = self.decode(&path, &response)?;

            let fetched = page.values.len() as u64;
            sprints.extend(page.values);

            if page.is_last || fetched == 0 {
                break;
            }
            start_at += fetched;
        }

        debug!("Fetched {} {} sprints for board {}", sprints.len(), state, board_id);
        Ok(sprints)
    }

    async fn agile_issues(&self, board_id: &str, sprint_id: u64) -> Result<Vec<Value>, TrackerError> {
        let path = format!("{}/sprint/{}/issue", Self::board_path(board_id)?, sprint_id);
        let fields = self.fields.requested_fields().join(",");
        let mut issues = Vec::new();
        let mut start_at: u64 = 0;

        loop {
            let query = [
                ("startAt", start_at.to_string()),
                ("maxResults", AGILE_ISSUE_PAGE_SIZE.to_string()),
                ("fields", fields.clone()),
            ];
            let response = self.http.get(&path, &query).await?;
            if !response.is_success() {
                debug!(
                    "Agile issue endpoint returned {} for sprint {}, stopping",
                    response.status, sprint_id
                );
                break;
            }

            let page: AgileIssuePage = self.decode(&path, &response)?;
            if page.issues.is_empty() {
                break;
            }

            let fetched = page.issues.len() as u64;
            issues.extend(page.issues);

            if start_at + fetched >= page.total {
                break;
            }
            start_at += fetched;
        }

        Ok(issues)
    }

    async fn search_issues(&self, sprint_id: u64) -> Result<Vec<Value>, TrackerError> {
        let path = "/rest/api/3/search/jql";
        let mut issues = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut payload = json!({
                "jql": format!("sprint = {}", sprint_id),
                "maxResults": SEARCH_PAGE_SIZE,
                "fields": self.fields.requested_fields(),
            });
            if let Some(token) = &next_page_token {
                payload["nextPageToken"] = json!(token);
            }

            let response = self.http.post_json(path, &payload).await?;
            let page: SearchPage = self.decode(path, &response)?;
            if page.issues.is_empty() {
                break;
            }
            issues.extend(page.issues);

            match page.next_page_token {
                Some(token) if !page.is_last => next_page_token = Some(token),
                _ => break,
            }
        }

        Ok(issues)
    }

    /// Look the issue up on its own when the board listing carried no estimate
    async fn backfill_story_points(&self, item: &mut WorkItem) {
        let path = format!("/rest/api/2/issue/{}", item.key);
        let query = [("fields", self.fields.requested_fields().join(","))];

        let fields = match self.http.get(&path, &query).await {
            Ok(response) if response.is_success() => match response.json::<Value>() {
                Ok(issue) => issue.get("fields").cloned().unwrap_or(Value::Null),
                Err(e) => {
                    debug!("Ignoring unreadable issue {}: {}", item.key, e);
                    return;
                }
            },
            Ok(response) => {
                debug!("Issue lookup for {} returned {}", item.key, response.status);
                return;
            }
            Err(e) => {
                debug!("Issue lookup for {} failed: {}", item.key, e);
                return;
            }
        };

        item.story_points = story_points_from_fields(&fields, &self.fields.story_point_fields);
        if item.story_points.is_some() {
            item.ai_points_saved = ai_points_saved(&item.labels, item.story_points, &fields, &self.fields);
        }
    }
}

#[async_trait]
impl TrackerOps for JiraClient {
    async fn board_name(&self, board_id: &str) -> Result<String, TrackerError> {
        let path = Self::board_path(board_id)?;
        let response = self.http.get(&path, &[]).await?;
        let board: Board = self.decode(&path, &response)?;
        debug!("Board {} is '{}'", board.id, board.name);
        Ok(board.name)
    }

    async fn active_sprint(&self, board_id: &str) -> Result<Option<SprintRecord>, TrackerError> {
        let sprints = self.sprints(board_id, "active").await?;
        Ok(sprints.into_iter().next().map(SprintRecord::from))
    }

    async fn sprint_by_name(&self, board_id: &str, name: &str) -> Result<Option<SprintRecord>, TrackerError> {
        let needle = name.to_lowercase();
        let sprints = self.sprints(board_id, "active,closed,future").await?;
        Ok(sprints
            .into_iter()
            .find(|sprint| sprint.name.to_lowercase().contains(&needle))
            .map(SprintRecord::from))
    }

    async fn closed_sprints(&self, board_id: &str, limit: usize) -> Result<Vec<SprintRecord>, TrackerError> {
        let sprints = self.sprints(board_id, "closed").await?;
        let skip = sprints.len().saturating_sub(limit);
        Ok(sprints.into_iter().skip(skip).map(SprintRecord::from).collect())
    }

    async fn sprint_issues(&self, board_id: &str, sprint_id: u64) -> Result<Vec<WorkItem>, TrackerError> {
        let agile = self.agile_issues(board_id, sprint_id).await?;

        if agile.is_empty() {
            info!("Agile API returned no issues for sprint {}, falling back to JQL search", sprint_id);
            let issues = self.search_issues(sprint_id).await?;
            return Ok(issues
                .iter()
                .map(|issue| work_item_from_issue(issue, &self.fields))
                .collect());
        }

        let mut items = Vec::with_capacity(agile.len());
        for issue in &agile {
            let mut item = work_item_from_issue(issue, &self.fields);
            if item.story_points.is_none() && !item.key.is_empty() {
                self.backfill_story_points(&mut item).await;
            }
            items.push(item);
        }

        let missing = items.iter().filter(|item| item.story_points.is_none()).count();
        if missing > 0 {
            warn!("{} of {} issues in sprint {} have no story points", missing, items.len(), sprint_id);
        }

        Ok(items)
    }
}
