use super::errors::PublishError;
use super::types::{Attachment, AttachmentList, ContentUpdate, LinkOutcome, Page, UploadOutcome};
use crate::http::{Credentials, HttpResponse, RateLimitConfig, RateLimitedHttpClient};
use crate::slides::is_report_file;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const API_PREFIX: &str = "/wiki/rest/api";
pub const REPORTS_SECTION_TITLE: &str = "Sprint Velocity Reports";
/// Reports listed in the page section
pub const LINKED_REPORT_LIMIT: usize = 10;

/// Uploads report files to a Confluence page and links them in its body
#[derive(Debug, Clone)]
pub struct ConfluencePublisher {
    http: RateLimitedHttpClient,
    default_page_id: Option<String>,
}

impl ConfluencePublisher {
    pub fn new(
        server: &str,
        credentials: Credentials,
        rate_limit: &RateLimitConfig,
        default_page_id: Option<String>,
    ) -> Result<Self, PublishError> {
        if server.trim().is_empty() {
            return Err(PublishError::Config("Confluence server URL is not set".to_string()));
        }
        let http = RateLimitedHttpClient::new(server.trim(), Some(credentials), rate_limit)?;
        Ok(Self {
            http,
            default_page_id: default_page_id.filter(|id| !id.trim().is_empty()),
        })
    }

    fn resolve_page_id(&self, page_id: Option<&str>) -> Result<String, PublishError> {
        page_id
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.trim().to_string())
            .or_else(|| self.default_page_id.clone())
            .ok_or(PublishError::MissingPageId)
    }

    fn content_path(page_id: &str) -> String {
        format!("{}/content/{}", API_PREFIX, page_id)
    }

    fn attachments_path(page_id: &str) -> String {
        format!("{}/child/attachment", Self::content_path(page_id))
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, response: &HttpResponse) -> Result<T, PublishError> {
        if !response.is_success() {
            return Err(PublishError::status(response.status, self.http.url(path), &response.body));
        }
        response.json().map_err(|source| PublishError::Decode {
            url: self.http.url(path),
            source,
        })
    }

    async fn fetch_page(&self, page_id: &str, expand: &str) -> Result<Page, PublishError> {
        let path = Self::content_path(page_id);
        let response = self.http.get(&path, &[("expand", expand.to_string())]).await?;
        if response.is_not_found() {
            return Err(PublishError::PageNotFound(page_id.to_string()));
        }
        self.decode(&path, &response)
    }

    async fn publish_draft(&self, page: &Page) -> Result<(), PublishError> {
        warn!("Page {} is in draft status, publishing it first", page.id);
        let payload = json!({
            "version": {"number": page.version_number()},
            "status": "current",
        });
        let response = self.http.put_json(&Self::content_path(&page.id), &payload).await?;
        if !response.is_success() {
            return Err(PublishError::DraftPublish {
                page_id: page.id.clone(),
                status: response.status,
            });
        }
        info!("Page {} published", page.id);
        Ok(())
    }

    async fn find_attachment(&self, page_id: &str, file_name: &str) -> Result<Option<Attachment>, PublishError> {
        let path = Self::attachments_path(page_id);
        let response = self
            .http
            .get(&path, &[("filename", file_name.to_string())])
            .await?;
        if !response.is_success() {
            debug!("Attachment lookup for {} returned {}", file_name, response.status);
            return Ok(None);
        }
        let list: AttachmentList = self.decode(&path, &response)?;
        Ok(list.results.into_iter().next())
    }

    /// Attach a file to the page, replacing an attachment with the same name
    pub async fn upload_attachment(
        &self,
        file_path: &Path,
        page_id: Option<&str>,
        comment: &str,
    ) -> Result<UploadOutcome, PublishError> {
        if !file_path.is_file() {
            return Err(PublishError::FileNotFound(file_path.to_path_buf()));
        }
        let page_id = self.resolve_page_id(page_id)?;

        let page = self.fetch_page(&page_id, "version,status").await?;
        if page.is_draft() {
            self.publish_draft(&page).await?;
        }

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let existing = self.find_attachment(&page_id, &file_name).await?;

        let data = tokio::fs::read(file_path).await.map_err(|source| PublishError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        let part = Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str(mime_type(file_path))?;
        let mut form = Form::new().part("file", part);
        if !comment.is_empty() {
            form = form.text("comment", comment.to_string());
        }

        let mut headers = HeaderMap::new();
        headers.insert("X-Atlassian-Token", HeaderValue::from_static("no-check"));

        let (path, outcome) = match &existing {
            Some(attachment) => (
                format!("{}/{}/data", Self::attachments_path(&page_id), attachment.id),
                UploadOutcome::Updated,
            ),
            None => (Self::attachments_path(&page_id), UploadOutcome::Created),
        };

        let response = self.http.post_multipart(&path, form, headers).await?;
        if !matches!(response.status, 200 | 201) {
            return Err(PublishError::status(response.status, self.http.url(&path), &response.body));
        }

        info!("Uploaded {} to page {} ({:?})", file_name, page_id, outcome);
        Ok(outcome)
    }

    pub async fn list_attachments(&self, page_id: Option<&str>) -> Result<Vec<Attachment>, PublishError> {
        let page_id = self.resolve_page_id(page_id)?;
        let path = Self::attachments_path(&page_id);
        let response = self.http.get(&path, &[]).await?;
        let list: AttachmentList = self.decode(&path, &response)?;
        Ok(list.results)
    }

    async fn update_body(&self, page: &Page, body: String) -> Result<(), PublishError> {
        let payload = json!({
            "version": {"number": page.version_number() + 1},
            "type": "page",
            "title": page.title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage",
                }
            }
        });
        let path = Self::content_path(&page.id);
        let response = self.http.put_json(&path, &payload).await?;
        if !response.is_success() {
            return Err(PublishError::status(response.status, self.http.url(&path), &response.body));
        }
        Ok(())
    }

    /// Append storage-format content to the page unless it is already there
    pub async fn add_page_content(&self, content: &str, page_id: Option<&str>) -> Result<ContentUpdate, PublishError> {
        let page_id = self.resolve_page_id(page_id)?;
        let page = self.fetch_page(&page_id, "version,body.storage").await?;
        let existing = page.storage_value();

        if existing.contains(content) {
            debug!("Content already present on page {}", page_id);
            return Ok(ContentUpdate::Unchanged);
        }

        self.update_body(&page, append_content(existing, content)).await?;
        info!("Updated content of page {}", page_id);
        Ok(ContentUpdate::Appended)
    }

    /// Add a section linking the newest report attachments to the page body
    pub async fn link_reports(&self, page_id: Option<&str>) -> Result<LinkOutcome, PublishError> {
        let page_id = self.resolve_page_id(page_id)?;
        let mut reports: Vec<Attachment> = self
            .list_attachments(Some(&page_id))
            .await?
            .into_iter()
            .filter(|attachment| is_report_file(&attachment.title))
            .collect();
        if reports.is_empty() {
            return Ok(LinkOutcome::NoReports);
        }

        let page = self.fetch_page(&page_id, "version,body.storage").await?;
        let existing = page.storage_value();
        if existing.contains(REPORTS_SECTION_TITLE) || existing.contains("Velocity Reports") {
            info!("Reports section already exists on page {}", page_id);
            return Ok(LinkOutcome::AlreadyLinked);
        }

        reports.sort_by(|a, b| b.when().cmp(a.when()));
        reports.truncate(LINKED_REPORT_LIMIT);

        let section = reports_section(&reports);
        self.update_body(&page, append_content(existing, &section)).await?;
        info!("Linked {} reports on page {}", reports.len(), page_id);
        Ok(LinkOutcome::Linked(reports.len()))
    }
}

fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

fn append_content(existing: &str, content: &str) -> String {
    if existing.trim().is_empty() {
        content.to_string()
    } else {
        format!("{}\n\n{}", existing, content)
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Human date from a `{team}_velocity_report_{YYYYmmdd}_{HHMMSS}` file name
pub fn report_date_label(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parts: Vec<&str> = stem.split('_').collect();

    if parts.len() >= 4 {
        let date_part = parts[parts.len() - 2];
        if date_part.len() == 8 {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y%m%d") {
                return date.format("%B %d, %Y").to_string();
            }
        }
    }
    "Recent".to_string()
}

/// Storage-format section with the attachments macro and one link per report
pub fn reports_section(reports: &[Attachment]) -> String {
    let mut section = format!(
        "<h2>{}</h2>\n<p>The following reports have been uploaded:</p>\n\
         <ac:structured-macro ac:name=\"attachments\" ac:schema-version=\"1\">\n\
         <ac:parameter ac:name=\"old\">false</ac:parameter>\n\
         </ac:structured-macro>\n\
         <p><strong>Latest Reports:</strong></p>\n<ul>",
        REPORTS_SECTION_TITLE
    );
    for report in reports {
        section.push_str(&format!(
            "\n<li><ac:link><ri:attachment ri:filename=\"{}\"/></ac:link> - {}</li>",
            escape_xml(&report.title),
            report_date_label(&report.title)
        ));
    }
    section.push_str("\n</ul>");
    section
}

/// Report decks in `dir`, newest first by modification time
pub fn latest_reports(dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    if !dir.is_dir() {
        return Err(PublishError::ReportsDirMissing(dir.to_path_buf()));
    }
    let io_error = |source| PublishError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("~$") || !is_report_file(&name) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(io_error)?;
        reports.push((modified, entry.path()));
    }

    reports.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(reports.into_iter().map(|(_, path)| path).collect())
}
