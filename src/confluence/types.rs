use serde::{Deserialize, Serialize};

/// Subset of `GET /wiki/rest/api/content/{id}?expand=version,status,body.storage`
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "current_status")]
    pub status: String,
    #[serde(default)]
    pub version: Option<PageVersion>,
    #[serde(default)]
    pub body: Option<PageBody>,
}

impl Page {
    pub fn version_number(&self) -> u64 {
        self.version.as_ref().map(|v| v.number).unwrap_or(1)
    }

    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
            .unwrap_or("")
    }

    pub fn is_draft(&self) -> bool {
        self.status == "draft"
    }
}

fn current_status() -> String {
    "current".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageVersion {
    pub number: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageBody {
    #[serde(default)]
    pub storage: Option<Storage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentList {
    #[serde(default)]
    pub results: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: Option<AttachmentVersion>,
}

impl Attachment {
    /// Upload timestamp as reported by Confluence (ISO 8601, sorts lexically)
    pub fn when(&self) -> &str {
        self.version
            .as_ref()
            .and_then(|v| v.when.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentVersion {
    #[serde(default)]
    pub when: Option<String>,
}

/// What an upload did on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentUpdate {
    Appended,
    /// The content was already on the page
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked(usize),
    AlreadyLinked,
    NoReports,
}
