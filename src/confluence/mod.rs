// Confluence publishing of generated reports

pub mod errors;
pub mod publisher;
pub mod types;

pub use errors::PublishError;
pub use publisher::{latest_reports, ConfluencePublisher};
pub use types::{Attachment, ContentUpdate, LinkOutcome, UploadOutcome};
