use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("The file '{}' was not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not read '{}': {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AniList search failed ({status}): {body}")]
    SearchFailed { status: u16, body: String },

    #[error("No results found for '{0}'")]
    NoResults(String),

    #[error("'{0}' is not a valid number")]
    InvalidSelection(String),

    #[error("Selection {choice} is out of range (1-{count})")]
    OutOfRange { choice: i64, count: usize },

    #[error("Notion query failed ({status}): {body}")]
    LookupFailed { status: u16, body: String },

    #[error("Notion page creation failed ({status}): {body}")]
    PublishFailed { status: u16, body: String },

    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),
}

impl ImportError {
    /// Whether the whole run has to stop instead of moving to the next title.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::FileNotFound(_) | Self::ReadFailed { .. } => true,
            Self::Prompt(inquire::InquireError::OperationCanceled) => false,
            Self::Prompt(_) => true,
            _ => false,
        }
    }
}
