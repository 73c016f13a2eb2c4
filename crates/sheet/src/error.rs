use thiserror::Error;

/// Errors that can abort an ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No workbooks to ingest: select at least one file")]
    NoSources,

    #[error("Could not read workbook {file}: {message}")]
    Decode { file: String, message: String },
}

impl IngestError {
    /// Create a decode error for a file.
    pub fn decode(file: impl Into<String>, message: impl ToString) -> Self {
        IngestError::Decode {
            file: file.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
