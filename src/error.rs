use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to read revenue ledger: {0}")]
    SourceError(String),

    #[error("Invalid month reference '{0}': expected YYYY-MM")]
    InvalidMonthRef(String),

    #[error("Workbook rendering failed: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Document rendering failed: {0}")]
    PdfError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
