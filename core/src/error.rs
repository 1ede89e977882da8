use thiserror::Error;

/// Result type for oculex operations
pub type Result<T> = std::result::Result<T, OculexError>;

/// Error types for oculex operations
#[derive(Error, Debug)]
pub enum OculexError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Pixel data could not be decoded; recoverable, the affected
    /// artifact is dropped and extraction continues
    #[error("pixel decode error: {0}")]
    PixelDecode(String),

    /// A vendor sequence did not have the shape the strategy assumes.
    /// This is the one condition that aborts extraction for a file.
    #[error("missing required nested attribute: {0}")]
    MissingNestedAttribute(String),

    /// Artifact rendering error
    #[error("render error: {0}")]
    Render(String),

    /// Sidecar serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for OculexError {
    fn from(s: String) -> Self {
        OculexError::DicomError(s)
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for OculexError {
    fn from(e: dicom_object::ReadError) -> Self {
        OculexError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for OculexError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        OculexError::DicomError(format!("{}", e))
    }
}
