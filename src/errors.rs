use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LithoError {
    #[error("No file uploaded")]
    MissingUpload,

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Malformed upload: {message}")]
    MalformedUpload { message: String },

    #[error("Upload exceeds {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error("Image decoding error: {message}")]
    DecodingError { message: String },

    #[error("Image too large: {megapixels}MP (max {limit}MP)")]
    ImageTooLarge { megapixels: u64, limit: u64 },

    #[error("PNG encoding error: {message}")]
    EncodeError { message: String },

    #[error("Settings error for '{path}': {message}")]
    SettingsError { path: PathBuf, message: String },

    #[error("Background task failed: {message}")]
    TaskFailed { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, LithoError>;

impl LithoError {
    /// Returns true if the request itself was at fault (the same upload will fail again)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LithoError::MissingUpload
            | LithoError::EmptyUpload
            | LithoError::MalformedUpload { .. }
            | LithoError::DecodingError { .. } => StatusCode::BAD_REQUEST,
            LithoError::ImageTooLarge { .. } | LithoError::UploadTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            LithoError::EncodeError { .. }
            | LithoError::SettingsError { .. }
            | LithoError::TaskFailed { .. }
            | LithoError::IoError { .. }
            | LithoError::JsonError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the plain-text body sent back to the browser
    pub fn user_message(&self) -> String {
        match self {
            // Kept verbatim: clients match on this body.
            LithoError::MissingUpload => self.to_string(),
            LithoError::EmptyUpload | LithoError::DecodingError { .. } => format!(
                "{}\n\nThe upload could not be read as an image. Try a PNG, JPEG, GIF, BMP, TIFF or WebP file.",
                self
            ),
            LithoError::ImageTooLarge { .. } | LithoError::UploadTooLarge { .. } => {
                format!("{}\n\nDownscale the image and try again.", self)
            }
            LithoError::MalformedUpload { .. } => {
                format!("{}\n\nSubmit the form again with a single image file.", self)
            }
            _ => "An unexpected error occurred while generating the height map.".to_string(),
        }
    }

    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LithoError::MissingUpload => "MISSING_UPLOAD",
            LithoError::EmptyUpload => "EMPTY_UPLOAD",
            LithoError::MalformedUpload { .. } => "MALFORMED_UPLOAD",
            LithoError::UploadTooLarge { .. } => "UPLOAD_TOO_LARGE",
            LithoError::DecodingError { .. } => "DECODING_ERROR",
            LithoError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            LithoError::EncodeError { .. } => "ENCODE_ERROR",
            LithoError::SettingsError { .. } => "SETTINGS_ERROR",
            LithoError::TaskFailed { .. } => "TASK_FAILED",
            LithoError::IoError { .. } => "IO_ERROR",
            LithoError::JsonError { .. } => "JSON_ERROR",
        }
    }

    /// Logs the error at a level matching who caused it
    pub fn log(&self) {
        let error_code = self.error_code();
        if self.is_client_error() {
            tracing::info!(error_code, error = %self, "rejected request");
        } else {
            tracing::error!(error_code, error = %self, "request failed");
        }
    }
}

impl IntoResponse for LithoError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), self.user_message()).into_response()
    }
}
