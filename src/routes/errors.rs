use crate::upload::{UploadError, UploadErrorType};
use serde::Serialize;
use std::collections::HashMap;

/// Form field every validation message is attached to
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<UploadErrorType>,
    /// Field level messages, present on validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<&'static str, Vec<String>>>,
}

impl ErrorResponse {
    pub fn validation(err: &UploadError) -> Self {
        ErrorResponse {
            detail: err.detail.clone(),
            error_type: Some(err.err_type),
            errors: Some(HashMap::from([(IMAGE_FIELD, vec![err.detail.clone()])])),
        }
    }

    pub fn provider(err: &UploadError) -> Self {
        ErrorResponse {
            detail: err.detail.clone(),
            error_type: Some(err.err_type),
            errors: None,
        }
    }

    pub fn bad_body(detail: String) -> Self {
        ErrorResponse {
            detail,
            error_type: None,
            errors: None,
        }
    }
}
