use crate::image_types::AllowedFormat;
use crate::provider::UploadBackend;
use crate::types::UploadedFile;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadErrorType {
    MissingFile,
    UnsupportedMediaType,
    FileTooLarge,
    NotAnImage,
    ProviderError,
    MalformedProviderResponse,
}

impl UploadErrorType {
    pub fn default_detail(&self) -> String {
        match &self {
            UploadErrorType::MissingFile => "The image field is required".to_string(),
            UploadErrorType::UnsupportedMediaType => format!(
                "The image must be a file of type: {}",
                AllowedFormat::allowed_list()
            ),
            UploadErrorType::FileTooLarge => "The image exceeds the allowed size".to_string(),
            UploadErrorType::NotAnImage => {
                "The uploaded file content is not a supported image".to_string()
            }
            UploadErrorType::ProviderError => "The upload provider rejected the file".to_string(),
            UploadErrorType::MalformedProviderResponse => {
                "The upload provider returned an unexpected payload".to_string()
            }
        }
    }

    /// Validation kinds belong to the form field, the rest to the provider
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UploadErrorType::MissingFile
                | UploadErrorType::UnsupportedMediaType
                | UploadErrorType::FileTooLarge
                | UploadErrorType::NotAnImage
        )
    }
}

pub struct UploadError {
    pub err_type: UploadErrorType,
    pub detail: String,
}

impl UploadError {
    pub fn new(err_type: UploadErrorType, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or(err_type.default_detail());
        UploadError { err_type, detail }
    }
}

pub struct Uploader {
    backend: Arc<dyn UploadBackend + Send + Sync>,
    folder: String,
    max_size_kib: usize,
}

impl Uploader {
    pub fn new(
        backend: Arc<dyn UploadBackend + Send + Sync>,
        folder: String,
        max_size_kib: usize,
    ) -> Self {
        Uploader {
            backend,
            folder,
            max_size_kib,
        }
    }

    /// Reject bad files before anything leaves the process
    fn validate(&self, file: &UploadedFile) -> Option<UploadError> {
        if file.data.is_empty() {
            return Some(UploadError::new(UploadErrorType::MissingFile, None));
        }

        let format = match AllowedFormat::from_mime(file.content_type.as_str()) {
            Some(format) => format,
            None => {
                return Some(UploadError::new(
                    UploadErrorType::UnsupportedMediaType,
                    None,
                ));
            }
        };

        if file.size_kib() > self.max_size_kib {
            return Some(UploadError::new(
                UploadErrorType::FileTooLarge,
                Some(format!(
                    "The image must not be greater than {} kilobytes",
                    self.max_size_kib
                )),
            ));
        }

        // Declared type is not trusted, file content must agree with it
        let sniffed = imghdr::from_bytes(file.data.as_slice());
        match sniffed {
            Some(sniffed) if format.matches(sniffed) => None,
            _ => Some(UploadError::new(
                UploadErrorType::NotAnImage,
                Some(format!(
                    "The uploaded file content does not match the declared {} type",
                    format
                )),
            )),
        }
    }

    #[instrument(skip(self, file), fields(filename = %file.filename))]
    pub async fn upload(&self, file: UploadedFile) -> Result<String, UploadError> {
        if let Some(err) = self.validate(&file) {
            debug!(
                "Rejected upload of {}: {}",
                file.filename, err.detail
            );
            return Err(err);
        }

        info!(
            "Forwarding {} ({} KiB) to provider folder {}",
            file.filename,
            file.size_kib(),
            self.folder
        );
        let payload = self
            .backend
            .upload(&file, self.folder.as_str())
            .await
            .map_err(|err| {
                warn!(
                    "Provider refused upload of {}: {} (status {:?})",
                    file.filename, err.reason, err.http_error_code
                );
                UploadError::new(
                    UploadErrorType::ProviderError,
                    Some(format!(
                        "err: {}; status: {:#?}",
                        err.reason, err.http_error_code
                    )),
                )
            })?;

        // The provider promises a secure_url field, but that promise is not
        // enforced anywhere, so look it up explicitly
        match payload.get("secure_url").and_then(|url| url.as_str()) {
            Some(url) => {
                debug!("Provider hosted {} at {}", file.filename, url);
                Ok(url.to_string())
            }
            None => {
                warn!(
                    "Provider payload for {} has no secure_url: {}",
                    file.filename,
                    payload.to_string().chars().take(100).collect::<String>()
                );
                Err(UploadError::new(
                    UploadErrorType::MalformedProviderResponse,
                    None,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Minimal headers that imghdr recognizes
    pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
    pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00";

    struct CountingBackend {
        calls: AtomicUsize,
        payload: serde_json::Value,
    }

    impl CountingBackend {
        fn new(payload: serde_json::Value) -> Self {
            CountingBackend {
                calls: AtomicUsize::new(0),
                payload,
            }
        }
    }

    #[async_trait]
    impl UploadBackend for CountingBackend {
        async fn upload(
            &self,
            _file: &UploadedFile,
            _folder: &str,
        ) -> Result<serde_json::Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn uploader(backend: Arc<CountingBackend>) -> Uploader {
        Uploader::new(backend, "laravel_uploads".to_string(), 2048)
    }

    #[tokio::test]
    async fn valid_jpeg_returns_secure_url() {
        let backend = Arc::new(CountingBackend::new(
            json!({"secure_url": "https://example.com/img.jpg"}),
        ));
        let uploader = uploader(backend.clone());

        let file = UploadedFile::new(Some("cat.jpg"), Some("image/jpeg"), JPEG_BYTES.to_vec());
        let url = uploader.upload(file).await;

        assert_eq!(url.ok(), Some("https://example.com/img.jpg".to_string()));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disallowed_media_type_never_reaches_backend() {
        let backend = Arc::new(CountingBackend::new(json!({})));
        let uploader = uploader(backend.clone());

        let file = UploadedFile::new(Some("note.txt"), Some("text/plain"), b"hello".to_vec());
        let err = uploader.upload(file).await.err().unwrap();

        assert_eq!(err.err_type, UploadErrorType::UnsupportedMediaType);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_file_never_reaches_backend() {
        let backend = Arc::new(CountingBackend::new(json!({})));
        let uploader = uploader(backend.clone());

        let mut data = JPEG_BYTES.to_vec();
        data.resize(2049 * 1024, 0);
        let file = UploadedFile::new(Some("big.jpg"), Some("image/jpeg"), data);
        let err = uploader.upload(file).await.err().unwrap();

        assert_eq!(err.err_type, UploadErrorType::FileTooLarge);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn declared_type_must_match_content() {
        let backend = Arc::new(CountingBackend::new(json!({})));
        let uploader = uploader(backend.clone());

        // Gif bytes declared as png
        let file = UploadedFile::new(Some("fake.png"), Some("image/png"), GIF_BYTES.to_vec());
        let err = uploader.upload(file).await.err().unwrap();

        assert_eq!(err.err_type, UploadErrorType::NotAnImage);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_secure_url_is_a_named_error() {
        let backend = Arc::new(CountingBackend::new(json!({"public_id": "abc"})));
        let uploader = uploader(backend.clone());

        let file = UploadedFile::new(Some("cat.jpg"), Some("image/jpeg"), JPEG_BYTES.to_vec());
        let err = uploader.upload(file).await.err().unwrap();

        assert_eq!(err.err_type, UploadErrorType::MalformedProviderResponse);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_uploads_are_independent_calls() {
        let backend = Arc::new(CountingBackend::new(
            json!({"secure_url": "https://example.com/img.jpg"}),
        ));
        let uploader = uploader(backend.clone());

        for _ in 0..2 {
            let file =
                UploadedFile::new(Some("cat.jpg"), Some("image/jpeg"), JPEG_BYTES.to_vec());
            uploader.upload(file).await.ok().unwrap();
        }

        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}
