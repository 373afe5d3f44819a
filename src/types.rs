/// Single uploaded file, as it crosses from the HTTP layer into the uploader
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client supplied file name, sanitized before it leaves the process
    pub filename: String,
    /// Declared media type from the multipart part headers
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: Option<&str>, content_type: Option<&str>, data: Vec<u8>) -> Self {
        UploadedFile {
            filename: sanitize_filename::sanitize(filename.unwrap_or("image")),
            content_type: content_type.unwrap_or("").to_string(),
            data,
        }
    }

    pub fn size_kib(&self) -> usize {
        self.data.len().div_ceil(1024)
    }
}
