pub trait MimeType {
    fn mime_type(&self) -> &str;
}

/// Formats the service accepts from the browser form
#[derive(Debug, PartialEq, Hash, Eq, Copy, Clone, strum::Display)]
pub enum AllowedFormat {
    Jpeg,
    Png,
    Gif,
}

impl AllowedFormat {
    /// Map the declared media type onto an allowed format
    ///
    /// `image/jpg` is not a registered mime type, but browsers and old forms
    /// still send it, so it collapses into Jpeg
    pub fn from_mime(mime: &str) -> Option<AllowedFormat> {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(AllowedFormat::Jpeg),
            "image/png" => Some(AllowedFormat::Png),
            "image/gif" => Some(AllowedFormat::Gif),
            _ => None,
        }
    }

    /// Check that sniffed file content matches the declared format
    pub fn matches(&self, sniffed: imghdr::Type) -> bool {
        matches!(
            (self, sniffed),
            (AllowedFormat::Jpeg, imghdr::Type::Jpeg)
                | (AllowedFormat::Png, imghdr::Type::Png)
                | (AllowedFormat::Gif, imghdr::Type::Gif)
        )
    }

    pub fn allowed_list() -> &'static str {
        "jpeg, png, jpg, gif"
    }
}

impl MimeType for AllowedFormat {
    fn mime_type(&self) -> &str {
        match &self {
            AllowedFormat::Jpeg => "image/jpeg",
            AllowedFormat::Png => "image/png",
            AllowedFormat::Gif => "image/gif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpg_alias_maps_to_jpeg() {
        assert_eq!(AllowedFormat::from_mime("image/jpg"), Some(AllowedFormat::Jpeg));
        assert_eq!(AllowedFormat::from_mime("image/jpeg"), Some(AllowedFormat::Jpeg));
    }

    #[test]
    fn disallowed_types_are_rejected() {
        assert_eq!(AllowedFormat::from_mime("image/bmp"), None);
        assert_eq!(AllowedFormat::from_mime("text/plain"), None);
        assert_eq!(AllowedFormat::from_mime(""), None);
    }

    #[test]
    fn sniffed_content_must_agree_with_declared() {
        assert!(AllowedFormat::Png.matches(imghdr::Type::Png));
        assert!(!AllowedFormat::Png.matches(imghdr::Type::Gif));
    }
}
