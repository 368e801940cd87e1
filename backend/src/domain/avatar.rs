//! Avatar upload payloads.
//!
//! Clients submit either a remote image location for the image host to fetch
//! or an inline `data:` URI carrying base64 image bytes.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use url::Url;

/// Largest accepted decoded image size.
pub const AVATAR_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Errors raised while validating an avatar payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvatarPayloadError {
    #[error("avatar must not be empty")]
    Empty,
    #[error("avatar must be an http(s) URL or a base64 image data URI")]
    UnsupportedFormat,
    #[error("avatar data is not valid base64")]
    InvalidBase64,
    #[error("avatar must be at most {max} bytes")]
    TooLarge { max: usize },
}

/// Image submitted for upload.
#[derive(Clone, PartialEq, Eq)]
pub enum AvatarPayload {
    /// Remote image the host fetches itself.
    RemoteUrl(String),
    /// Inline image as a `data:image/<type>;base64,<data>` URI.
    DataUri(String),
}

impl AvatarPayload {
    /// Classify and validate a raw payload string.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::AvatarPayload;
    ///
    /// let payload = AvatarPayload::parse("data:image/png;base64,iVBORw0KGgo=")
    ///     .expect("valid data URI");
    /// assert!(matches!(payload, AvatarPayload::DataUri(_)));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, AvatarPayloadError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AvatarPayloadError::Empty);
        }
        if let Some(rest) = trimmed.strip_prefix("data:") {
            return Self::parse_data_uri(trimmed, rest);
        }
        let url = Url::parse(trimmed).map_err(|_| AvatarPayloadError::UnsupportedFormat)?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(AvatarPayloadError::UnsupportedFormat);
        }
        Ok(Self::RemoteUrl(trimmed.to_owned()))
    }

    fn parse_data_uri(full: &str, rest: &str) -> Result<Self, AvatarPayloadError> {
        let (media, data) = rest
            .split_once(',')
            .ok_or(AvatarPayloadError::UnsupportedFormat)?;
        let Some(mime) = media.strip_suffix(";base64") else {
            return Err(AvatarPayloadError::UnsupportedFormat);
        };
        let subtype = mime
            .strip_prefix("image/")
            .ok_or(AvatarPayloadError::UnsupportedFormat)?;
        if subtype.is_empty() {
            return Err(AvatarPayloadError::UnsupportedFormat);
        }
        // Base64 expands by 4/3; reject obviously oversized input before decoding.
        if data.len() / 4 * 3 > AVATAR_MAX_BYTES + 3 {
            return Err(AvatarPayloadError::TooLarge {
                max: AVATAR_MAX_BYTES,
            });
        }
        let decoded = STANDARD
            .decode(data)
            .map_err(|_| AvatarPayloadError::InvalidBase64)?;
        if decoded.is_empty() {
            return Err(AvatarPayloadError::Empty);
        }
        if decoded.len() > AVATAR_MAX_BYTES {
            return Err(AvatarPayloadError::TooLarge {
                max: AVATAR_MAX_BYTES,
            });
        }
        Ok(Self::DataUri(full.to_owned()))
    }

    /// Value sent to the image host's `file` field.
    pub fn as_upload_source(&self) -> &str {
        match self {
            Self::RemoteUrl(url) => url,
            Self::DataUri(uri) => uri,
        }
    }
}

impl fmt::Debug for AvatarPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteUrl(url) => f.debug_tuple("RemoteUrl").field(url).finish(),
            Self::DataUri(uri) => write!(f, "DataUri({} bytes)", uri.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://images.example.com/cat.png")]
    #[case("http://images.example.com/cat.png")]
    fn accepts_remote_urls(#[case] raw: &str) {
        assert_eq!(
            AvatarPayload::parse(raw).expect("valid url"),
            AvatarPayload::RemoteUrl(raw.to_owned())
        );
    }

    #[rstest]
    #[case("", AvatarPayloadError::Empty)]
    #[case("ftp://images.example.com/cat.png", AvatarPayloadError::UnsupportedFormat)]
    #[case("data:text/plain;base64,aGVsbG8=", AvatarPayloadError::UnsupportedFormat)]
    #[case("data:image/png,rawbytes", AvatarPayloadError::UnsupportedFormat)]
    #[case("data:image/png;base64,@@@", AvatarPayloadError::InvalidBase64)]
    #[case("data:image/png;base64,", AvatarPayloadError::Empty)]
    fn rejects_invalid_payloads(#[case] raw: &str, #[case] expected: AvatarPayloadError) {
        assert_eq!(AvatarPayload::parse(raw).expect_err("invalid"), expected);
    }

    #[rstest]
    fn rejects_oversized_images() {
        let data = STANDARD.encode(vec![0_u8; AVATAR_MAX_BYTES + 1]);
        let raw = format!("data:image/png;base64,{data}");
        assert_eq!(
            AvatarPayload::parse(&raw).expect_err("too large"),
            AvatarPayloadError::TooLarge {
                max: AVATAR_MAX_BYTES
            }
        );
    }

    #[rstest]
    fn debug_output_omits_inline_bytes() {
        let payload = AvatarPayload::parse("data:image/gif;base64,R0lGODlhAQABAAAAACw=")
            .expect("valid data URI");
        assert!(!format!("{payload:?}").contains("R0lGOD"));
    }
}
