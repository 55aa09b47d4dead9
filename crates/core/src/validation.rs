//! Input validation utilities.
//!
//! Checks applied to caller-supplied values at the HTTP and CLI boundaries before they
//! reach the record store or the extraction adapter.

use crate::constants::{ALLOWED_FILE_TYPES, MAX_FILE_SIZE_MB, MAX_SESSION_ID_LEN};
use crate::{VaultError, VaultResult};
use vault_types::NonEmptyText;

/// Validates an uploaded file's declared content type and size.
///
/// # Errors
///
/// - [`VaultError::UnsupportedMediaType`] if the content type is absent or not in
///   [`ALLOWED_FILE_TYPES`].
/// - [`VaultError::PayloadTooLarge`] if `size` exceeds [`MAX_FILE_SIZE_MB`].
pub fn validate_upload(content_type: Option<&str>, size: usize) -> VaultResult<()> {
    let content_type = content_type.unwrap_or_default();
    if !ALLOWED_FILE_TYPES.contains(&content_type) {
        return Err(VaultError::UnsupportedMediaType {
            content_type: content_type.to_owned(),
            allowed: ALLOWED_FILE_TYPES.join(", "),
        });
    }

    if size > MAX_FILE_SIZE_MB * 1024 * 1024 {
        return Err(VaultError::PayloadTooLarge {
            size,
            limit_mb: MAX_FILE_SIZE_MB,
        });
    }

    Ok(())
}

/// Validates a caller-chosen session identifier.
///
/// Session ids are opaque. Surrounding whitespace is trimmed; the result must be
/// non-empty, at most [`MAX_SESSION_ID_LEN`] characters and free of control characters,
/// since it is echoed into logs.
///
/// # Errors
///
/// Returns [`VaultError::InvalidInput`] describing the first rule that failed.
pub fn validate_session_id(session_id: &str) -> VaultResult<NonEmptyText> {
    let session_id = NonEmptyText::new(session_id)
        .map_err(|_| VaultError::InvalidInput("session_id cannot be empty".into()))?;

    if session_id.as_str().chars().count() > MAX_SESSION_ID_LEN {
        return Err(VaultError::InvalidInput(format!(
            "session_id exceeds maximum length of {} characters",
            MAX_SESSION_ID_LEN
        )));
    }

    if session_id.as_str().chars().any(char::is_control) {
        return Err(VaultError::InvalidInput(
            "session_id cannot contain control characters".into(),
        ));
    }

    Ok(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_types_within_limit() {
        for content_type in ALLOWED_FILE_TYPES {
            assert!(validate_upload(Some(content_type), 1024).is_ok());
        }
        assert!(validate_upload(Some("image/png"), MAX_FILE_SIZE_MB * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_unknown_or_missing_type() {
        assert!(matches!(
            validate_upload(Some("text/plain"), 10),
            Err(VaultError::UnsupportedMediaType { content_type, .. }) if content_type == "text/plain"
        ));
        assert!(matches!(
            validate_upload(None, 10),
            Err(VaultError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn rejects_oversized_upload() {
        let size = MAX_FILE_SIZE_MB * 1024 * 1024 + 1;
        assert!(matches!(
            validate_upload(Some("image/jpeg"), size),
            Err(VaultError::PayloadTooLarge { limit_mb: 10, .. })
        ));
    }

    #[test]
    fn session_id_rules() {
        assert_eq!(
            validate_session_id(" test_session_001 ").unwrap().as_str(),
            "test_session_001"
        );
        assert_eq!(validate_session_id("user@x.org").unwrap().as_str(), "user@x.org");
        assert!(validate_session_id("has space").is_ok());
        assert!(validate_session_id(&"é".repeat(MAX_SESSION_ID_LEN)).is_ok());

        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("   ").is_err());
        assert!(validate_session_id("line\nbreak").is_err());
        assert!(validate_session_id("tab\there").is_err());
        assert!(validate_session_id(&"a".repeat(MAX_SESSION_ID_LEN + 1)).is_err());
    }
}
