//! Validated primitive types shared across the Personal Vault crates.
//!
//! These wrappers guarantee an invariant once constructed so that downstream code
//! (the image store, the record store, the HTTP layer) never has to re-check it.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input was not a 64 character lowercase hexadecimal SHA-256 digest
    #[error("Invalid SHA-256 digest: {0}")]
    InvalidDigest(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A SHA-256 digest in canonical form: 64 lowercase hexadecimal characters.
///
/// Stored images are addressed by this value, and it is the only hash format accepted
/// from callers (for example the `GET /images/{hash}` route).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    const HEX_LEN: usize = 64;

    /// Builds the canonical hex form from raw digest bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parses an externally supplied digest.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::InvalidDigest`] unless the input is exactly 64 lowercase hex
    /// characters. Uppercase input is rejected rather than normalised.
    pub fn parse(input: &str) -> Result<Self, TextError> {
        let ok = input.len() == Self::HEX_LEN
            && input.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !ok {
            return Err(TextError::InvalidDigest(input.to_owned()));
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Sha256Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Sha256Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  session-01  ").unwrap();
        assert_eq!(text.as_str(), "session-01");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   \t"), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn sha256_hash_from_bytes_is_lowercase_hex() {
        let hash = Sha256Hash::from_bytes(&[0xAB; 32]);
        assert_eq!(hash.as_str(), "ab".repeat(32));
        assert!(Sha256Hash::parse(hash.as_str()).is_ok());
    }

    #[test]
    fn sha256_hash_parse_rejects_traversal_and_uppercase() {
        assert!(Sha256Hash::parse("../../etc/passwd").is_err());
        assert!(Sha256Hash::parse(&"A".repeat(64)).is_err());
        assert!(Sha256Hash::parse(&"a".repeat(63)).is_err());
        assert!(Sha256Hash::parse(&"a".repeat(64)).is_ok());
    }
}
