//! Content-addressed image store implementation
//!
//! [`ImageStore`] writes uploaded image bytes under their SHA-256 digest and reads them
//! back by digest. Identical uploads resolve to the same stored file.
//!
//! # Storage Layout
//!
//! ```text
//! <root>/files/sha256/<h[0..2]>/<h[2..4]>/<h>
//! ```
//!
//! # Security Model
//!
//! - The root is canonicalised at construction time
//! - Lookups only accept a validated [`Sha256Hash`], never a raw path fragment
//! - Caller-supplied filenames are recorded as metadata only, never used as paths

use crate::constants::{DEFAULT_ORIGINAL_FILENAME, FILES_FOLDER_NAME, HASH_ALGORITHM};
use crate::FilesError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use vault_types::{NonEmptyText, Sha256Hash};

/// Metadata for a stored image
///
/// Returned from [`ImageStore::add_bytes`]. It carries no patient identifiers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    /// Hashing algorithm used (always "sha256")
    pub hash_algorithm: NonEmptyText,

    /// Hexadecimal digest of the file content
    pub hash: Sha256Hash,

    /// Path relative to the store root
    pub relative_path: NonEmptyText,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from magic bytes; the uploader's declared type is not trusted.
    pub media_type: Option<NonEmptyText>,

    /// Filename reported by the uploader (final path component only)
    pub original_filename: NonEmptyText,

    /// UTC timestamp when the file was stored
    pub stored_at: DateTime<Utc>,
}

/// Image store rooted at a single directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    root_directory: PathBuf,
}

impl ImageStore {
    /// Opens the store rooted at `root_directory`
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if the directory does not exist, is not a
    /// directory, or cannot be canonicalised.
    pub fn new(root_directory: &Path) -> Result<Self, FilesError> {
        if !root_directory.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root_directory.display()
            )));
        }

        if !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    /// Stores `bytes` and returns their metadata
    ///
    /// If the same content is already stored the existing file is left untouched and
    /// fresh metadata is returned for it.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `bytes` is empty
    /// - Storage directory creation fails (I/O)
    /// - File write fails (I/O)
    pub fn add_bytes(
        &self,
        bytes: &[u8],
        original_filename: Option<&str>,
    ) -> Result<FileMetadata, FilesError> {
        if bytes.is_empty() {
            return Err(FilesError::EmptyFile);
        }

        let digest: [u8; 32] = Sha256::digest(bytes).into();
        let hash = Sha256Hash::from_bytes(&digest);

        let storage_path = self.compute_storage_path(&hash);
        if storage_path.exists() {
            tracing::debug!("image {} already stored", hash);
        } else {
            if let Some(parent) = storage_path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!(
                            "Failed to create storage directory {}: {}",
                            parent.display(),
                            e
                        ),
                    ))
                })?;
            }

            fs::write(&storage_path, bytes).map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write file to {}: {}", storage_path.display(), e),
                ))
            })?;
        }

        Ok(FileMetadata {
            hash_algorithm: text(HASH_ALGORITHM),
            relative_path: text(&Self::compute_relative_path(&hash)),
            size_bytes: bytes.len() as u64,
            media_type: detect_media_type(bytes),
            original_filename: sanitise_filename(original_filename),
            stored_at: Utc::now(),
            hash,
        })
    }

    /// Reads a stored image by hash
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotFound` if nothing is stored under `hash`, or
    /// `FilesError::Io` if the file cannot be read.
    pub fn read(&self, hash: &Sha256Hash) -> Result<Vec<u8>, FilesError> {
        let storage_path = self.compute_storage_path(hash);

        if !storage_path.is_file() {
            return Err(FilesError::NotFound(hash.to_string()));
        }

        fs::read(&storage_path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file from {}: {}", storage_path.display(), e),
            ))
        })
    }

    /// Whether an image with this hash is stored
    pub fn contains(&self, hash: &Sha256Hash) -> bool {
        self.compute_storage_path(hash).is_file()
    }

    /// Returns the canonicalised store root
    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    fn compute_storage_path(&self, hash: &Sha256Hash) -> PathBuf {
        self.root_directory
            .join(Self::compute_relative_path(hash))
    }

    /// `files/sha256/<shard1>/<shard2>/<hash>`
    fn compute_relative_path(hash: &Sha256Hash) -> String {
        let hex = hash.as_str();
        format!(
            "{}/{}/{}/{}/{}",
            FILES_FOLDER_NAME,
            HASH_ALGORITHM,
            &hex[0..2],
            &hex[2..4],
            hex
        )
    }
}

/// Best-effort media type detection from magic bytes
pub fn detect_media_type(bytes: &[u8]) -> Option<NonEmptyText> {
    infer::get(bytes).and_then(|kind| NonEmptyText::new(kind.mime_type()).ok())
}

fn sanitise_filename(original: Option<&str>) -> NonEmptyText {
    original
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .and_then(|name| NonEmptyText::new(name).ok())
        .unwrap_or_else(|| text(DEFAULT_ORIGINAL_FILENAME))
}

fn text(value: &str) -> NonEmptyText {
    NonEmptyText::new(value).expect("constant or computed text is non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn store() -> (TempDir, ImageStore) {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path()).unwrap();
        (temp, store)
    }

    #[test]
    fn test_new_root_not_exists() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("non-existent");

        assert!(matches!(
            ImageStore::new(&root),
            Err(FilesError::InvalidRootDirectory(_))
        ));
    }

    #[test]
    fn test_new_root_not_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        assert!(matches!(
            ImageStore::new(&root),
            Err(FilesError::InvalidRootDirectory(_))
        ));
    }

    #[test]
    fn test_add_bytes_success() {
        let (_temp, store) = store();

        let metadata = store.add_bytes(b"Hello, World!", Some("card.jpg")).unwrap();

        assert_eq!(metadata.hash_algorithm.as_str(), "sha256");
        assert_eq!(metadata.size_bytes, 13);
        assert_eq!(metadata.original_filename.as_str(), "card.jpg");
        assert_eq!(
            metadata.hash.as_str(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );

        let stored_path = store.compute_storage_path(&metadata.hash);
        assert_eq!(fs::read(stored_path).unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_relative_path_sharding() {
        let (_temp, store) = store();
        let metadata = store.add_bytes(b"Hello, World!", None).unwrap();

        assert_eq!(
            metadata.relative_path.as_str(),
            format!("files/sha256/df/fd/{}", metadata.hash)
        );
        assert!(store
            .root_directory()
            .join(metadata.relative_path.as_str())
            .is_file());
    }

    #[test]
    fn test_add_same_content_is_deduplicated() {
        let (_temp, store) = store();

        let first = store.add_bytes(b"Same content", Some("a.png")).unwrap();
        let second = store.add_bytes(b"Same content", Some("b.png")).unwrap();

        assert_eq!(first.hash, second.hash);
        assert_eq!(first.relative_path, second.relative_path);
        assert_eq!(second.original_filename.as_str(), "b.png");
    }

    #[test]
    fn test_add_empty_rejected() {
        let (_temp, store) = store();
        assert!(matches!(store.add_bytes(&[], None), Err(FilesError::EmptyFile)));
    }

    #[test]
    fn test_media_type_detected_from_content() {
        let (_temp, store) = store();

        let metadata = store.add_bytes(&PNG_HEADER, Some("record.jpg")).unwrap();

        assert_eq!(
            metadata.media_type.as_ref().map(|t| t.as_str()),
            Some("image/png")
        );
    }

    #[test]
    fn test_unknown_media_type_is_none() {
        let (_temp, store) = store();
        let metadata = store.add_bytes(b"plain text", None).unwrap();
        assert!(metadata.media_type.is_none());
    }

    #[test]
    fn test_filename_is_reduced_to_last_component() {
        let (_temp, store) = store();

        let nested = store
            .add_bytes(b"abc", Some("../../etc/passwd"))
            .unwrap();
        assert_eq!(nested.original_filename.as_str(), "passwd");

        let missing = store.add_bytes(b"abcd", None).unwrap();
        assert_eq!(missing.original_filename.as_str(), "upload");

        let blank = store.add_bytes(b"abcde", Some("  ")).unwrap();
        assert_eq!(blank.original_filename.as_str(), "upload");
    }

    #[test]
    fn test_read_roundtrip_binary() {
        let (_temp, store) = store();
        let bytes: Vec<u8> = (0..=255).collect();

        let metadata = store.add_bytes(&bytes, None).unwrap();

        assert!(store.contains(&metadata.hash));
        assert_eq!(store.read(&metadata.hash).unwrap(), bytes);
    }

    #[test]
    fn test_read_not_found() {
        let (_temp, store) = store();
        let hash = Sha256Hash::parse(&"0".repeat(64)).unwrap();

        assert!(!store.contains(&hash));
        assert!(matches!(store.read(&hash), Err(FilesError::NotFound(_))));
    }

    #[test]
    fn test_metadata_serialization() {
        let (_temp, store) = store();
        let metadata = store.add_bytes(&PNG_HEADER, Some("x.png")).unwrap();

        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: FileMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, metadata);
    }
}
