//! Vault Image Storage
//!
//! Content-addressed storage for uploaded vaccination record images.
//!
//! ## Design Principles
//!
//! - Images are addressed by the SHA-256 of their bytes
//! - Stored images are immutable; identical uploads share one file
//! - Record metadata lives in the record store, bytes live here
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//! └── files/
//!     └── sha256/
//!         └── ab/
//!             └── 3f/
//!                 └── ab3f9e…
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use vault_files::ImageStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ImageStore::new(Path::new("vault_data"))?;
//! let metadata = store.add_bytes(b"...jpeg bytes...", Some("card.jpg"))?;
//! let bytes = store.read(&metadata.hash)?;
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::FILES_FOLDER_NAME;
pub use files::{detect_media_type, FileMetadata, ImageStore};
pub use vault_types::Sha256Hash;

/// Errors that can occur during image storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// No stored image has the requested hash
    #[error("File not found for hash: {0}")]
    NotFound(String),

    /// Refusing to store an empty upload
    #[error("Cannot store an empty file")]
    EmptyFile,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
