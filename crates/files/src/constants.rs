/// Folder under the store root that holds content-addressed images.
pub const FILES_FOLDER_NAME: &str = "files";

/// Hash algorithm folder and metadata label.
pub const HASH_ALGORITHM: &str = "sha256";

/// Filename recorded when the uploader supplied none.
pub const DEFAULT_ORIGINAL_FILENAME: &str = "upload";
