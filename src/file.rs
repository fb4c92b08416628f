use crate::error::{Error, Result};
use std::path::Path;

#[derive(Debug)]
pub struct FileTypeConfig {
    pub extensions: &'static [&'static str],
    pub size_limit: u64,
}

pub const SUPPORTED_FILE_TYPES: &[FileTypeConfig] = &[
    FileTypeConfig {
        extensions: &["mp4", "mov"],
        size_limit: 262144000, // 250 MB
    },
    FileTypeConfig {
        extensions: &["jpg", "png", "jpeg", "gif", "webp"],
        size_limit: 52428800, // 50 MB
    },
    FileTypeConfig {
        extensions: &["flac", "wav", "mp3", "m4a", "aac", "alac", "ogg"],
        size_limit: 20971520, // 20 MB
    },
    FileTypeConfig {
        extensions: &["txt"],
        size_limit: 5242880, // 5 MB
    },
];

/// Size limit for a file extension, if the API accepts it
pub fn size_limit_for(extension: &str) -> Option<u64> {
    let extension = extension.to_ascii_lowercase();
    SUPPORTED_FILE_TYPES
        .iter()
        .find(|config| config.extensions.contains(&extension.as_str()))
        .map(|config| config.size_limit)
}

/// Reject files the API would refuse before spending a request on them
pub fn validate_file(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| Error::InvalidFile(format!("File not found: {}", path.display())))?;

    if !metadata.is_file() {
        return Err(Error::InvalidFile(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let size_limit = size_limit_for(extension).ok_or_else(|| {
        Error::InvalidFile(format!("Unsupported file type: {}", path.display()))
    })?;

    let size = metadata.len();
    if size == 0 {
        return Err(Error::InvalidFile(format!("File is empty: {}", path.display())));
    }
    if size > size_limit {
        return Err(Error::InvalidFile(format!(
            "File too large: {} is {} bytes, limit is {} bytes",
            path.display(),
            size,
            size_limit
        )));
    }

    Ok(size)
}
