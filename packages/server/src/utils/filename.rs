use std::path::Path;

/// Result of validating a remote folder name.
#[derive(Debug, PartialEq, Eq)]
pub enum FolderError {
    /// Folder is empty or whitespace-only.
    Empty,
    /// Folder contains `..` segments.
    PathTraversal,
    /// Folder contains characters the image host does not accept.
    InvalidCharacter,
    /// Folder is longer than 200 characters.
    TooLong,
}

impl FolderError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Folder cannot be empty",
            Self::PathTraversal => "Invalid folder: '..' segments are not allowed",
            Self::InvalidCharacter => {
                "Invalid folder: only letters, digits, '_', '-', ' ' and '/' are allowed"
            }
            Self::TooLong => "Invalid folder: at most 200 characters",
        }
    }
}

/// Validate a remote folder and normalize away leading/trailing slashes.
pub fn validate_folder(folder: &str) -> Result<String, FolderError> {
    let trimmed = folder.trim().trim_matches('/');

    if trimmed.is_empty() {
        return Err(FolderError::Empty);
    }

    if trimmed.chars().count() > 200 {
        return Err(FolderError::TooLong);
    }

    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(FolderError::PathTraversal);
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ' ' | '/'))
    {
        return Err(FolderError::InvalidCharacter);
    }

    Ok(trimmed.to_string())
}

/// Last path component of a client-supplied filename.
///
/// Browsers on some platforms send full paths; both separators are stripped.
pub fn display_filename(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim()
}

/// Human title for an upload: extension stripped, `_` and `-` read as spaces.
pub fn title_from_filename(filename: &str) -> String {
    let name = display_filename(filename);
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let title = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}
