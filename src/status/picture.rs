//! Profile picture checks, run before any remote call.

use crate::error::ApiError;
use std::path::Path;

/// Extensions Slack accepts for `users.setPhoto`
pub const SUPPORTED_IMAGE_FORMATS: &[&str] = &["jpeg", "jpg", "gif", "png"];

/// Whether the file name carries a supported image extension (case-insensitive).
/// A name without any extension is an error rather than `false`.
pub fn is_supported_image(path: &Path) -> Result<bool, ApiError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return Err(ApiError::InvalidInput(format!(
            "profile picture file doesn't have an extension: {}",
            path.display()
        )));
    };
    let extension = extension.to_ascii_lowercase();
    Ok(SUPPORTED_IMAGE_FORMATS.contains(&extension.as_str()))
}

/// Check that `path` is an existing regular file in a supported format.
pub fn validate_profile_picture(path: &Path) -> Result<(), ApiError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        ApiError::InvalidInput(format!(
            "Failed to check if profile picture path is a file: {}: {}",
            path.display(),
            e
        ))
    })?;
    if !metadata.is_file() {
        return Err(ApiError::InvalidInput(format!(
            "Profile picture file path is not valid: {}",
            path.display()
        )));
    }
    if !is_supported_image(path)? {
        return Err(ApiError::InvalidInput(format!(
            "Invalid profile picture file, valid formats are: {}",
            SUPPORTED_IMAGE_FORMATS.join(", ")
        )));
    }
    Ok(())
}
