use crate::shared::error::ComposeError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Upper bound on any input file read during composition (1 MiB).
///
/// Parameter payloads are capped far below this; the limit only guards the
/// read itself before the payload size policy applies.
pub const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Arguments
/// * `path` - The path to validate
/// * `file_description` - Description of the file (e.g., "custom metrics file")
///
/// # Errors
/// Returns [`ComposeError::SecurityError`] for symbolic links and
/// [`ComposeError::FileReadError`] for anything that is not a regular file.
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| ComposeError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {} metadata: {}", file_description, e),
    })?;

    if metadata.is_symlink() {
        return Err(ComposeError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("The {} is a symbolic link", file_description),
            hint: "Point the configuration at the real file instead of a link".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        return Err(ComposeError::FileReadError {
            path: path.to_path_buf(),
            details: format!("The {} is not a regular file", file_description),
        }
        .into());
    }

    Ok(())
}

/// Validates file size is within acceptable limits
///
/// # Errors
/// Returns an error if the file size exceeds `max_size`
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        return Err(ComposeError::SecurityError {
            path: path.to_path_buf(),
            reason: format!(
                "File is too large ({} bytes). Maximum allowed size is {} bytes.",
                file_size, max_size
            ),
            hint: "Custom metric definitions must fit in a single parameter".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_regular_file_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("custom-metrics.toml");
        fs::write(&file_path, "[[metric]]").unwrap();

        assert!(validate_regular_file(&file_path, "custom metrics file").is_ok());
    }

    #[test]
    fn test_validate_regular_file_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_regular_file(temp_dir.path(), "custom metrics file");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("is not a regular file"));
    }

    #[test]
    fn test_validate_regular_file_missing() {
        let result = validate_regular_file(Path::new("/nonexistent/metrics.toml"), "file");
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_regular_file_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.toml");
        let link = temp_dir.path().join("link.toml");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = validate_regular_file(&link, "custom metrics file").unwrap_err();
        assert!(err.to_string().contains("Security violation"));
    }

    #[test]
    fn test_validate_file_size() {
        let path = PathBuf::from("/test/file.toml");
        assert!(validate_file_size(1000, &path, MAX_INPUT_FILE_SIZE).is_ok());

        let result = validate_file_size(MAX_INPUT_FILE_SIZE + 1, &path, MAX_INPUT_FILE_SIZE);
        assert!(result.unwrap_err().to_string().contains("too large"));
    }
}
