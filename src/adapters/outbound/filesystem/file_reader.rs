use crate::ports::outbound::CustomMetricsReader;
use crate::shared::error::ComposeError;
use crate::shared::security::{validate_file_size, validate_regular_file, MAX_INPUT_FILE_SIZE};
use crate::shared::Result;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;

/// FileSystemReader adapter for the custom metrics file
///
/// Rejects symlinks, non-regular files and oversized files before reading.
/// The file handle lives only inside [`FileSystemReader::read_bounded`].
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }

    fn read_bounded(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| ComposeError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let mut contents = String::new();
        // One byte past the limit so a file that grew after the metadata
        // check is still caught.
        file.take(MAX_INPUT_FILE_SIZE + 1)
            .read_to_string(&mut contents)
            .map_err(|e| ComposeError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        validate_file_size(contents.len() as u64, path, MAX_INPUT_FILE_SIZE)?;

        Ok(contents)
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomMetricsReader for FileSystemReader {
    fn read_custom_metrics(&self, path: &Path) -> Result<String> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ComposeError::CustomMetricsFileNotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            Err(e) => {
                return Err(ComposeError::FileReadError {
                    path: path.to_path_buf(),
                    details: e.to_string(),
                }
                .into());
            }
        };

        validate_regular_file(path, "custom metrics file")?;
        validate_file_size(metadata.len(), path, MAX_INPUT_FILE_SIZE)?;

        self.read_bounded(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_custom_metrics_success() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom-metrics.toml");
        fs::write(&path, "[[metric]]\ncontext = \"locks\"\n").unwrap();

        let contents = FileSystemReader::new().read_custom_metrics(&path).unwrap();
        assert_eq!(contents, "[[metric]]\ncontext = \"locks\"\n");
    }

    #[test]
    fn test_read_custom_metrics_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = FileSystemReader::new().read_custom_metrics(&path).unwrap_err();
        match err.downcast_ref::<ComposeError>() {
            Some(ComposeError::CustomMetricsFileNotFound { path: missing }) => {
                assert_eq!(missing, &path);
            }
            other => panic!("expected CustomMetricsFileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_read_custom_metrics_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = FileSystemReader::new()
            .read_custom_metrics(temp_dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_read_custom_metrics_too_large() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge.toml");
        fs::write(&path, vec![b'#'; (MAX_INPUT_FILE_SIZE + 1) as usize]).unwrap();

        let err = FileSystemReader::new().read_custom_metrics(&path).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_custom_metrics_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.toml");
        let link = temp_dir.path().join("link.toml");
        fs::write(&target, "[[metric]]").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = FileSystemReader::new().read_custom_metrics(&link).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComposeError>(),
            Some(ComposeError::SecurityError { .. })
        ));
    }
}
