use collector_deploy::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock CustomMetricsReader serving fixed contents and recording requested paths
#[derive(Clone, Default)]
pub struct MockCustomMetricsReader {
    contents: Option<String>,
    pub requested: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockCustomMetricsReader {
    pub fn new(contents: &str) -> Self {
        Self {
            contents: Some(contents.to_string()),
            requested: Arc::default(),
        }
    }

    /// A reader for which every file is missing
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn requested_paths(&self) -> Vec<PathBuf> {
        self.requested.lock().unwrap().clone()
    }
}

impl CustomMetricsReader for MockCustomMetricsReader {
    fn read_custom_metrics(&self, path: &Path) -> Result<String> {
        self.requested.lock().unwrap().push(path.to_path_buf());
        match &self.contents {
            Some(contents) => Ok(contents.clone()),
            None => Err(ComposeError::CustomMetricsFileNotFound {
                path: path.to_path_buf(),
            }
            .into()),
        }
    }
}
