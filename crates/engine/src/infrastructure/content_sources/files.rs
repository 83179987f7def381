//! Catalog content served from a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::infrastructure::ports::{ContentError, ContentPort};

/// Reads catalog documents from a base directory. Used for bundled content
/// and as the content source of the test suites.
pub struct FileContentSource {
    base: PathBuf,
}

impl FileContentSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base.join(Path::new(path))
    }
}

#[async_trait]
impl ContentPort for FileContentSource {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value, ContentError> {
        let full = self.resolve(path);
        let raw = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| ContentError::Unavailable(format!("{}: {e}", full.display())))?;
        serde_json::from_str(&raw).map_err(|e| ContentError::Malformed {
            path: path.to_string(),
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = FileContentSource::new(dir.path());
        let err = source
            .fetch_json("stages.json")
            .await
            .expect_err("should fail");
        assert!(matches!(err, ContentError::Unavailable(_)));
    }

    #[tokio::test]
    async fn malformed_json_is_reported_with_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("stages.json"), "{ not json").expect("write");
        let source = FileContentSource::new(dir.path());
        let err = source
            .fetch_json("stages.json")
            .await
            .expect_err("should fail");
        match err {
            ContentError::Malformed { path, .. } => assert_eq!(path, "stages.json"),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nested_paths_resolve_under_the_base() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("stages")).expect("mkdir");
        std::fs::write(
            dir.path().join("stages/mire.json"),
            r#"{ "name": "Mire" }"#,
        )
        .expect("write");
        let source = FileContentSource::new(dir.path());
        let value = source.fetch_json("stages/mire.json").await.expect("fetch");
        assert_eq!(value["name"], "Mire");
    }
}
