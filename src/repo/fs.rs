use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::trace;

use super::{mint_url, FileDescriptor, Repo};
use crate::PlError;
use crate::utils::normalize_path;

/// Repository backed by a directory on disk. Version tags are recorded but
/// not used for lookup.
#[derive(Debug, Clone)]
pub struct FsRepo {
    root: PathBuf,
    resource: String,
}

impl FsRepo {
    pub fn new<P: AsRef<Path>>(root: P, resource: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            resource: resource.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a repository path to disk: `~/x` goes to the home directory,
    /// everything else is under the root.
    fn locate(&self, abspath: &str) -> Result<PathBuf, PlError> {
        if let Some(rest) = abspath.strip_prefix("~/") {
            let home = dirs::home_dir().ok_or_else(|| PlError::FileError {
                message: "Could not determine home directory for ~ expansion".into(),
                path: abspath.to_string(),
                hint: Some("Set HOME or use a path inside the repository".into()),
                code: Some(300),
            })?;
            return Ok(home.join(rest));
        }
        Ok(self.root.join(abspath.trim_start_matches('/')))
    }
}

#[async_trait]
impl Repo for FsRepo {
    async fn read(&self, path: &str, version: &str) -> Result<FileDescriptor, PlError> {
        let abspath = if path.starts_with("~/") {
            format!("~{}", normalize_path(&path[1..]))
        } else {
            normalize_path(path)
        };
        let disk = self.locate(&abspath)?;
        trace!(path = %disk.display(), "stat");

        match tokio::fs::metadata(&disk).await {
            Ok(meta) if meta.is_file() => Ok(FileDescriptor {
                resource: self.resource.clone(),
                version: version.to_string(),
                abspath,
            }),
            Ok(_) => Err(PlError::file("Not a regular file", abspath, 302)),
            Err(e) => Err(PlError::file(format!("Failed to read file: {}", e), abspath, 302)
                .with_hint("Check that the file exists and is readable")),
        }
    }

    async fn content(&self, file: &FileDescriptor) -> Result<Vec<u8>, PlError> {
        let disk = self.locate(&file.abspath)?;
        tokio::fs::read(&disk)
            .await
            .map_err(|e| PlError::file(format!("Failed to read file: {}", e), file.abspath.clone(), 302))
    }

    fn url(&self, file: &FileDescriptor, prefix: &str) -> String {
        mint_url(prefix, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::DEFAULT_URL_PREFIX;

    #[tokio::test]
    async fn test_reads_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("lib/base.pl"), "x = 1").unwrap();

        let repo = FsRepo::new(dir.path(), "course");
        let file = repo.read("/lib/../lib/base.pl", "v1").await.expect("Failed to read");
        assert_eq!(file.abspath, "/lib/base.pl");
        assert_eq!(file.resource, "course");
        assert_eq!(repo.content(&file).await.unwrap(), b"x = 1");
        assert_eq!(repo.url(&file, DEFAULT_URL_PREFIX), "/api/v1/files/course/lib/base.pl?version=v1");
    }

    #[tokio::test]
    async fn test_missing_and_directories_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        let repo = FsRepo::new(dir.path(), "course");

        assert_eq!(repo.read("/nope.pl", "v1").await.unwrap_err().code(), Some(302));
        assert_eq!(repo.read("/sub", "v1").await.unwrap_err().code(), Some(302));
    }
}
