use std::collections::HashMap;

use async_trait::async_trait;

use super::{mint_url, FileDescriptor, Repo};
use crate::PlError;
use crate::utils::normalize_path;

/// Version tag that answers any version lacking an exact entry.
pub const LATEST: &str = "latest";

/// In-memory repository holding the files of one resource.
///
/// ```
/// use pl_compiler::MemoryRepo;
///
/// let repo = MemoryRepo::new("loops")
///     .with_file("/main.pl", "title = \"Loops\"")
///     .with_version("/main.pl", "v2", "title = \"Loops v2\"");
/// assert!(repo.contains("/main.pl", "v2"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    resource: String,
    files: HashMap<(String, String), Vec<u8>>,
}

impl MemoryRepo {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            files: HashMap::new(),
        }
    }

    /// Adds a file under the `latest` version.
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.with_version(path, LATEST, content)
    }

    pub fn with_version(mut self, path: &str, version: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, version, content);
        self
    }

    pub fn insert(&mut self, path: &str, version: &str, content: impl Into<Vec<u8>>) {
        self.files
            .insert((normalize_path(path), version.to_string()), content.into());
    }

    pub fn contains(&self, path: &str, version: &str) -> bool {
        self.lookup(&normalize_path(path), version).is_some()
    }

    fn lookup(&self, abspath: &str, version: &str) -> Option<&Vec<u8>> {
        self.files
            .get(&(abspath.to_string(), version.to_string()))
            .or_else(|| self.files.get(&(abspath.to_string(), LATEST.to_string())))
    }
}

#[async_trait]
impl Repo for MemoryRepo {
    async fn read(&self, path: &str, version: &str) -> Result<FileDescriptor, PlError> {
        if path.starts_with("~/") {
            return Err(PlError::file("Home paths are not available in memory", path, 304));
        }
        let abspath = normalize_path(path);
        match self.lookup(&abspath, version) {
            Some(_) => Ok(FileDescriptor {
                resource: self.resource.clone(),
                version: version.to_string(),
                abspath,
            }),
            None => Err(PlError::file(
                format!("No such file at version '{}'", version),
                abspath,
                302,
            )),
        }
    }

    async fn content(&self, file: &FileDescriptor) -> Result<Vec<u8>, PlError> {
        self.lookup(&file.abspath, &file.version)
            .cloned()
            .ok_or_else(|| PlError::file("File vanished before it could be read", file.abspath.clone(), 302))
    }

    fn url(&self, file: &FileDescriptor, prefix: &str) -> String {
        mint_url(prefix, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_versions_fall_back_to_latest() {
        let repo = MemoryRepo::new("res")
            .with_file("/a.pl", "x = 1")
            .with_version("a.pl", "v2", "x = 2");

        let v2 = repo.read("/a.pl", "v2").await.unwrap();
        assert_eq!(repo.content(&v2).await.unwrap(), b"x = 2");

        let v1 = repo.read("/./a.pl", "v1").await.unwrap();
        assert_eq!(v1.version, "v1");
        assert_eq!(repo.content(&v1).await.unwrap(), b"x = 1");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let repo = MemoryRepo::new("res");
        let err = repo.read("/nope.pl", LATEST).await.unwrap_err();
        assert_eq!(err.code(), Some(302));
    }

    #[tokio::test]
    async fn test_url() {
        let repo = MemoryRepo::new("res").with_file("/img/logo.png", vec![0u8, 1, 2]);
        let file = repo.read("/img/logo.png", "v3").await.unwrap();
        assert_eq!(repo.url(&file, "/files/"), "/files/res/img/logo.png?version=v3");
    }
}
