use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::PlError;

mod fs;
mod memory;

pub use fs::FsRepo;
pub use memory::MemoryRepo;

/// Prefix of minted URLs unless the compiler options name another one.
pub const DEFAULT_URL_PREFIX: &str = "/api/v1/files";

/// Identity of one file at one version, as returned by [`Repo::read`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub resource: String,
    pub version: String,
    pub abspath: String,
}

/// Storage the compiler reads PL sources and copied files from.
///
/// `read` locates a file and `content` fetches its bytes; the split lets
/// `@copyurl` mint a URL without loading the file. Implementations own any
/// caching and concurrency control of the underlying storage.
#[async_trait]
pub trait Repo: Send + Sync {
    async fn read(&self, path: &str, version: &str) -> Result<FileDescriptor, PlError>;

    async fn content(&self, file: &FileDescriptor) -> Result<Vec<u8>, PlError>;

    /// Public URL of a file under `prefix`, used by `@copyurl`.
    fn url(&self, file: &FileDescriptor, prefix: &str) -> String;
}

#[async_trait]
impl<R: Repo + ?Sized> Repo for Arc<R> {
    async fn read(&self, path: &str, version: &str) -> Result<FileDescriptor, PlError> {
        (**self).read(path, version).await
    }

    async fn content(&self, file: &FileDescriptor) -> Result<Vec<u8>, PlError> {
        (**self).content(file).await
    }

    fn url(&self, file: &FileDescriptor, prefix: &str) -> String {
        (**self).url(file, prefix)
    }
}

/// Reads a file and decodes it as UTF-8 PL source.
pub async fn read_source(
    repo: &dyn Repo,
    path: &str,
    version: &str,
) -> Result<(FileDescriptor, String), PlError> {
    let file = repo.read(path, version).await?;
    let bytes = repo.content(&file).await?;
    let text = String::from_utf8(bytes).map_err(|_| {
        PlError::file("File is not valid UTF-8", file.abspath.clone(), 303)
            .with_hint("PL sources must be UTF-8 text")
    })?;
    Ok((file, text))
}

pub(crate) fn mint_url(prefix: &str, file: &FileDescriptor) -> String {
    format!(
        "{}/{}{}?version={}",
        prefix.trim_end_matches('/'),
        file.resource,
        file.abspath,
        file.version
    )
}
