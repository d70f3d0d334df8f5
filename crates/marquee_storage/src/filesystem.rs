//! Local filesystem byte source.

use crate::{ByteSource, FileStat};
use marquee_error::{MarqueeResult, StorageError, StorageErrorKind};
use std::io::{SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Filesystem backend rooted at a directory.
///
/// Paths are resolved below the root; a leading `/` is ignored, so with the
/// root `/` absolute paths behave as usual. Parent-directory components are
/// rejected.
///
/// Writes go to a uniquely named temporary sibling first and are renamed
/// into place, so a reader never observes a half-written artifact and
/// concurrent writers of one path each publish a complete file.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// Create a new filesystem source.
    ///
    /// Creates the root directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> MarqueeResult<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::debug!(root = %root.display(), "Created filesystem source");
        Ok(Self { root })
    }

    /// Root directory of this source.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a backend path onto the local filesystem.
    fn resolve(&self, path: &str) -> MarqueeResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(path.to_string())).into());
        }
        Ok(self.root.join(relative))
    }

    fn read_error(path: &Path, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    }
}

fn persist_atomically(parent: &Path, target: &Path, data: &[u8]) -> Result<(), StorageError> {
    let write_error = |e: std::io::Error| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            target.display(),
            e
        )))
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
    temp.write_all(data).map_err(write_error)?;
    temp.persist(target).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[async_trait::async_trait]
impl ByteSource for FileSystemSource {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[tracing::instrument(skip(self))]
    async fn stat(&self, path: &str) -> MarqueeResult<FileStat> {
        let full = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&full)
            .await
            .map_err(|e| Self::read_error(&full, e))?;

        if !metadata.is_file() {
            return Err(StorageError::new(StorageErrorKind::NotFound(format!(
                "{} is not a regular file",
                full.display()
            )))
            .into());
        }

        Ok(FileStat {
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn read_range(&self, path: &str, start: u64, end: u64) -> MarqueeResult<Vec<u8>> {
        let full = self.resolve(path)?;
        let invalid_range = || {
            StorageError::new(StorageErrorKind::InvalidRange {
                path: path.to_string(),
                start,
                end,
            })
        };

        if end < start {
            return Err(invalid_range().into());
        }

        let mut file = tokio::fs::File::open(&full)
            .await
            .map_err(|e| Self::read_error(&full, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| Self::read_error(&full, e))?
            .len();
        if end > size {
            return Err(invalid_range().into());
        }

        file.seek(SeekFrom::Start(start))
            .await
            .map_err(|e| Self::read_error(&full, e))?;

        let mut buffer = vec![0u8; (end - start) as usize];
        file.read_exact(&mut buffer)
            .await
            .map_err(|e| Self::read_error(&full, e))?;

        tracing::trace!(len = buffer.len(), "Read byte range");
        Ok(buffer)
    }

    #[tracing::instrument(skip(self))]
    async fn read_all(&self, path: &str) -> MarqueeResult<Vec<u8>> {
        let full = self.resolve(path)?;
        let data = tokio::fs::read(&full)
            .await
            .map_err(|e| Self::read_error(&full, e))?;
        Ok(data)
    }

    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn write_all(&self, path: &str, data: &[u8]) -> MarqueeResult<()> {
        let full = self.resolve(path)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Unique temp file per writer, then rename into place
        let parent = full.parent().unwrap_or(&self.root).to_path_buf();
        let target = full.clone();
        let bytes = data.to_vec();
        tokio::task::spawn_blocking(move || persist_atomically(&parent, &target, &bytes))
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    full.display(),
                    e
                )))
            })??;

        tracing::debug!(path = %full.display(), size = data.len(), "Wrote file");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, path: &str) -> MarqueeResult<bool> {
        let full = self.resolve(path)?;
        tokio::fs::try_exists(&full).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                full.display(),
                e
            )))
            .into()
        })
    }
}
