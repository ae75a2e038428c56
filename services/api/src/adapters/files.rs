//! services/api/src/adapters/files.rs
//!
//! Local-disk implementation of the `FileStorageService` port. Files land in the
//! configured upload directory and are served back under the `uploads/` route.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bookshelf_core::ports::{FileStorageService, PortError, PortResult};
use tokio::io::AsyncWriteExt;
use tracing::error;

/// The public path prefix uploaded files are served from.
pub const UPLOADS_ROUTE: &str = "uploads";

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Creates the store, making sure the upload directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn disk_path(&self, file_name: &str) -> PortResult<PathBuf> {
        let is_plain_name = !file_name.is_empty()
            && !file_name.contains(['/', '\\'])
            && file_name != "."
            && file_name != "..";
        if !is_plain_name {
            return Err(PortError::Unexpected(format!(
                "Refusing to store file under {:?}",
                file_name
            )));
        }
        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl FileStorageService for LocalFileStore {
    async fn store_file(&self, file_name: &str, data: &[u8]) -> PortResult<String> {
        let path = self.disk_path(file_name)?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| PortError::Unexpected(format!("{}: {}", path.display(), e)))?;

        let written: std::io::Result<()> = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            discard_partial(&path).await;
            return Err(PortError::Unexpected(format!("{}: {}", path.display(), e)));
        }

        Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
    }

    async fn remove_file(&self, public_path: &str) -> PortResult<()> {
        let file_name = public_path
            .strip_prefix(UPLOADS_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| PortError::NotFound(public_path.to_string()))?;
        let path = self.disk_path(file_name)?;

        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PortError::NotFound(public_path.to_string()),
            _ => PortError::Unexpected(e.to_string()),
        })
    }
}

/// Removes a partially written upload. Returns whether a file was removed.
async fn discard_partial(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to remove partial upload {}: {}", path.display(), e);
            false
        }
    }
}
