//! Staging-file persistence.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use rget_fs::{DirOptions, PromoteOptions};
use tokio::io::AsyncWriteExt;

use crate::data::DownloadTarget;
use crate::error::{Error, Result};

/// Appends received bytes to `<destination>.<ext>` and promotes that file
/// to the destination once the download is complete.
///
/// While a download is partial the staging file only ever grows. The
/// destination is written exactly once: by [`finalize`](Self::finalize) or
/// by [`write_whole`](Self::write_whole).
#[derive(Debug, Clone)]
pub struct PartialFileWriter {
    destination: PathBuf,
    partial:     PathBuf,
    dir_options: DirOptions,
}

impl PartialFileWriter {
    pub fn new(target: &DownloadTarget) -> Self {
        Self::from_paths(target.destination.clone(), target.partial.clone())
    }

    pub fn from_paths(destination: impl Into<PathBuf>, partial: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            partial:     partial.into(),
            dir_options: DirOptions::default(),
        }
    }

    pub fn destination(&self) -> &Path { &self.destination }

    pub fn partial(&self) -> &Path { &self.partial }

    /// Current size of the staging file, 0 if it does not exist. Read from
    /// disk on every call.
    pub fn persisted_len(&self) -> Result<u64> { Ok(rget_fs::file_len(&self.partial)?) }

    pub async fn append(&self, bytes: &[u8]) -> Result<()> {
        self.append_stream(futures_util::stream::iter([Ok::<_, std::io::Error>(
            Bytes::copy_from_slice(bytes),
        )]))
        .await
        .map(|_| ())
    }

    /// Appends every chunk of `body` to the staging file and syncs it.
    ///
    /// If the stream fails part way, the chunks already written are synced
    /// and kept, and the stream error is returned as
    /// [`Error::Connection`].
    pub async fn append_stream<S, E>(&self, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: std::error::Error,
    {
        let file = rget_fs::open_append(&self.partial, self.dir_options)?;
        let mut file = tokio::fs::File::from_std(file);
        let written = self.drain_into(&mut file, &self.partial, body).await;
        self.sync(&mut file, &self.partial).await?;
        written
    }

    /// Promotes the staging file to the destination with a single rename.
    ///
    /// The rename may back off and retry, so it runs on the blocking pool.
    pub async fn finalize(&self) -> Result<()> {
        let partial = self.partial.clone();
        let destination = self.destination.clone();
        let promoted = tokio::task::spawn_blocking(move || {
            rget_fs::promote(&partial, &destination, PromoteOptions::default())
        })
        .await
        .map_err(|e| rget_fs::Error::Rename {
            from:   self.partial.clone(),
            to:     self.destination.clone(),
            source: std::io::Error::other(e),
        })?;
        promoted?;

        tracing::debug!(
            partial = %self.partial.display(),
            destination = %self.destination.display(),
            "promoted staging file"
        );
        Ok(())
    }

    /// Removes the staging file if present. Failures are logged, never
    /// returned.
    pub fn discard(&self) -> bool {
        match rget_fs::remove_if_exists(&self.partial) {
            Ok(removed) => {
                if removed {
                    tracing::debug!(partial = %self.partial.display(), "discarded staging file");
                }
                removed
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to discard staging file");
                false
            }
        }
    }

    /// Writes `body` straight to the destination in one pass, truncating
    /// anything already there.
    pub async fn write_whole<S, E>(&self, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: std::error::Error,
    {
        let file = rget_fs::open_truncate(&self.destination, self.dir_options)?;
        let mut file = tokio::fs::File::from_std(file);
        let written = self.drain_into(&mut file, &self.destination, body).await;
        self.sync(&mut file, &self.destination).await?;
        written
    }

    async fn drain_into<S, E>(&self, file: &mut tokio::fs::File, path: &Path, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: std::error::Error,
    {
        let mut body = std::pin::pin!(body);
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| Error::Connection(e.to_string()))?;
            file.write_all(&chunk).await.map_err(|source| rget_fs::Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
            written += chunk.len() as u64;
        }

        Ok(written)
    }

    async fn sync(&self, file: &mut tokio::fs::File, path: &Path) -> Result<()> {
        let write_err = |source| rget_fs::Error::Write {
            path: path.to_path_buf(),
            source,
        };
        file.flush().await.map_err(write_err)?;
        file.sync_data().await.map_err(write_err)?;
        Ok(())
    }
}
