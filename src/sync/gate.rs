use super::cache::staging_file;
use super::matcher;
use super::paginator::ItemProcessor;
use crate::error::{Result, SyncError};
use crate::photos::{LibraryClient, MediaItem};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    SkippedDuplicate,
    SkippedAlreadyLocal,
    Downloaded,
}

/// Local file whose existence means `item` has been downloaded
pub fn download_marker(download_dir: &Path, item: &MediaItem) -> Result<PathBuf> {
    let name = Path::new(&item.filename)
        .file_name()
        .ok_or_else(|| SyncError::InvalidFilename(item.filename.clone()))?;
    Ok(download_dir.join(name))
}

pub struct DownloadGate<'a> {
    master: &'a [MediaItem],
    client: &'a dyn LibraryClient,
    download_dir: PathBuf,
    downloaded: Vec<MediaItem>,
    skipped_duplicates: usize,
    skipped_already_local: usize,
}

impl<'a> DownloadGate<'a> {
    pub fn new(
        master: &'a [MediaItem],
        client: &'a dyn LibraryClient,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            master,
            client,
            download_dir: download_dir.into(),
            downloaded: Vec::new(),
            skipped_duplicates: 0,
            skipped_already_local: 0,
        }
    }

    pub async fn handle(&mut self, item: &MediaItem) -> Result<ItemOutcome> {
        if matcher::matches(self.master, item) {
            debug!("Skipping {}: already in master library", item.filename);
            self.skipped_duplicates += 1;
            return Ok(ItemOutcome::SkippedDuplicate);
        }

        let marker = download_marker(&self.download_dir, item)?;
        let exists = tokio::fs::try_exists(&marker)
            .await
            .map_err(|e| SyncError::fs(&marker, e))?;
        if exists {
            debug!("Skipping {}: already downloaded", item.filename);
            self.skipped_already_local += 1;
            return Ok(ItemOutcome::SkippedAlreadyLocal);
        }

        let size = self.download(item, &marker).await?;
        info!(
            "Downloaded {} to {} ({} bytes)",
            item.filename,
            marker.display(),
            size
        );
        self.downloaded.push(item.clone());
        Ok(ItemOutcome::Downloaded)
    }

    async fn download(&self, item: &MediaItem, dest: &Path) -> Result<u64> {
        let mut stream = self.client.fetch_item_bytes(item).await?;

        let tmp = staging_file(&self.download_dir)
            .map_err(|e| SyncError::fs(&self.download_dir, e))?;
        let std_file = tmp.reopen().map_err(|e| SyncError::fs(tmp.path(), e))?;
        let mut file = tokio::fs::File::from_std(std_file);

        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| SyncError::fs(tmp.path(), e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| SyncError::fs(tmp.path(), e))?;
        file.sync_all()
            .await
            .map_err(|e| SyncError::fs(tmp.path(), e))?;
        drop(file);

        tmp.persist(dest).map_err(|e| SyncError::fs(dest, e.error))?;
        Ok(written)
    }

    #[cfg(test)]
    pub fn downloaded(&self) -> &[MediaItem] {
        &self.downloaded
    }

    pub fn skipped_duplicates(&self) -> usize {
        self.skipped_duplicates
    }

    pub fn skipped_already_local(&self) -> usize {
        self.skipped_already_local
    }

    pub fn into_downloaded(self) -> Vec<MediaItem> {
        self.downloaded
    }
}

#[async_trait]
impl ItemProcessor for DownloadGate<'_> {
    async fn process(&mut self, item: &MediaItem) -> Result<()> {
        self.handle(item).await.map(|_| ())
    }
}
