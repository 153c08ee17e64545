mod cache;
mod gate;
mod matcher;
mod paginator;

use crate::auth::Authenticator;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::photos::{ClientConnector, LibraryClient, MediaItem};
use gate::DownloadGate;
use paginator::Paginator;
use tracing::info;

#[derive(Debug)]
pub struct SyncReport {
    pub processed: usize,
    pub downloaded: Vec<MediaItem>,
    pub skipped_duplicates: usize,
    pub skipped_already_local: usize,
}

pub struct Orchestrator<'a> {
    config: &'a SyncConfig,
    authenticator: &'a dyn Authenticator,
    connector: &'a dyn ClientConnector,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a SyncConfig,
        authenticator: &'a dyn Authenticator,
        connector: &'a dyn ClientConnector,
    ) -> Self {
        Self {
            config,
            authenticator,
            connector,
        }
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let master = self.load_master().await?;

        let cleanup = self.connect(&self.config.cleanup_account).await?;
        tokio::fs::create_dir_all(&self.config.download_dir)
            .await
            .map_err(|e| SyncError::fs(&self.config.download_dir, e))?;

        info!(
            "Scanning {} account against {} master items",
            self.config.cleanup_account,
            master.len()
        );
        let mut gate = DownloadGate::new(&master, cleanup.as_ref(), &self.config.download_dir);
        let processed = Paginator::new(cleanup.as_ref(), self.config.page_size)
            .walk(&mut gate)
            .await?;

        let report = SyncReport {
            processed: processed.len(),
            skipped_duplicates: gate.skipped_duplicates(),
            skipped_already_local: gate.skipped_already_local(),
            downloaded: gate.into_downloaded(),
        };
        info!(
            "Sync finished: {} processed, {} downloaded, {} in master, {} already local",
            report.processed,
            report.downloaded.len(),
            report.skipped_duplicates,
            report.skipped_already_local
        );
        Ok(report)
    }

    async fn load_master(&self) -> Result<Vec<MediaItem>> {
        if let Some(items) = cache::read_media_items(&self.config.cache_file)? {
            return Ok(items);
        }

        let client = self.connect(&self.config.master_account).await?;
        info!("Fetching {} account media...", self.config.master_account);
        let items = Paginator::new(client.as_ref(), self.config.page_size)
            .collect_all()
            .await?;
        cache::write_media_items(&self.config.cache_file, &items)?;
        Ok(items)
    }

    async fn connect(&self, account: &str) -> Result<Box<dyn LibraryClient>> {
        info!("Authenticating {} account...", account);
        let token = self.authenticator.obtain_token(account).await?;
        self.connector.connect(token)
    }
}
