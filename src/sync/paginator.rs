use crate::error::Result;
use crate::photos::{LibraryClient, MediaItem};
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
pub trait ItemProcessor: Send {
    async fn process(&mut self, item: &MediaItem) -> Result<()>;
}

struct Collect;

#[async_trait]
impl ItemProcessor for Collect {
    async fn process(&mut self, _item: &MediaItem) -> Result<()> {
        Ok(())
    }
}

pub struct Paginator<'a> {
    client: &'a dyn LibraryClient,
    page_size: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a dyn LibraryClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// Fetch every page and run `processor` on each item before requesting the next page.
    ///
    /// Returns the items in the order they were processed. The first error from
    /// the client or the processor ends the walk; whatever the processor already
    /// did stays done.
    pub async fn walk<P>(&self, processor: &mut P) -> Result<Vec<MediaItem>>
    where
        P: ItemProcessor + ?Sized,
    {
        let mut processed = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_num = 1;

        loop {
            info!("Fetching page {}...", page_num);
            let page = self
                .client
                .list_page(self.page_size, page_token.as_deref())
                .await?;
            let next = page.continuation().map(str::to_string);
            debug!(
                "Page {} returned {} items, next token: {:?}",
                page_num,
                page.media_items.len(),
                next
            );

            for item in page.media_items {
                processor.process(&item).await?;
                processed.push(item);
            }

            match next {
                Some(token) => {
                    page_token = Some(token);
                    page_num += 1;
                }
                None => break,
            }
        }

        info!("Processed {} items across {} pages", processed.len(), page_num);
        Ok(processed)
    }

    pub async fn collect_all(&self) -> Result<Vec<MediaItem>> {
        let items = self.walk(&mut Collect).await?;
        info!("Fetched {} items!", items.len());
        Ok(items)
    }
}
