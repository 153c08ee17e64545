use super::types::{MediaItem, MediaItemsPage};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Chunks of an item's original bytes, in order
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

#[async_trait]
pub trait LibraryClient: Send + Sync {
    /// Fetch one page of the library, starting after `page_token` if given
    async fn list_page(&self, page_size: u32, page_token: Option<&str>)
        -> Result<MediaItemsPage>;

    /// Open the item's content, picking the image or video variant from its MIME type
    async fn fetch_item_bytes(&self, item: &MediaItem) -> Result<ByteStream>;
}

pub trait ClientConnector: Send + Sync {
    fn connect(&self, token: String) -> Result<Box<dyn LibraryClient>>;
}
