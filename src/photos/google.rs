use super::{
    client::{ByteStream, ClientConnector, LibraryClient},
    types::{ErrorEnvelope, MediaItem, MediaItemsPage},
};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use tracing::debug;
use url::Url;

pub struct GooglePhotosClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl GooglePhotosClient {
    pub fn new(base_url: Url, token: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("photo-cleanup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    async fn get(&self, url: impl reqwest::IntoUrl) -> Result<reqwest::Response> {
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }
}

async fn api_error(response: reqwest::Response) -> SyncError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => SyncError::RemoteApi {
            code: envelope.error.code,
            message: envelope.error.message,
            status: envelope.error.status,
        },
        Err(_) => SyncError::RemoteApi {
            code: status.as_u16(),
            message: body.trim().to_string(),
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_string(),
        },
    }
}

#[async_trait]
impl LibraryClient for GooglePhotosClient {
    async fn list_page(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MediaItemsPage> {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        debug!("Listing media items: {}", url);
        let page = self.get(url).await?.json::<MediaItemsPage>().await?;
        Ok(page)
    }

    async fn fetch_item_bytes(&self, item: &MediaItem) -> Result<ByteStream> {
        debug!("Fetching {} ({})", item.filename, item.mime_type);
        let response = self.get(item.download_url()).await?;

        Ok(response.bytes_stream().map_err(SyncError::from).boxed())
    }
}

pub struct GooglePhotosConnector {
    base_url: Url,
}

impl GooglePhotosConnector {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl ClientConnector for GooglePhotosConnector {
    fn connect(&self, token: String) -> Result<Box<dyn LibraryClient>> {
        Ok(Box::new(GooglePhotosClient::new(
            self.base_url.clone(),
            token,
        )?))
    }
}
