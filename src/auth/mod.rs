mod oauth;
mod token;

pub use oauth::OAuthAuthenticator;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Short-lived bearer token for the account saved under `account`
    async fn obtain_token(&self, account: &str) -> Result<String>;
}
