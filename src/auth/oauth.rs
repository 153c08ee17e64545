use super::token::{now_ms, InstalledCredentials, StoredToken, TokenErrorResponse, TokenResponse};
use super::Authenticator;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use url::Url;

const SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.readonly";

pub struct OAuthAuthenticator {
    http: reqwest::Client,
    credentials_file: PathBuf,
    token_dir: PathBuf,
}

impl OAuthAuthenticator {
    pub fn new(credentials_file: impl Into<PathBuf>, token_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials_file: credentials_file.into(),
            token_dir: token_dir.into(),
        }
    }

    pub fn token_path(&self, account: &str) -> PathBuf {
        self.token_dir.join(format!("token{account}.json"))
    }

    async fn authorize(
        &self,
        creds: &InstalledCredentials,
        token_path: &Path,
    ) -> Result<StoredToken> {
        if let Some(stored) = StoredToken::read(token_path)? {
            if stored.is_fresh(now_ms()) {
                info!("Existing token found. Reusing...");
                return Ok(stored);
            }
            if let Some(refresh_token) = stored.refresh_token.clone() {
                info!("Existing token expired. Refreshing...");
                let refreshed = self.refresh(creds, &refresh_token).await?;
                refreshed.write(token_path)?;
                return Ok(refreshed);
            }
            info!("Existing token cannot be refreshed");
        }

        let code = prompt_for_code(&consent_url(creds)?).await?;
        let token = self.exchange_code(creds, &code).await?;
        token.write(token_path)?;
        info!("Token stored at {}", token_path.display());
        Ok(token)
    }

    async fn refresh(
        &self,
        creds: &InstalledCredentials,
        refresh_token: &str,
    ) -> Result<StoredToken> {
        let response = self
            .token_request(
                creds,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;
        Ok(response.into_stored(now_ms(), Some(refresh_token.to_string())))
    }

    async fn exchange_code(
        &self,
        creds: &InstalledCredentials,
        code: &str,
    ) -> Result<StoredToken> {
        let response = self
            .token_request(
                creds,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", creds.redirect_uri()?),
                ],
            )
            .await?;
        Ok(response.into_stored(now_ms(), None))
    }

    async fn token_request(
        &self,
        creds: &InstalledCredentials,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &creds.client_id)
            .append_pair("client_secret", &creds.client_secret)
            .extend_pairs(params)
            .finish();

        debug!("Requesting token from {}", creds.token_uri);
        let response = self
            .http
            .post(&creds.token_uri)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<TokenResponse>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let reason = match serde_json::from_str::<TokenErrorResponse>(&text) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => format!("HTTP {}", status),
        };
        Err(SyncError::Auth(format!("Token request failed: {reason}")))
    }
}

fn consent_url(creds: &InstalledCredentials) -> Result<Url> {
    Url::parse_with_params(
        &creds.auth_uri,
        &[
            ("access_type", "offline"),
            ("scope", SCOPE),
            ("response_type", "code"),
            ("client_id", creds.client_id.as_str()),
            ("redirect_uri", creds.redirect_uri()?),
        ],
    )
    .map_err(|e| SyncError::Auth(format!("Invalid auth_uri {}: {}", creds.auth_uri, e)))
}

async fn prompt_for_code(auth_url: &Url) -> Result<String> {
    let prompt = format!(
        "\nAuthorize this app by visiting:\n  {auth_url}\n\nEnter the code from that page: "
    );
    write_prompt(&prompt)
        .await
        .map_err(|e| SyncError::Auth(format!("Could not write to stdout: {e}")))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let code = lines
        .next_line()
        .await
        .map_err(|e| SyncError::Auth(format!("Could not read authorization code: {e}")))?
        .unwrap_or_default();

    let code = code.trim();
    if code.is_empty() {
        return Err(SyncError::Auth("No authorization code entered".to_string()));
    }
    Ok(code.to_string())
}

async fn write_prompt(prompt: &str) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await
}

#[async_trait]
impl Authenticator for OAuthAuthenticator {
    async fn obtain_token(&self, account: &str) -> Result<String> {
        let creds = InstalledCredentials::load(&self.credentials_file)?;
        let token = self.authorize(&creds, &self.token_path(account)).await?;

        if token.access_token.is_empty() {
            return Err(SyncError::Auth(format!(
                "Could not obtain {account} access token"
            )));
        }
        Ok(token.access_token)
    }
}
