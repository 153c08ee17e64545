use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the recorded expiry
const EXPIRY_MARGIN_MS: u64 = 60_000;

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: InstalledCredentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl InstalledCredentials {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Auth(format!(
                "Could not read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: CredentialsFile = serde_json::from_str(&data).map_err(|e| {
            SyncError::Auth(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.installed)
    }

    pub fn redirect_uri(&self) -> Result<&str> {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .ok_or_else(|| SyncError::Auth("Credentials file has no redirect_uris".to_string()))
    }
}

/// Token file contents, laid out like google-auth-library so old token files keep working
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl StoredToken {
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry_date {
            Some(expiry) => expiry > now_ms + EXPIRY_MARGIN_MS,
            None => true,
        }
    }

    pub fn read(path: &Path) -> Result<Option<Self>> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::fs(path, e)),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| SyncError::Auth(format!("Invalid token file {}: {}", path.display(), e)))
    }

    /// Replace the token file, owner-only
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).map_err(|e| SyncError::fs(path, e.into()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // NamedTempFile is created 0600
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SyncError::fs(dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SyncError::fs(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| SyncError::fs(path, e.error))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    pub fn into_stored(self, now_ms: u64, previous_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
            scope: self.scope,
            token_type: self.token_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"installed":{"client_id":"id","client_secret":"secret","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();

        let creds = InstalledCredentials::load(&path).unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(creds.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(creds.redirect_uri().unwrap(), "http://localhost");
    }

    #[test]
    fn test_missing_credentials_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = InstalledCredentials::load(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, SyncError::Auth(_)));
    }

    #[test]
    fn test_freshness() {
        let now = 1_700_000_000_000;
        let mut token = StoredToken {
            access_token: "ya29".to_string(),
            expiry_date: Some(now + 3_600_000),
            ..Default::default()
        };
        assert!(token.is_fresh(now));

        token.expiry_date = Some(now + 30_000);
        assert!(!token.is_fresh(now));

        token.expiry_date = None;
        assert!(token.is_fresh(now));

        token.access_token.clear();
        assert!(!token.is_fresh(now));
    }

    #[test]
    fn test_reads_node_style_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenmaster.json");
        std::fs::write(
            &path,
            r#"{"access_token":"ya29.a0","refresh_token":"1//0g","scope":"https://www.googleapis.com/auth/photoslibrary.readonly","token_type":"Bearer","expiry_date":1700000000000}"#,
        )
        .unwrap();

        let token = StoredToken::read(&path).unwrap().unwrap();
        assert_eq!(token.refresh_token.as_deref(), Some("1//0g"));
        assert_eq!(token.expiry_date, Some(1_700_000_000_000));
        assert!(StoredToken::read(&dir.path().join("tokencleanup.json"))
            .unwrap()
            .is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenmaster.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let token = StoredToken {
            access_token: "ya29".to_string(),
            refresh_token: Some("1//0g".to_string()),
            ..Default::default()
        };
        token.write(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(StoredToken::read(&path).unwrap(), Some(token));
    }

    #[test]
    fn test_refresh_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            expires_in: Some(3599),
            refresh_token: None,
            scope: None,
            token_type: Some("Bearer".to_string()),
        };
        let stored = response.into_stored(1_000, Some("old-refresh".to_string()));
        assert_eq!(stored.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(stored.expiry_date, Some(1_000 + 3_599_000));
    }
}
