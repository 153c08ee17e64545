use crate::error::{Result, SyncError};
use crate::photos::MediaItem;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Hidden `.part` file in `dir`, created with the same mode a plain write would get
pub(crate) fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

pub fn read_media_items(path: &Path) -> Result<Option<Vec<MediaItem>>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No cache at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(SyncError::fs(path, e)),
    };

    let items = serde_json::from_str::<Vec<MediaItem>>(&data).map_err(|source| {
        SyncError::CacheCorruption {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!("Loaded {} cached items from {}", items.len(), path.display());
    Ok(Some(items))
}

pub fn write_media_items(path: &Path, items: &[MediaItem]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| SyncError::fs(dir, e))?;

    let json = serde_json::to_string_pretty(items).map_err(|e| SyncError::fs(path, e.into()))?;

    let mut tmp = staging_file(dir).map_err(|e| SyncError::fs(dir, e))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| SyncError::fs(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| SyncError::fs(path, e.error))?;

    info!("Saved {} items to {}", items.len(), path.display());
    Ok(())
}
