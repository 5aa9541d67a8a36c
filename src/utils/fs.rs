// src/utils/fs.rs

//! File system utilities.

use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Ensure the parent directory of `path` exists.
pub async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(tmp, path).await?;
    Ok(())
}

/// Save data to a JSON file with pretty printing.
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(data)?;
    write_atomic(path, &bytes).await
}

/// Durable raw byte copy of `from` to `to`.
pub async fn copy_durable(from: &Path, to: &Path) -> Result<()> {
    let bytes = tokio::fs::read(from).await?;
    write_atomic(to, &bytes).await
}
