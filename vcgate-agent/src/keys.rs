//! Key loading at startup.
//!
//! A key location is either a filesystem path or an `http://` / `https://`
//! URL. URLs are fetched once and written into the key cache directory, then
//! loaded from there like any other file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use vcgate_domain::{PrivateKey, PublicKey, VcError};

// ---

#[derive(Debug, Error)]
pub enum KeyError {
    // ---
    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: VcError,
    },
}

// ---

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

// ---

/// Turn a key location into a local path, downloading it first if needed.
async fn resolve(location: &str, cache_dir: &Path, cache_name: &str) -> Result<PathBuf, KeyError> {
    // ---
    if !is_url(location) {
        return Ok(PathBuf::from(location));
    }

    let download = |source| KeyError::Download {
        url: location.to_owned(),
        source,
    };
    let bytes = reqwest::get(location)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(download)?
        .bytes()
        .await
        .map_err(download)?;

    let path = cache_dir.join(cache_name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| KeyError::Write {
            path: path.clone(),
            source,
        })?;

    info!(url = location, path = %path.display(), "key downloaded");
    Ok(path)
}

// ---

async fn read_pem(path: &Path) -> Result<String, KeyError> {
    // ---
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KeyError::Read {
            path: path.to_owned(),
            source,
        })
}

// ---

pub async fn load_private_key(location: &str, cache_dir: &Path) -> Result<PrivateKey, KeyError> {
    // ---
    let path = resolve(location, cache_dir, "vcgate-private.pem").await?;
    let pem = read_pem(&path).await?;
    PrivateKey::from_pem(&pem).map_err(|source| KeyError::Invalid { path, source })
}

// ---

pub async fn load_public_key(location: &str, cache_dir: &Path) -> Result<PublicKey, KeyError> {
    // ---
    let path = resolve(location, cache_dir, "vcgate-public.pem").await?;
    let pem = read_pem(&path).await?;
    PublicKey::from_pem(&pem).map_err(|source| KeyError::Invalid { path, source })
}

// ---
