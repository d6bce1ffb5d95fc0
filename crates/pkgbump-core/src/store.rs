use std::{io, path::Path};

use pkgbump_manifest::Manifest;

use crate::error::RunError;

pub async fn load_manifest(path: &Path) -> Result<Manifest, RunError> {
    tracing::info!(path = %path.display(), "opening package file");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RunError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let manifest = raw.parse::<Manifest>().map_err(|source| RunError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "package file parsed");
    Ok(manifest)
}

/// Overwrites `path` with the serialized manifest and waits for the write to finish.
pub async fn save_manifest(path: &Path, manifest: &Manifest) -> Result<(), RunError> {
    let write_error = |source: io::Error| RunError::Write {
        path: path.to_path_buf(),
        source,
    };
    let json = manifest
        .to_json_string()
        .map_err(|err| write_error(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    tokio::fs::write(path, json).await.map_err(write_error)?;
    tracing::info!(path = %path.display(), "package file saved");
    Ok(())
}
