// JSON documents on disk: tolerant reads and atomic writes

use std::{ffi::OsString, io::ErrorKind, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Reads and parses a JSON file. A missing file is `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw: Vec<u8> = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let value: T = serde_json::from_slice(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    Ok(Some(value))
}

/// Writes `<path>.tmp` then renames it over `path`, so readers never see a partial file
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body: Vec<u8> = serde_json::to_vec(value).context("Failed to serialize JSON document")?;
    let temp_path: PathBuf = temp_path_for(path);

    tokio::fs::write(&temp_path, &body)
        .await
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;

    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let found: Option<HashMap<String, f64>> = read_json(&dir.path().join("nope.json")).await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn atomic_write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        tokio::fs::write(&path, b"old").await.unwrap();

        let doc: HashMap<String, f64> = [("AAA".to_string(), 1.5)].into_iter().collect();
        write_json_atomic(&path, &doc).await.unwrap();

        let back: HashMap<String, f64> = read_json(&path).await.unwrap().unwrap();
        assert_eq!(back, doc);
        assert!(!dir.path().join("doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, b"{").await.unwrap();

        assert!(read_json::<HashMap<String, f64>>(&path).await.is_err());
    }
}
