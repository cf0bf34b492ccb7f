//! Upload storage on the local filesystem
//!
//! Files land in `<save_path>/<YYYY-MM-DD>/<uuid><ext>` and are served
//! read-only under `/uploads`. The extension check is case-insensitive and
//! the stored name always uses the lowercase extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File too large, the limit is {max_mb}MB")]
    TooLarge { max_mb: u64 },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// The `upload` section of the server config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub save_path: PathBuf,
    pub max_size_mb: u64,

    /// Lowercase, with the leading dot
    pub allowed_exts: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("./uploads"),
            max_size_mb: 10,
            allowed_exts: [".jpg", ".jpeg", ".png", ".gif", ".webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl UploadConfig {
    pub fn max_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Where a stored file ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// Relative to the upload root, always `/`-separated
    pub path: String,

    /// Public URL of the file
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    config: UploadConfig,
    public_base_url: String,
}

impl UploadStore {
    pub fn new(config: UploadConfig, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            config,
            public_base_url,
        }
    }

    /// Directory served under `/uploads`
    pub fn root(&self) -> &Path {
        &self.config.save_path
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Validates and writes an uploaded file
    ///
    /// # Errors
    ///
    /// - `TooLarge` if `bytes` exceeds `max_size_mb`
    /// - `UnsupportedType` if the extension isn't allow-listed
    /// - `Io` if the date directory or the file can't be written
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        if bytes.len() as u64 > self.config.max_bytes() {
            return Err(UploadError::TooLarge {
                max_mb: self.config.max_size_mb,
            });
        }

        let ext = extension(filename);
        if !self.config.allowed_exts.iter().any(|allowed| *allowed == ext) {
            return Err(UploadError::UnsupportedType(ext));
        }

        let date_dir = chrono::Local::now().format("%Y-%m-%d").to_string();
        let name = format!("{}{}", uuid::Uuid::new_v4(), ext);

        let dir = self.config.save_path.join(&date_dir);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), bytes).await?;

        let path = format!("{date_dir}/{name}");
        tracing::info!(path = %path, size = bytes.len(), "File uploaded");

        Ok(StoredFile {
            url: format!("{}/uploads/{}", self.public_base_url, path),
            path,
        })
    }
}

/// Lowercased extension including the dot, or empty
fn extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path, max_size_mb: u64) -> UploadStore {
        UploadStore::new(
            UploadConfig {
                save_path: root.to_path_buf(),
                max_size_mb,
                ..Default::default()
            },
            "http://localhost:8080/",
        )
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("photo.JPG"), ".jpg");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("README"), "");
        assert_eq!(extension(".hidden"), "");
    }

    #[tokio::test]
    async fn test_save_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = store(dir.path(), 1);

        let stored = uploads.save("Cat.PNG", b"not really a png").await.unwrap();

        let (date, name) = stored.path.split_once('/').unwrap();
        assert_eq!(date.len(), "2025-01-01".len());
        assert!(name.ends_with(".png"));
        assert_eq!(stored.url, format!("http://localhost:8080/uploads/{}", stored.path));

        let written = tokio::fs::read(dir.path().join(date).join(name)).await.unwrap();
        assert_eq!(written, b"not really a png");
    }

    #[tokio::test]
    async fn test_save_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = store(dir.path(), 1);

        assert!(matches!(
            uploads.save("script.exe", b"MZ").await,
            Err(UploadError::UnsupportedType(ext)) if ext == ".exe"
        ));
        assert!(matches!(
            uploads.save("noext", b"x").await,
            Err(UploadError::UnsupportedType(_))
        ));

        let big = vec![0u8; 1024 * 1024 + 1];
        assert!(matches!(
            uploads.save("big.png", &big).await,
            Err(UploadError::TooLarge { max_mb: 1 })
        ));
    }
}
