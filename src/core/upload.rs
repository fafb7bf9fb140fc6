//! Payment proof storage.
//!
//! Proofs are stored under a path namespaced by owner identity and submission
//! time, and addressed afterwards by a public URL. [`LocalArtifactStore`] writes
//! them to a directory that is expected to be served at `public_base_url`.

use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// A payment proof as received from the user.
#[derive(Debug, Clone)]
pub struct ProofArtifact {
    /// Original file name
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Largest accepted payment proof, in bytes.
pub const MAX_PROOF_BYTES: u64 = 10 * 1024 * 1024;

/// Checks a proof's declared media type and size before it is downloaded.
///
/// Any `image/*` type and PDFs are accepted. Parameters such as `; charset=..`
/// are ignored.
pub fn check_proof_attachment(content_type: Option<&str>, size: u64) -> Result<()> {
    let media_type = content_type
        .and_then(|t| t.split(';').next())
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if !(media_type.starts_with("image/") || media_type == "application/pdf") {
        return Err(Error::validation(
            "Payment proof must be an image or a PDF document",
        ));
    }
    if size == 0 {
        return Err(Error::validation("Payment proof file is empty"));
    }
    if size > MAX_PROOF_BYTES {
        return Err(Error::validation(format!(
            "Payment proof must be at most {} MB",
            MAX_PROOF_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Somewhere payment proofs can be stored and later removed.
pub trait ArtifactStore {
    /// Stores `bytes` at `path` and returns the public URL of the stored artifact.
    fn store(&self, path: &str, bytes: &[u8]) -> impl Future<Output = Result<String>> + Send;

    /// Removes the artifact at `path`. Missing artifacts are not an error.
    fn remove(&self, path: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Reduces a user-supplied file name to `[A-Za-z0-9._-]`, never empty and never a dot-path.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "proof".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Builds the storage path `{user_id}/{timestamp_millis}-{file_name}`.
#[must_use]
pub fn artifact_path(user_id: &str, timestamp_millis: i64, file_name: &str) -> String {
    format!(
        "{}/{timestamp_millis}-{}",
        sanitize_file_name(user_id),
        sanitize_file_name(file_name)
    )
}

/// Stores artifacts on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalArtifactStore {
    /// Creates a store rooted at `root`, served at `public_base_url`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::Upload {
                message: format!("invalid artifact path '{path}'"),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for LocalArtifactStore {
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Upload {
                    message: format!("failed to create {}: {e}", parent.display()),
                })?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| Error::Upload {
                message: format!("failed to write {}: {e}", target.display()),
            })?;

        tracing::debug!(path = %target.display(), size = bytes.len(), "Stored artifact");
        Ok(format!("{}/{path}", self.public_base_url))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Upload {
                message: format!("failed to remove {}: {e}", target.display()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_check_proof_attachment() {
        assert!(check_proof_attachment(Some("image/png"), 2048).is_ok());
        assert!(check_proof_attachment(Some("IMAGE/JPEG"), 2048).is_ok());
        assert!(check_proof_attachment(Some("application/pdf; qs=0.9"), MAX_PROOF_BYTES).is_ok());

        for content_type in [None, Some("text/html"), Some("application/x-msdownload"), Some("")] {
            let err = check_proof_attachment(content_type, 2048).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }));
        }

        let err = check_proof_attachment(Some("image/png"), MAX_PROOF_BYTES + 1).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        let err = check_proof_attachment(Some("image/png"), 0).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("receipt.png"), "receipt.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my receipt (1).pdf"), "my_receipt__1_.pdf");
        assert_eq!(sanitize_file_name(".."), "proof");
        assert_eq!(sanitize_file_name(""), "proof");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
    }

    #[test]
    fn test_artifact_path_is_namespaced() {
        assert_eq!(
            artifact_path("12345", 1_700_000_000_000, "proof.jpg"),
            "12345/1700000000000-proof.jpg"
        );
    }

    #[tokio::test]
    async fn test_local_store_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalArtifactStore::new(dir.path(), "https://cdn.example.com/proofs/");

        let url = store.store("user1/1-proof.png", b"png-bytes").await?;
        assert_eq!(url, "https://cdn.example.com/proofs/user1/1-proof.png");
        let written = std::fs::read(dir.path().join("user1/1-proof.png"))?;
        assert_eq!(written, b"png-bytes");

        store.remove("user1/1-proof.png").await?;
        assert!(!dir.path().join("user1/1-proof.png").exists());
        // Removing twice is fine
        store.remove("user1/1-proof.png").await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_local_store_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path(), "http://localhost");

        let result = store.store("../outside.png", b"x").await;
        assert!(matches!(result.unwrap_err(), Error::Upload { .. }));
    }
}
