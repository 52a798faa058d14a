//! On-disk model and scaler artifacts.
//!
//! Artifacts are opaque byte blobs to this crate; the inference backend
//! that consumes them decides the format. Loading keeps the source path
//! for diagnostics.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A trained model artifact read from disk.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    path: PathBuf,
    bytes: Vec<u8>,
}

/// A fitted feature scaler artifact read from disk.
#[derive(Debug, Clone)]
pub struct ScalerArtifact {
    path: PathBuf,
    bytes: Vec<u8>,
}

fn read_artifact(path: &Path, kind: &str) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {kind} artifact: {}", path.display()))?;
    debug!(path = %path.display(), size = bytes.len(), kind, "Artifact loaded");
    Ok(bytes)
}

impl ModelArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            bytes: read_artifact(path, "model")?,
            path: path.to_path_buf(),
        })
    }

    /// Build an in-memory artifact (tests, embedded defaults).
    pub fn from_bytes(label: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: label.into(),
            bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ScalerArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            bytes: read_artifact(path, "scaler")?,
            path: path.to_path_buf(),
        })
    }

    pub fn from_bytes(label: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: label.into(),
            bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(ext: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("sevencast_test_artifact_{}.{ext}", uuid::Uuid::new_v4()));
        p
    }

    #[test]
    fn test_load_model_artifact() {
        let path = temp_path("pt");
        std::fs::write(&path, b"model-bytes").unwrap();

        let artifact = ModelArtifact::load(&path).unwrap();
        assert_eq!(artifact.bytes(), b"model-bytes");
        assert_eq!(artifact.path(), path.as_path());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_scaler_artifact() {
        let path = temp_path("pkl");
        std::fs::write(&path, b"scaler-bytes").unwrap();

        let artifact = ScalerArtifact::load(&path).unwrap();
        assert_eq!(artifact.bytes(), b"scaler-bytes");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_artifact_fails() {
        let err = ModelArtifact::load(Path::new("/tmp/sevencast_no_such_model.pt")).unwrap_err();
        assert!(err.to_string().contains("model artifact"));
    }

    #[test]
    fn test_from_bytes() {
        let artifact = ScalerArtifact::from_bytes("inline", vec![1, 2, 3]);
        assert_eq!(artifact.bytes(), &[1, 2, 3]);
    }
}
