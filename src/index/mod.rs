//! Embedding index persistence.
//!
//! The catalog embedding matrix is persisted as a single binary file: a
//! fixed header (magic, format version, row count, dimension count, catalog
//! fingerprint) followed by the row-major `f32` little-endian payload. Row
//! `i` of the matrix is the embedding of catalog item `i` — that alignment
//! is the load-bearing invariant of the whole pipeline, so
//! [`EmbeddingIndex::load_aligned`] re-checks it on every load.
//!
//! Rebuilds replace the file wholesale via a temp-file + rename, so a
//! concurrent reader never observes a half-written index.

use ndarray::Array2;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::embedding::EmbeddingProvider;

/// Result alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

const MAGIC: [u8; 4] = *b"SLIX";
const FORMAT_VERSION: u32 = 1;
/// magic + version + rows + dims + fingerprint
const HEADER_LEN: usize = 20;

/// Errors raised while persisting or loading the embedding index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding index unavailable at {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Catalog length and matrix row count disagree. Proceeding would return
    /// the wrong items for the right scores, so this is always fatal.
    #[error("catalog has {items} items but embedding index has {rows} rows; run `shortlist index build`")]
    ShapeMismatch { items: usize, rows: usize },
    /// The catalog source changed since the index was built.
    #[error("embedding index was built from a different catalog (stored fingerprint {stored:#010x}, current {current:#010x}); run `shortlist index build`")]
    StaleIndex { stored: u32, current: u32 },
    #[error("corrupt embedding index: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A loaded index: the embedding matrix plus the catalog fingerprint it was
/// built from.
#[derive(Debug, Clone)]
pub struct StoredIndex {
    pub matrix: Array2<f32>,
    pub fingerprint: u32,
}

/// Handle to the on-disk embedding index file.
pub struct EmbeddingIndex {
    path: PathBuf,
}

impl EmbeddingIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the full matrix, replacing any prior content atomically
    /// (write to temp file, then rename over the destination).
    pub fn save(&self, matrix: &Array2<f32>, catalog_fingerprint: u32) -> Result<()> {
        let rows = u32::try_from(matrix.nrows())
            .map_err(|_| IndexError::Corrupt("row count exceeds u32".into()))?;
        let dims = u32::try_from(matrix.ncols())
            .map_err(|_| IndexError::Corrupt("dimension count exceeds u32".into()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(&MAGIC)?;
        file.write_all(&FORMAT_VERSION.to_le_bytes())?;
        file.write_all(&rows.to_le_bytes())?;
        file.write_all(&dims.to_le_bytes())?;
        file.write_all(&catalog_fingerprint.to_le_bytes())?;

        // Row-major f32 LE payload. `iter()` walks the standard layout in
        // row-major order.
        let mut payload = Vec::with_capacity(matrix.len() * 4);
        for &value in matrix.iter() {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        file.write_all(&payload)?;
        file.flush()?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            rows,
            dims,
            fingerprint = catalog_fingerprint,
            "embedding index saved"
        );
        Ok(())
    }

    /// Load the matrix and stored fingerprint from disk.
    pub fn load(&self) -> Result<StoredIndex> {
        let bytes =
            std::fs::read(&self.path).map_err(|source| IndexError::SourceUnavailable {
                path: self.path.clone(),
                source,
            })?;
        decode(&bytes)
    }

    /// Load the matrix and fail unless it is aligned with `catalog`.
    ///
    /// Checks, in order: row count == catalog length (a mismatch would
    /// silently corrupt all downstream rankings), then the stored catalog
    /// fingerprint (a same-length catalog edit is just as corrupting).
    pub fn load_aligned(&self, catalog: &Catalog) -> Result<Array2<f32>> {
        let stored = self.load()?;
        if stored.matrix.nrows() != catalog.len() {
            return Err(IndexError::ShapeMismatch {
                items: catalog.len(),
                rows: stored.matrix.nrows(),
            });
        }
        if stored.fingerprint != catalog.fingerprint() {
            return Err(IndexError::StaleIndex {
                stored: stored.fingerprint,
                current: catalog.fingerprint(),
            });
        }
        Ok(stored.matrix)
    }
}

fn decode(bytes: &[u8]) -> Result<StoredIndex> {
    let header = bytes
        .get(..HEADER_LEN)
        .ok_or_else(|| IndexError::Corrupt("truncated header".into()))?;

    if header[..4] != MAGIC {
        return Err(IndexError::Corrupt("bad magic".into()));
    }
    let version = read_u32(&header[4..8]);
    if version != FORMAT_VERSION {
        return Err(IndexError::Corrupt(format!(
            "unsupported format version {version}"
        )));
    }
    let rows = read_u32(&header[8..12]) as usize;
    let dims = read_u32(&header[12..16]) as usize;
    let fingerprint = read_u32(&header[16..20]);

    let payload = &bytes[HEADER_LEN..];
    let expected = rows
        .checked_mul(dims)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| IndexError::Corrupt("matrix shape overflows".into()))?;
    if payload.len() != expected {
        return Err(IndexError::Corrupt(format!(
            "payload is {} bytes, expected {expected} for {rows}x{dims}",
            payload.len()
        )));
    }

    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let matrix = Array2::from_shape_vec((rows, dims), data)
        .map_err(|e| IndexError::Corrupt(format!("shape error: {e}")))?;

    Ok(StoredIndex {
        matrix,
        fingerprint,
    })
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Rebuild the index from scratch: derive the embedding text for every
/// catalog item, batch-encode all of them in one provider call, and persist
/// the matrix. There is no incremental path — any catalog change means a
/// full rebuild.
pub fn build(
    catalog: &Catalog,
    provider: &dyn EmbeddingProvider,
    index: &EmbeddingIndex,
) -> anyhow::Result<Array2<f32>> {
    use anyhow::Context;

    let texts: Vec<&str> = catalog
        .items()
        .iter()
        .map(|item| item.embedding_text())
        .collect();

    let embeddings = provider
        .embed_batch(&texts)
        .context("failed to encode catalog texts")?;

    let dims = provider.dimensions();
    let mut flat = Vec::with_capacity(embeddings.len() * dims);
    for (i, embedding) in embeddings.iter().enumerate() {
        anyhow::ensure!(
            embedding.len() == dims,
            "embedding {i} has {} dimensions, expected {dims}",
            embedding.len()
        );
        flat.extend_from_slice(embedding);
    }
    let matrix = Array2::from_shape_vec((embeddings.len(), dims), flat)
        .context("failed to assemble embedding matrix")?;

    index.save(&matrix, catalog.fingerprint())?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(b"NOPE");
        assert!(matches!(decode(&bytes), Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_truncated_header() {
        assert!(matches!(decode(b"SLI"), Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_short_payload() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes()); // rows
        bytes.extend_from_slice(&3u32.to_le_bytes()); // dims
        bytes.extend_from_slice(&0u32.to_le_bytes()); // fingerprint
        bytes.extend_from_slice(&[0u8; 8]); // 8 bytes, expected 24
        assert!(matches!(decode(&bytes), Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&99u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(IndexError::Corrupt(_))));
    }
}
