//! Catalog loading.
//!
//! Reads [`AssessmentItem`] records from a CSV source in file order. Row
//! order is significant: it defines the alignment between catalog items and
//! embedding-matrix rows, so no sorting or filtering is ever applied.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while loading the catalog.
///
/// These are load-time structural failures and abort the whole load. A
/// malformed value inside a single row never reaches here — optional fields
/// degrade to their defaults instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog source unavailable at {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentItem {
    /// Unique identifier from the catalog source.
    pub assessment_id: String,
    /// Display name.
    pub name: String,
    /// Canonical URL for the assessment.
    pub url: String,
    /// Whether the assessment supports remote proctoring (0/1).
    pub remote_testing: u8,
    /// Whether the assessment is adaptive / IRT-based (0/1).
    pub adaptive_irt: u8,
    /// Duration in minutes. `None` when absent or unparseable.
    pub duration_minutes: Option<f64>,
    /// Test-type codes, kept as an opaque string.
    pub test_type_codes: String,
    /// Target job levels, kept as an opaque string.
    pub job_levels: String,
    /// Supported languages, kept as an opaque string.
    pub languages: String,
    /// Free-text description.
    pub description: String,
    /// Pre-built text for the embedding model. May be blank.
    pub text_for_embedding: String,
}

impl AssessmentItem {
    /// The text actually fed to the embedding model: `text_for_embedding`,
    /// falling back to description, then name, when blank.
    pub fn embedding_text(&self) -> &str {
        if !self.text_for_embedding.is_empty() {
            &self.text_for_embedding
        } else if !self.description.is_empty() {
            &self.description
        } else {
            &self.name
        }
    }
}

/// The full catalog: items in file order plus a CRC32 fingerprint of the
/// source bytes. The fingerprint is stored in the embedding index at build
/// time so a stale index is detected at load time.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<AssessmentItem>,
    fingerprint: u32,
}

impl Catalog {
    /// Load the catalog from a CSV file.
    ///
    /// Fails only if the file is unreadable, a required column is missing
    /// from the header, or the CSV itself is structurally malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CatalogError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_csv_bytes(&bytes)?;
        tracing::info!(
            path = %path.display(),
            items = catalog.len(),
            fingerprint = catalog.fingerprint(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalog from raw CSV bytes.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        // Flexible: a row with missing trailing fields degrades to defaults
        // instead of aborting the load.
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let id_col =
            column("assessment_id").ok_or(CatalogError::MissingColumn("assessment_id"))?;
        let name_col = column("name").ok_or(CatalogError::MissingColumn("name"))?;
        let url_col = column("url").ok_or(CatalogError::MissingColumn("url"))?;

        let remote_col = column("remote_testing");
        let adaptive_col = column("adaptive_irt");
        let duration_col = column("duration_minutes");
        let codes_col = column("test_type_codes");
        let levels_col = column("job_levels");
        let languages_col = column("languages");
        let description_col = column("description");
        let embedding_text_col = column("text_for_embedding");

        let mut items = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |col: Option<usize>| {
                col.and_then(|i| record.get(i)).unwrap_or("").to_string()
            };

            items.push(AssessmentItem {
                assessment_id: field(Some(id_col)),
                name: field(Some(name_col)),
                url: field(Some(url_col)),
                remote_testing: parse_flag(&field(remote_col)),
                adaptive_irt: parse_flag(&field(adaptive_col)),
                duration_minutes: parse_duration(&field(duration_col)),
                test_type_codes: field(codes_col),
                job_levels: field(levels_col),
                languages: field(languages_col),
                description: field(description_col),
                text_for_embedding: field(embedding_text_col),
            });
        }

        Ok(Self {
            items,
            fingerprint: fingerprint_bytes(bytes),
        })
    }

    /// Items in file order.
    pub fn items(&self) -> &[AssessmentItem] {
        &self.items
    }

    /// Number of catalog items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// CRC32 of the raw source bytes.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }
}

/// Parse a boolean-like integer flag. Anything non-numeric counts as unset.
fn parse_flag(raw: &str) -> u8 {
    match raw.trim().parse::<i64>() {
        Ok(v) if v != 0 => 1,
        _ => 0,
    }
}

/// Parse an optional duration. Blank or unparseable values are `None`.
fn parse_duration(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// CRC32 fingerprint of the catalog source bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}
