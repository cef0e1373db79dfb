//! Cosine-similarity ranking.
//!
//! [`Ranker`] holds the loaded catalog, the aligned embedding matrix, and a
//! caller-owned [`EmbeddingProvider`]. A query is embedded as a single-row
//! batch, scored against every catalog row by cosine similarity, and the
//! top-K items come back in descending score order with ties broken by
//! original catalog position.

use std::cmp::Ordering;

use anyhow::Result;
use ndarray::Array2;
use serde::Serialize;

use crate::catalog::{AssessmentItem, Catalog};
use crate::config::ShortlistConfig;
use crate::embedding::{self, EmbeddingProvider};
use crate::index::EmbeddingIndex;

/// Added to every L2 norm so all-zero vectors divide cleanly.
const NORM_EPSILON: f32 = 1e-8;

/// One row of [`Ranker::search`] output — the boundary record consumed by
/// the HTTP/UI/evaluation layers. Pure field-by-field mapping of an
/// [`AssessmentItem`] plus its 1-based rank and similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    pub rank: usize,
    pub assessment_id: String,
    pub name: String,
    pub url: String,
    pub duration_minutes: Option<f64>,
    pub remote_testing: u8,
    pub adaptive_irt: u8,
    pub test_type_codes: String,
    pub job_levels: String,
    pub languages: String,
    pub description: String,
    pub score: f64,
}

/// Ranks catalog items against free-text queries.
///
/// Catalog and matrix are loaded once at construction and cached for the
/// struct's lifetime; rebuilding the index requires constructing a new
/// `Ranker`.
pub struct Ranker {
    catalog: Catalog,
    matrix: Array2<f32>,
    provider: Box<dyn EmbeddingProvider>,
}

impl Ranker {
    /// Build a ranker from already-loaded parts. The caller constructs and
    /// owns the provider, which makes substituting a stub trivial.
    pub fn new(
        catalog: Catalog,
        matrix: Array2<f32>,
        provider: Box<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        anyhow::ensure!(
            matrix.nrows() == catalog.len(),
            "catalog has {} items but matrix has {} rows",
            catalog.len(),
            matrix.nrows()
        );
        Ok(Self {
            catalog,
            matrix,
            provider,
        })
    }

    /// Load catalog + aligned index per config and create the configured
    /// embedding provider. This is the constructor the CLI uses.
    pub fn open(config: &ShortlistConfig) -> Result<Self> {
        let catalog = Catalog::load(config.resolved_catalog_path())?;
        let index = EmbeddingIndex::new(config.resolved_index_path());
        let matrix = index.load_aligned(&catalog)?;
        let provider = embedding::create_provider(&config.embedding)?;
        Self::new(catalog, matrix, provider)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Return the top-K catalog items for a query, descending by cosine
    /// similarity. Output length is `min(top_k, catalog size)`; an empty
    /// query is still encoded and scored like any other.
    pub fn rank(&self, query: &str, top_k: usize) -> Result<Vec<(&AssessmentItem, f64)>> {
        if self.catalog.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.provider.embed(query)?;
        anyhow::ensure!(
            query_vec.len() == self.matrix.ncols(),
            "query embedding has {} dimensions but the index has {}",
            query_vec.len(),
            self.matrix.ncols()
        );

        let scores = cosine_scores(&query_vec, &self.matrix);

        // Descending score; ties broken by ascending catalog index so output
        // is deterministic regardless of sort stability.
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });
        order.truncate(top_k.min(scores.len()));

        Ok(order
            .into_iter()
            .map(|i| (&self.catalog.items()[i], scores[i]))
            .collect())
    }

    /// Rank and map to owned [`SearchRecord`]s with 1-based rank numbers.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchRecord>> {
        let ranked = self.rank(query, top_k)?;
        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(i, (item, score))| SearchRecord {
                rank: i + 1,
                assessment_id: item.assessment_id.clone(),
                name: item.name.clone(),
                url: item.url.clone(),
                duration_minutes: item.duration_minutes,
                remote_testing: item.remote_testing,
                adaptive_irt: item.adaptive_irt,
                test_type_codes: item.test_type_codes.clone(),
                job_levels: item.job_levels.clone(),
                languages: item.languages.clone(),
                description: item.description.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity between the query and every matrix row: both sides are
/// L2-normalized with [`NORM_EPSILON`] added to the norm, then dotted.
fn cosine_scores(query: &[f32], matrix: &Array2<f32>) -> Vec<f64> {
    let query_norm = l2_norm(query) + NORM_EPSILON;
    matrix
        .outer_iter()
        .map(|row| {
            let mut dot = 0.0f32;
            let mut row_sq = 0.0f32;
            for (q, r) in query.iter().zip(row.iter()) {
                dot += q * r;
                row_sq += r * r;
            }
            let row_norm = row_sq.sqrt() + NORM_EPSILON;
            f64::from(dot / (query_norm * row_norm))
        })
        .collect()
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
