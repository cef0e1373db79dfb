//! Assessment recommender — ranks a fixed catalog of assessment items against
//! free-text hiring queries by embedding-vector similarity.
//!
//! The retrieval pipeline has four parts:
//!
//! - [`catalog`] — loads [`AssessmentItem`](catalog::AssessmentItem) records
//!   from a CSV source, in file order (order defines row alignment with the
//!   embedding matrix)
//! - [`embedding`] — text-to-vector pipeline via ONNX Runtime with
//!   all-MiniLM-L6-v2 (384 dimensions, L2-normalized)
//! - [`index`] — persists the catalog embedding matrix as a single binary
//!   file and reloads it with mandatory alignment checks
//! - [`rank`] — cosine-similarity ranking: [`Ranker`](rank::Ranker) embeds a
//!   query and returns the top-K catalog items with scores
//!
//! The index is built offline (`shortlist index build`) and replaced
//! wholesale whenever the catalog changes. At query time the [`rank::Ranker`]
//! loads catalog + index once, embeds the query, and scores every row.
//!
//! The HTTP API, interactive UI, and offline evaluation harness are external
//! consumers of [`rank::Ranker::search`] and live outside this crate.

pub mod catalog;
pub mod config;
pub mod embedding;
pub mod index;
pub mod rank;
