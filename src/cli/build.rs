//! CLI `index build` command — re-embed the whole catalog and replace the index.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::time::Duration;

use shortlist::catalog::Catalog;
use shortlist::config::ShortlistConfig;
use shortlist::embedding;
use shortlist::index::{self, EmbeddingIndex};

/// Rebuild the embedding index from the configured catalog.
///
/// The entire catalog is re-encoded in one batch and the index file is
/// replaced atomically; there is no incremental path.
pub async fn build(config: &ShortlistConfig) -> Result<()> {
    let catalog_path = config.resolved_catalog_path();
    let index_path = config.resolved_index_path();

    let catalog = Catalog::load(&catalog_path).context("failed to load catalog")?;

    let provider = embedding::create_provider(&config.embedding)
        .context("failed to create embedding provider")?;

    println!(
        "Embedding {} catalog item(s) with model '{}'...",
        catalog.len(),
        config.embedding.model
    );

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));

    let index = EmbeddingIndex::new(&index_path);
    let matrix = tokio::task::spawn_blocking(move || {
        let matrix = index::build(&catalog, provider.as_ref(), &index)?;
        anyhow::Ok(matrix)
    })
    .await??;

    pb.finish_and_clear();

    println!(
        "Saved {}x{} embedding matrix to {}",
        matrix.nrows(),
        matrix.ncols(),
        index_path.display()
    );
    Ok(())
}
