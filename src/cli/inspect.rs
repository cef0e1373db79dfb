use anyhow::{Context, Result};

use shortlist::catalog::Catalog;
use shortlist::config::ShortlistConfig;
use shortlist::index::EmbeddingIndex;

/// Print the stored index header and its alignment status against the
/// configured catalog.
pub fn inspect(config: &ShortlistConfig) -> Result<()> {
    let index_path = config.resolved_index_path();
    let index = EmbeddingIndex::new(&index_path);
    let stored = index.load().context("failed to load embedding index")?;

    println!("Index:       {}", index_path.display());
    println!("Rows:        {}", stored.matrix.nrows());
    println!("Dimensions:  {}", stored.matrix.ncols());
    println!("Fingerprint: {:#010x}", stored.fingerprint);

    match Catalog::load(config.resolved_catalog_path()) {
        Ok(catalog) => {
            if stored.matrix.nrows() != catalog.len() {
                println!(
                    "Status:      MISALIGNED — catalog has {} item(s); rebuild required",
                    catalog.len()
                );
            } else if stored.fingerprint != catalog.fingerprint() {
                println!(
                    "Status:      STALE — catalog fingerprint is {:#010x}; rebuild required",
                    catalog.fingerprint()
                );
            } else {
                println!("Status:      aligned with catalog ({} item(s))", catalog.len());
            }
        }
        Err(e) => {
            println!("Status:      catalog unavailable ({e})");
        }
    }

    Ok(())
}
