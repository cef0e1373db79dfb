use anyhow::Result;

use shortlist::config::ShortlistConfig;
use shortlist::rank::Ranker;

/// Run a search from the terminal and print the ranked results.
pub async fn search(
    config: &ShortlistConfig,
    query: &str,
    top_k: usize,
    json: bool,
) -> Result<()> {
    let config = config.clone();
    let query_text = query.to_string();

    // Model load + inference are blocking work.
    let records = tokio::task::spawn_blocking(move || {
        let ranker = Ranker::open(&config)?;
        ranker.search(&query_text, top_k)
    })
    .await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Top {} result(s) for \"{query}\"\n", records.len());

    for record in &records {
        let duration = record
            .duration_minutes
            .map(|d| format!("{d} min"))
            .unwrap_or_else(|| "duration n/a".into());

        println!(
            "  {}. {} (score: {:.4})",
            record.rank, record.name, record.score
        );
        println!(
            "     {} | {} | remote: {} | adaptive: {}",
            record.assessment_id, duration, record.remote_testing, record.adaptive_irt
        );
        println!("     {}", record.url);
        println!();
    }

    Ok(())
}
