//! Corporation search command implementation.

use anyhow::Result;
use dart::{CorpDirectory, CorpSummary, DEFAULT_SEARCH_LIMIT};

use crate::OutputFormat;
use crate::config::Config;

/// Search the corp-code database by name.
pub(crate) async fn search_corps(config: &Config, query: &str, format: OutputFormat) -> Result<()> {
    let directory = config.open_directory()?;
    let hits: Vec<CorpSummary> = directory
        .search(query, DEFAULT_SEARCH_LIMIT)
        .await?
        .into_iter()
        .map(CorpSummary::from)
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        OutputFormat::Table => {
            if hits.is_empty() {
                println!("No corporations match {query:?}");
                return Ok(());
            }
            println!("{:<10} {:<8} Name", "Corp code", "Stock");
            println!("{}", "-".repeat(50));
            for hit in &hits {
                let stock = if hit.stock_code.is_empty() { "-" } else { hit.stock_code.as_str() };
                println!("{:<10} {:<8} {}", hit.corp_code, stock, hit.corp_name);
            }
        }
    }

    Ok(())
}
