//! Filing rows command implementation.

use anyhow::Result;
use dart::rows_to_frame;

use super::FilingArgs;
use crate::OutputFormat;
use crate::config::Config;

/// Fetch and print the rows of a filing.
pub(crate) async fn show_financials(
    config: &Config,
    filing: &FilingArgs,
    format: OutputFormat,
) -> Result<()> {
    let query = filing.to_query()?;
    let service = config.service(false)?;
    let result = service.financials(&query).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => {
            println!("{query}: status {} ({})", result.status, result.message);
            println!("{}", rows_to_frame(&result.list)?);
        }
    }

    Ok(())
}
