//! Metrics command implementation.

use anyhow::Result;
use dart::{CorpInfo, DataError, MetricsReport};
use tracing::debug;

use super::{FilingArgs, figure};
use crate::OutputFormat;
use crate::config::Config;

/// Derive and print metrics for a filing.
pub(crate) async fn show_metrics(
    config: &Config,
    filing: &FilingArgs,
    format: OutputFormat,
    no_market: bool,
) -> Result<()> {
    let query = filing.to_query()?;
    let service = config.service(!no_market)?;
    let report = service.metrics(&query).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            let corp = service.corp(&query.corp_code).await;
            println!("{}", heading(&query.corp_code, query.bsns_year, corp));
            println!();
            print_table(&report);
        }
    }

    Ok(())
}

/// Title line naming the corporation, or just its code when the directory
/// does not know it.
fn heading(corp_code: &str, year: i32, corp: dart::Result<CorpInfo>) -> String {
    match corp {
        Ok(info) => format!("{} ({corp_code}), {year}", info.corp_name),
        Err(e) => {
            if !matches!(e, DataError::CorpNotFound(_) | DataError::ProviderNotConfigured(_)) {
                debug!(corp_code, error = %e, "Corp name lookup failed");
            }
            format!("{corp_code}, {year}")
        }
    }
}

fn print_table(report: &MetricsReport) {
    let m = &report.metrics;
    println!("Status: {} ({}), {} rows", report.status, report.message, report.list.len());
    println!();
    println!("Amounts (KRW)");
    println!("{}", "-".repeat(40));
    for (label, value) in [
        ("Revenue", m.revenue),
        ("Operating income", m.operating_income),
        ("Net income", m.net_income),
        ("Total assets", m.total_assets),
        ("Total liabilities", m.total_liabilities),
        ("Total equity", m.total_equity),
        ("EBITDA", m.ebitda),
    ] {
        println!("  {label:<20} {:>18}", figure(value));
    }
    println!();
    println!("Ratios (%)");
    println!("{}", "-".repeat(40));
    for (label, value) in [
        ("Debt ratio", m.debt_ratio),
        ("Reserve ratio", m.reserve_ratio),
        ("ROA", m.roa),
        ("ROE", m.roe),
    ] {
        println!("  {label:<20} {:>18}", figure(value));
    }
    println!();
    match &report.stock.stock_code {
        Some(code) => {
            println!("Market ({code})");
            println!("{}", "-".repeat(40));
            for (label, value) in [
                ("PER", report.stock.per),
                ("PBR", report.stock.pbr),
                ("EPS", report.stock.eps),
            ] {
                println!("  {label:<20} {:>18}", figure(value));
            }
        }
        None => println!("Market: not listed or no stock code"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_uses_corp_name() {
        let info = CorpInfo::new("00126380", "삼성전자");
        assert_eq!(heading("00126380", 2023, Ok(info)), "삼성전자 (00126380), 2023");
    }

    #[test]
    fn test_heading_falls_back_to_code() {
        let err = DataError::CorpNotFound("00126380".into());
        assert_eq!(heading("00126380", 2023, Err(err)), "00126380, 2023");

        let err = DataError::Store("locked".into());
        assert_eq!(heading("00126380", 2023, Err(err)), "00126380, 2023");
    }
}
