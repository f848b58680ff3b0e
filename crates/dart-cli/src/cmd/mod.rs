//! CLI subcommand modules.
//!
//! This module contains the implementations for all dart CLI subcommands.

pub(crate) mod financials;
pub(crate) mod metrics;
pub(crate) mod search;
pub(crate) mod seed;

use anyhow::Result;
use clap::Args;
use dart::{FilingQuery, FsDiv};

/// Identifies one filing.
#[derive(Args, Debug)]
pub(crate) struct FilingArgs {
    /// Eight digit corporation code
    #[arg(short, long)]
    corp_code: String,

    /// Business year (YYYY)
    #[arg(short, long)]
    year: String,

    /// Report code: 11011 annual, 11012 half-year, 11013 Q1, 11014 Q3
    #[arg(short, long, default_value = "11011")]
    report: String,

    /// Statement scope (CFS consolidated, OFS separate)
    #[arg(long)]
    fs_div: Option<String>,
}

impl FilingArgs {
    /// Validate the arguments into a query.
    pub(crate) fn to_query(&self) -> Result<FilingQuery> {
        let query = FilingQuery::parse(&self.corp_code, &self.year, &self.report)?;
        Ok(match &self.fs_div {
            Some(fs_div) => query.with_fs_div(fs_div.parse::<FsDiv>()?),
            None => query,
        })
    }
}

/// Render an optional figure for table output.
pub(crate) fn figure(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
