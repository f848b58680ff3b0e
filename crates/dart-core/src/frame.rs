//! Tabular export of filing rows.

use polars::prelude::*;

use crate::{
    error::{DataError, Result},
    types::FilingRow,
};

/// Converts rows into a DataFrame for display.
///
/// Returns a DataFrame with columns: account_nm, thstrm_amount, amount. The
/// `amount` column holds the parsed value and is null where parsing failed.
/// Row order is preserved.
///
/// # Errors
/// Returns [`DataError::Other`] if the frame cannot be assembled.
pub fn rows_to_frame(rows: &[FilingRow]) -> Result<DataFrame> {
    let labels: Vec<&str> = rows.iter().map(|r| r.account_name.as_str()).collect();
    let texts: Vec<&str> = rows.iter().map(|r| r.amount_text.as_str()).collect();
    let amounts: Vec<Option<f64>> = rows.iter().map(FilingRow::amount).collect();

    DataFrame::new(vec![
        Column::new("account_nm".into(), labels),
        Column::new("thstrm_amount".into(), texts),
        Column::new("amount".into(), amounts),
    ])
    .map_err(|e| DataError::Other(e.to_string()))
}
