//! Core data types for filings, market data and reports.
//!
//! This module defines the request-scoped data structures:
//!
//! - [`FilingRow`] - One reported line item of a filing
//! - [`FilingResult`] - Status plus row set returned by a filing provider
//! - [`MarketMetrics`] - PER/PBR/EPS supplied by a market data provider
//! - [`StockMetrics`] - Market metrics tagged with the stock code they belong to
//! - [`CorpInfo`] / [`CorpSummary`] - Corporation directory entries
//! - [`MetricsReport`] - Combined output of the metrics pipeline

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::amount::parse_amount;
use crate::metrics::FilingMetrics;

/// Upstream status code signalling a successful response.
pub const STATUS_OK: &str = "000";

/// One reported line item within a filing response.
///
/// Only the account label and the current-term amount are interpreted; every
/// other upstream field is kept verbatim so the row can be passed through.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingRow {
    /// Account label as reported by the filer (e.g. `자산총계`).
    #[serde(rename = "account_nm", default, deserialize_with = "lenient_text")]
    pub account_name: String,
    /// Current-term amount text (e.g. `"1,234"` or `"(56)"`).
    #[serde(rename = "thstrm_amount", default, deserialize_with = "lenient_text")]
    pub amount_text: String,
    /// Remaining upstream fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FilingRow {
    /// Creates a row from a label and amount text.
    #[must_use]
    pub fn new(account_name: impl Into<String>, amount_text: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            amount_text: amount_text.into(),
            extra: Map::new(),
        }
    }

    /// Returns the parsed current-term amount.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        parse_amount(&self.amount_text)
    }
}

/// Response of a filing provider: status, message and row set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingResult {
    /// Provider-defined status code (`"000"` on success).
    #[serde(default)]
    pub status: String,
    /// Provider message accompanying the status.
    #[serde(default)]
    pub message: String,
    /// Reported rows in filing order. May be empty.
    #[serde(default, deserialize_with = "rows_or_empty")]
    pub list: Vec<FilingRow>,
}

impl FilingResult {
    /// Creates a result with the given status, message and rows.
    #[must_use]
    pub fn new(status: impl Into<String>, message: impl Into<String>, list: Vec<FilingRow>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            list,
        }
    }

    /// Returns true if the provider reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Returns true if the result is usable without consulting a fallback:
    /// a success status and at least one row.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.is_success() && !self.list.is_empty()
    }
}

/// Reads a text field, accepting `null` (empty) and bare numbers.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

/// Treats a missing, null or non-array `list` as empty.
///
/// Items that are not row objects are skipped.
fn rows_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<FilingRow>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                debug!(error = %e, "Skipping malformed filing row");
                None
            }
        })
        .collect())
}

/// Valuation figures supplied by a market data provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    /// Price-to-earnings ratio.
    pub per: Option<f64>,
    /// Price-to-book ratio.
    pub pbr: Option<f64>,
    /// Earnings per share.
    pub eps: Option<f64>,
}

/// Market metrics for the security linked to a corporation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    /// Six digit listing code, `None` for unlisted corporations.
    pub stock_code: Option<String>,
    /// Price-to-earnings ratio.
    pub per: Option<f64>,
    /// Price-to-book ratio.
    pub pbr: Option<f64>,
    /// Earnings per share.
    pub eps: Option<f64>,
}

impl StockMetrics {
    /// Creates stock metrics with every figure missing.
    #[must_use]
    pub const fn missing(stock_code: Option<String>) -> Self {
        Self {
            stock_code,
            per: None,
            pbr: None,
            eps: None,
        }
    }

    /// Attaches market figures to a stock code.
    #[must_use]
    pub const fn with_market(stock_code: Option<String>, market: MarketMetrics) -> Self {
        Self {
            stock_code,
            per: market.per,
            pbr: market.pbr,
            eps: market.eps,
        }
    }
}

/// Corporation directory entry, as published in the regulator's corp-code list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpInfo {
    /// Eight digit corporation code.
    pub corp_code: String,
    /// Registered (Korean) name.
    pub corp_name: String,
    /// English name, possibly empty.
    #[serde(default)]
    pub corp_eng_name: String,
    /// Six digit listing code, empty for unlisted corporations.
    #[serde(default)]
    pub stock_code: String,
    /// Last modification date as published (`YYYYMMDD`).
    #[serde(default)]
    pub modify_date: String,
}

impl CorpInfo {
    /// Creates a directory entry with required fields.
    #[must_use]
    pub fn new(corp_code: impl Into<String>, corp_name: impl Into<String>) -> Self {
        Self {
            corp_code: corp_code.into(),
            corp_name: corp_name.into(),
            ..Default::default()
        }
    }

    /// Sets the English name.
    #[must_use]
    pub fn with_eng_name(mut self, corp_eng_name: impl Into<String>) -> Self {
        self.corp_eng_name = corp_eng_name.into();
        self
    }

    /// Sets the listing code.
    #[must_use]
    pub fn with_stock_code(mut self, stock_code: impl Into<String>) -> Self {
        self.stock_code = stock_code.into();
        self
    }

    /// Sets the modification date.
    #[must_use]
    pub fn with_modify_date(mut self, modify_date: impl Into<String>) -> Self {
        self.modify_date = modify_date.into();
        self
    }

    /// Returns the trimmed stock code if it is a six digit listing code.
    #[must_use]
    pub fn listed_stock_code(&self) -> Option<&str> {
        let code = self.stock_code.trim();
        (code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())).then_some(code)
    }

    /// Parses the modification date, if present and well-formed.
    #[must_use]
    pub fn modified_on(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(self.modify_date.trim(), "%Y%m%d").ok()
    }

    /// Returns true if the query occurs in either name, ignoring case.
    ///
    /// The query is treated literally; it is expected to be lowercased already.
    #[must_use]
    pub fn matches_lowercase(&self, query: &str) -> bool {
        self.corp_name.to_lowercase().contains(query)
            || self.corp_eng_name.to_lowercase().contains(query)
    }
}

/// Search hit returned to callers: just the identifying fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpSummary {
    /// Eight digit corporation code.
    pub corp_code: String,
    /// Registered name.
    pub corp_name: String,
    /// Listing code, empty for unlisted corporations.
    pub stock_code: String,
}

impl From<CorpInfo> for CorpSummary {
    fn from(info: CorpInfo) -> Self {
        Self {
            corp_code: info.corp_code,
            corp_name: info.corp_name,
            stock_code: info.stock_code,
        }
    }
}

/// Combined output of the metrics pipeline for one filing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Status of the filing response the rows came from.
    pub status: String,
    /// Message of the filing response the rows came from.
    pub message: String,
    /// Rows the metrics were derived from, unchanged.
    pub list: Vec<FilingRow>,
    /// Derived filing metrics.
    pub metrics: FilingMetrics,
    /// Market metrics for the corporation's listed security.
    pub stock: StockMetrics,
}

impl MetricsReport {
    /// Builds a report from a filing result, falling back to `"000"`/`"OK"`
    /// when the upstream left status or message blank.
    #[must_use]
    pub fn new(filing: FilingResult, metrics: FilingMetrics, stock: StockMetrics) -> Self {
        let status = if filing.status.is_empty() {
            STATUS_OK.to_string()
        } else {
            filing.status
        };
        let message = if filing.message.is_empty() {
            "OK".to_string()
        } else {
            filing.message
        };
        Self {
            status,
            message,
            list: filing.list,
            metrics,
            stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_row_preserves_upstream_fields() {
        let json = r#"{
            "rcept_no": "20240312000736",
            "account_nm": "자산총계",
            "thstrm_amount": "455,905,980,000,000",
            "fs_div": "CFS",
            "ord": "1"
        }"#;
        let row: FilingRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.account_name, "자산총계");
        assert_eq!(row.amount(), Some(455_905_980_000_000.0));
        assert_eq!(row.extra.get("fs_div").and_then(Value::as_str), Some("CFS"));

        let back = serde_json::to_value(&row).unwrap();
        assert_eq!(back["rcept_no"], "20240312000736");
        assert_eq!(back["account_nm"], "자산총계");
    }

    #[test]
    fn test_filing_result_without_list() {
        let json = r#"{"status":"013","message":"조회된 데이타가 없습니다."}"#;
        let result: FilingResult = serde_json::from_str(json).unwrap();
        assert!(result.list.is_empty());
        assert!(!result.is_success());
        assert!(!result.is_acceptable());

        let null_list: FilingResult =
            serde_json::from_str(r#"{"status":"000","message":"정상","list":null}"#).unwrap();
        assert!(null_list.is_success());
        assert!(!null_list.is_acceptable());
    }

    #[test]
    fn test_odd_amount_values_stay_local_to_their_row() {
        let json = r#"{
            "status": "000",
            "message": "정상",
            "list": [
                {"account_nm": "자산총계", "thstrm_amount": "1,000"},
                {"account_nm": "기타", "thstrm_amount": null},
                {"account_nm": "부채총계", "thstrm_amount": 400},
                {"account_nm": null, "thstrm_amount": "5"},
                {"account_nm": "자본총계"}
            ]
        }"#;
        let result: FilingResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.list.len(), 5);
        assert_eq!(result.list[0].amount(), Some(1000.0));
        assert_eq!(result.list[1].amount_text, "");
        assert_eq!(result.list[1].amount(), None);
        assert_eq!(result.list[2].amount(), Some(400.0));
        assert_eq!(result.list[3].account_name, "");
        assert_eq!(result.list[4].amount(), None);
    }

    #[test]
    fn test_non_object_rows_are_skipped() {
        let json = r#"{
            "status": "000",
            "message": "정상",
            "list": [42, "row", null, {"account_nm": "자산총계", "thstrm_amount": "10"}]
        }"#;
        let result: FilingResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.list, vec![FilingRow::new("자산총계", "10")]);
    }

    #[test]
    fn test_acceptable_requires_rows_and_success() {
        let rows = vec![FilingRow::new("자산총계", "100")];
        assert!(FilingResult::new("000", "정상", rows.clone()).is_acceptable());
        assert!(!FilingResult::new("020", "요청 제한", rows).is_acceptable());
        assert!(!FilingResult::new("000", "정상", Vec::new()).is_acceptable());
    }

    #[test]
    fn test_listed_stock_code() {
        let listed = CorpInfo::new("00126380", "삼성전자").with_stock_code(" 005930 ");
        assert_eq!(listed.listed_stock_code(), Some("005930"));

        let unlisted = CorpInfo::new("00434003", "다코");
        assert_eq!(unlisted.listed_stock_code(), None);

        let malformed = CorpInfo::new("00434003", "다코").with_stock_code("A05930");
        assert_eq!(malformed.listed_stock_code(), None);
    }

    #[test]
    fn test_corp_name_matching() {
        let info = CorpInfo::new("00126380", "삼성전자").with_eng_name("SAMSUNG ELECTRONICS CO,.LTD");
        assert!(info.matches_lowercase("삼성"));
        assert!(info.matches_lowercase("electronics"));
        assert!(!info.matches_lowercase("hyundai"));
    }

    #[test]
    fn test_modified_on() {
        let info = CorpInfo::new("00126380", "삼성전자").with_modify_date("20240102");
        assert_eq!(info.modified_on(), chrono::NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(CorpInfo::new("1", "x").modified_on(), None);
    }

    #[test]
    fn test_report_defaults_blank_status() {
        let report = MetricsReport::new(
            FilingResult::default(),
            FilingMetrics::default(),
            StockMetrics::missing(None),
        );
        assert_eq!(report.status, "000");
        assert_eq!(report.message, "OK");
        assert!(report.list.is_empty());
    }
}
