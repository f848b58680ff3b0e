//! Deriving financial metrics from a filing's rows.
//!
//! Every output is an `Option<f64>`: `None` marks a value that could not be
//! derived (missing line item, unparseable amount, zero denominator). A
//! missing input only affects the fields that depend on it.

use serde::{Deserialize, Serialize};

use crate::locator::{AccountConcept, ConceptMap};
use crate::types::FilingRow;

/// Returns `numerator / denominator * 100`.
///
/// `None` if either operand is missing, the denominator is zero, or the
/// result is not finite.
///
/// # Example
///
/// ```
/// use dart_core::metrics::ratio;
///
/// assert_eq!(ratio(Some(60.0), Some(600.0)), Some(10.0));
/// assert_eq!(ratio(Some(1.0), Some(0.0)), None);
/// assert_eq!(ratio(None, Some(50.0)), None);
/// ```
#[must_use]
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d * 100.0).filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Sums the available operands, treating missing ones as zero.
///
/// Used for depreciation plus amortization so that EBITDA stays computable
/// when a filing omits either line.
#[must_use]
pub fn sum_available(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

/// Amounts resolved for each accounting concept of one filing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptValues {
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Total equity.
    pub total_equity: Option<f64>,
    /// Revenue.
    pub revenue: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Retained earnings (or deficit).
    pub retained_earnings: Option<f64>,
    /// Capital stock.
    pub capital: Option<f64>,
    /// Depreciation expense.
    pub depreciation: Option<f64>,
    /// Amortization expense.
    pub amortization: Option<f64>,
}

impl ConceptValues {
    /// Resolves every concept of `map` against the rows.
    #[must_use]
    pub fn resolve(rows: &[FilingRow], map: &ConceptMap) -> Self {
        let get = |concept| map.resolve(rows, concept);
        Self {
            total_assets: get(AccountConcept::TotalAssets),
            total_liabilities: get(AccountConcept::TotalLiabilities),
            total_equity: get(AccountConcept::TotalEquity),
            revenue: get(AccountConcept::Revenue),
            operating_income: get(AccountConcept::OperatingIncome),
            net_income: get(AccountConcept::NetIncome),
            retained_earnings: get(AccountConcept::RetainedEarnings),
            capital: get(AccountConcept::Capital),
            depreciation: get(AccountConcept::DepreciationExpense),
            amortization: get(AccountConcept::AmortizationExpense),
        }
    }

    /// Returns the value resolved for a single concept.
    #[must_use]
    pub const fn get(&self, concept: AccountConcept) -> Option<f64> {
        match concept {
            AccountConcept::TotalAssets => self.total_assets,
            AccountConcept::TotalLiabilities => self.total_liabilities,
            AccountConcept::TotalEquity => self.total_equity,
            AccountConcept::Revenue => self.revenue,
            AccountConcept::OperatingIncome => self.operating_income,
            AccountConcept::NetIncome => self.net_income,
            AccountConcept::RetainedEarnings => self.retained_earnings,
            AccountConcept::Capital => self.capital,
            AccountConcept::DepreciationExpense => self.depreciation,
            AccountConcept::AmortizationExpense => self.amortization,
        }
    }
}

/// Fixed set of metrics derived from one filing.
///
/// Ratios are percentages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingMetrics {
    /// Revenue.
    pub revenue: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Total equity.
    pub total_equity: Option<f64>,
    /// Operating income plus depreciation and amortization.
    pub ebitda: Option<f64>,
    /// Liabilities over equity.
    pub debt_ratio: Option<f64>,
    /// Retained earnings over capital stock.
    pub reserve_ratio: Option<f64>,
    /// Return on assets.
    pub roa: Option<f64>,
    /// Return on equity.
    pub roe: Option<f64>,
}

impl FilingMetrics {
    /// Combines resolved concept values into the metric set.
    #[must_use]
    pub fn from_concepts(values: &ConceptValues) -> Self {
        let da = sum_available(&[values.depreciation, values.amortization]);
        let ebitda = values.operating_income.unwrap_or(0.0) + da;

        Self {
            revenue: values.revenue,
            operating_income: values.operating_income,
            net_income: values.net_income,
            total_assets: values.total_assets,
            total_liabilities: values.total_liabilities,
            total_equity: values.total_equity,
            ebitda: Some(ebitda).filter(|v| v.is_finite()),
            debt_ratio: ratio(values.total_liabilities, values.total_equity),
            reserve_ratio: ratio(values.retained_earnings, values.capital),
            roa: ratio(values.net_income, values.total_assets),
            roe: ratio(values.net_income, values.total_equity),
        }
    }
}

/// Derives metrics from rows of a Korean filing.
#[must_use]
pub fn derive_metrics(rows: &[FilingRow]) -> FilingMetrics {
    derive_metrics_with(rows, ConceptMap::korean())
}

/// Derives metrics from rows using a custom concept mapping.
#[must_use]
pub fn derive_metrics_with(rows: &[FilingRow], map: &ConceptMap) -> FilingMetrics {
    FilingMetrics::from_concepts(&ConceptValues::resolve(rows, map))
}
