//! Locating accounting line items by label.
//!
//! Filers label the same quantity differently across companies and periods,
//! so concepts are resolved by matching label patterns rather than fixed keys.
//! The first row (in filing order) whose label matches wins; later duplicates
//! such as restated prior-period lines are ignored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::amount::parse_amount;
use crate::error::{DataError, Result};
use crate::types::FilingRow;

/// Returns the parsed amount of the first row whose label matches `pattern`.
///
/// Matching is a case-sensitive regex search over the exact label text. If
/// the first matching row carries an unparseable amount the result is `None`;
/// later rows are not consulted.
#[must_use]
pub fn find_amount(rows: &[FilingRow], pattern: &Regex) -> Option<f64> {
    rows.iter()
        .find(|row| pattern.is_match(&row.account_name))
        .and_then(|row| parse_amount(&row.amount_text))
}

/// A logical accounting quantity resolved from one or more possible labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountConcept {
    /// Total assets.
    TotalAssets,
    /// Total liabilities.
    TotalLiabilities,
    /// Total equity.
    TotalEquity,
    /// Revenue (sales).
    Revenue,
    /// Operating income.
    OperatingIncome,
    /// Net income for the period.
    NetIncome,
    /// Retained earnings, or accumulated deficit.
    RetainedEarnings,
    /// Paid-in capital stock.
    Capital,
    /// Depreciation expense.
    DepreciationExpense,
    /// Amortization of intangible assets.
    AmortizationExpense,
}

impl AccountConcept {
    /// All concepts, in the order they are resolved.
    pub const ALL: [Self; 10] = [
        Self::TotalAssets,
        Self::TotalLiabilities,
        Self::TotalEquity,
        Self::Revenue,
        Self::OperatingIncome,
        Self::NetIncome,
        Self::RetainedEarnings,
        Self::Capital,
        Self::DepreciationExpense,
        Self::AmortizationExpense,
    ];

    /// Returns the label pattern used for Korean (K-IFRS) filings.
    #[must_use]
    pub const fn korean_pattern(&self) -> &'static str {
        match self {
            Self::TotalAssets => "자산총계",
            Self::TotalLiabilities => "부채총계",
            Self::TotalEquity => "자본총계",
            Self::Revenue => r"(매출액|수익\(매출액\))",
            Self::OperatingIncome => "영업이익",
            Self::NetIncome => "(당기순이익|분기순이익|반기순이익)",
            Self::RetainedEarnings => "(이익잉여금|결손금)",
            Self::Capital => "자본금",
            Self::DepreciationExpense => "감가상각비",
            Self::AmortizationExpense => "무형자산상각비",
        }
    }
}

impl fmt::Display for AccountConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

static KOREAN: LazyLock<ConceptMap> = LazyLock::new(|| ConceptMap {
    entries: AccountConcept::ALL
        .iter()
        .map(|&concept| {
            let pattern = Regex::new(concept.korean_pattern())
                .unwrap_or_else(|e| panic!("invalid built-in pattern for {concept}: {e}"));
            (concept, pattern)
        })
        .collect(),
});

/// Ordered mapping from concepts to compiled label patterns.
///
/// Each concept is resolved with [`find_amount`] against its pattern.
#[derive(Clone, Debug)]
pub struct ConceptMap {
    entries: Vec<(AccountConcept, Regex)>,
}

impl ConceptMap {
    /// Returns the shared mapping for Korean filings.
    #[must_use]
    pub fn korean() -> &'static Self {
        &KOREAN
    }

    /// Builds a mapping from `(concept, pattern)` pairs, e.g. for another locale.
    ///
    /// When a concept appears more than once, the first entry is used.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if a pattern fails to compile.
    pub fn from_patterns<'a, I>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (AccountConcept, &'a str)>,
    {
        let entries = patterns
            .into_iter()
            .map(|(concept, pattern)| {
                Regex::new(pattern)
                    .map(|re| (concept, re))
                    .map_err(|e| {
                        DataError::InvalidParameter(format!("Invalid pattern for {concept}: {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Returns the pattern registered for a concept.
    #[must_use]
    pub fn pattern(&self, concept: AccountConcept) -> Option<&Regex> {
        self.entries
            .iter()
            .find(|(c, _)| *c == concept)
            .map(|(_, re)| re)
    }

    /// Resolves a concept against the rows. Unmapped concepts are missing.
    #[must_use]
    pub fn resolve(&self, rows: &[FilingRow], concept: AccountConcept) -> Option<f64> {
        self.pattern(concept)
            .and_then(|pattern| find_amount(rows, pattern))
    }

    /// Iterates over the registered pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (AccountConcept, &Regex)> {
        self.entries.iter().map(|(c, re)| (*c, re))
    }
}
