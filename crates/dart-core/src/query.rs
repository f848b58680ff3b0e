//! Filing identifiers and request validation.
//!
//! This module defines [`ReportCode`] for the periodic report type,
//! [`FsDiv`] for consolidated vs. separate statements, and [`FilingQuery`]
//! which bundles the identifiers of a single filing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};

/// First business year served by the OpenDART financial statement endpoints.
pub const FIRST_SUPPORTED_YEAR: i32 = 2015;

/// Periodic report type, identified upstream by a five digit code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCode {
    /// Annual business report (11011).
    #[default]
    Annual,
    /// Half-year report (11012).
    HalfYear,
    /// First quarter report (11013).
    FirstQuarter,
    /// Third quarter report (11014).
    ThirdQuarter,
}

impl ReportCode {
    /// Returns the upstream code for this report type.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Annual => "11011",
            Self::HalfYear => "11012",
            Self::FirstQuarter => "11013",
            Self::ThirdQuarter => "11014",
        }
    }
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReportCode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "11011" => Ok(Self::Annual),
            "11012" => Ok(Self::HalfYear),
            "11013" => Ok(Self::FirstQuarter),
            "11014" => Ok(Self::ThirdQuarter),
            other => Err(DataError::InvalidParameter(format!(
                "Unknown report code: {other:?}. Expected one of 11011, 11012, 11013, 11014"
            ))),
        }
    }
}

/// Statement scope: consolidated or separate (parent-only) financial statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FsDiv {
    /// Consolidated financial statements (CFS).
    #[default]
    Consolidated,
    /// Separate financial statements (OFS).
    Separate,
}

impl FsDiv {
    /// Returns the upstream code for this statement scope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Consolidated => "CFS",
            Self::Separate => "OFS",
        }
    }
}

impl fmt::Display for FsDiv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FsDiv {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CFS" => Ok(Self::Consolidated),
            "OFS" => Ok(Self::Separate),
            other => Err(DataError::InvalidParameter(format!(
                "Unknown fs_div: {other:?}. Expected CFS or OFS"
            ))),
        }
    }
}

/// Identifiers of a single filing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilingQuery {
    /// Eight digit corporation code assigned by the regulator.
    pub corp_code: String,
    /// Business (fiscal) year, e.g. 2023.
    pub bsns_year: i32,
    /// Report type.
    pub reprt_code: ReportCode,
    /// Statement scope. `None` lets the upstream choose.
    pub fs_div: Option<FsDiv>,
}

impl FilingQuery {
    /// Creates a new query for the given corporation, year and report type.
    #[must_use]
    pub fn new(corp_code: impl Into<String>, bsns_year: i32, reprt_code: ReportCode) -> Self {
        Self {
            corp_code: corp_code.into(),
            bsns_year,
            reprt_code,
            fs_div: None,
        }
    }

    /// Builds a query from raw request strings, validating every field.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] when a required field is
    /// missing or malformed.
    pub fn parse(corp_code: &str, bsns_year: &str, reprt_code: &str) -> Result<Self> {
        let corp_code = corp_code.trim();
        let bsns_year = bsns_year.trim();
        if corp_code.is_empty() || bsns_year.is_empty() || reprt_code.trim().is_empty() {
            return Err(DataError::InvalidParameter(
                "corp_code, bsns_year and reprt_code are required".to_string(),
            ));
        }

        let year = bsns_year
            .parse::<i32>()
            .map_err(|_| DataError::InvalidParameter(format!("Invalid bsns_year: {bsns_year}")))?;

        let query = Self::new(corp_code, year, reprt_code.parse()?);
        query.validate()?;
        Ok(query)
    }

    /// Sets the statement scope.
    #[must_use]
    pub const fn with_fs_div(mut self, fs_div: FsDiv) -> Self {
        self.fs_div = Some(fs_div);
        self
    }

    /// Checks the identifiers without touching the network.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if the corp code is not eight
    /// ASCII digits or the year is outside the served range.
    pub fn validate(&self) -> Result<()> {
        if self.corp_code.len() != 8 || !self.corp_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::InvalidParameter(format!(
                "corp_code must be 8 digits, got {:?}",
                self.corp_code
            )));
        }

        if !(FIRST_SUPPORTED_YEAR..=9999).contains(&self.bsns_year) {
            return Err(DataError::InvalidParameter(format!(
                "bsns_year must be {FIRST_SUPPORTED_YEAR} or later, got {}",
                self.bsns_year
            )));
        }

        Ok(())
    }
}

impl fmt::Display for FilingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.corp_code, self.bsns_year, self.reprt_code)?;
        if let Some(fs_div) = self.fs_div {
            write!(f, "/{fs_div}")?;
        }
        Ok(())
    }
}
