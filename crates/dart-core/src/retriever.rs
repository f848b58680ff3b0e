//! Filing retrieval with a single fallback step.
//!
//! The primary representation is queried first. If it is not acceptable
//! (unsuccessful status or no rows), the fallback representation is queried
//! exactly once and its result is final, whatever it contains.

use tracing::{debug, warn};

use crate::{
    error::{DataError, Result},
    provider::FilingProvider,
    query::FilingQuery,
    types::FilingResult,
};

/// Which representation produced a [`FilingResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilingSource {
    /// The primary representation was acceptable.
    Primary,
    /// The fallback representation was used.
    Fallback,
}

/// Fetches the rows of a filing, falling back once if the primary is unusable.
///
/// The query is validated before any provider call. Validation and credential
/// errors from either call are returned as is, as is a rate limit on the
/// primary call. Any other error from the primary call counts as an
/// unacceptable primary; an error from the fallback call is returned to the
/// caller.
///
/// # Errors
/// Returns [`DataError::InvalidParameter`](crate::DataError::InvalidParameter)
/// for malformed identifiers, or the fallback call's error.
pub async fn fetch_filing_rows<P>(provider: &P, query: &FilingQuery) -> Result<FilingResult>
where
    P: FilingProvider + ?Sized,
{
    fetch_filing_rows_traced(provider, query)
        .await
        .map(|(result, _)| result)
}

/// Same as [`fetch_filing_rows`], also reporting which representation was used.
///
/// # Errors
/// See [`fetch_filing_rows`].
pub async fn fetch_filing_rows_traced<P>(
    provider: &P,
    query: &FilingQuery,
) -> Result<(FilingResult, FilingSource)>
where
    P: FilingProvider + ?Sized,
{
    query.validate()?;

    debug!(provider = provider.name(), query = %query, "Fetching primary filing");
    match provider.fetch_primary(query).await {
        Ok(result) if result.is_acceptable() => {
            debug!(rows = result.list.len(), "Primary filing acceptable");
            return Ok((result, FilingSource::Primary));
        }
        Ok(result) => {
            debug!(
                status = %result.status,
                message = %result.message,
                rows = result.list.len(),
                "Primary filing unusable, trying fallback"
            );
        }
        Err(e) if e.is_validation() => return Err(e),
        Err(e @ DataError::RateLimited { .. }) => {
            warn!(provider = provider.name(), error = %e, "Primary filing rate limited");
            return Err(e);
        }
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Primary filing failed, trying fallback");
        }
    }

    let result = provider.fetch_fallback(query).await?;
    debug!(
        status = %result.status,
        rows = result.list.len(),
        "Fallback filing fetched"
    );
    Ok((result, FilingSource::Fallback))
}
