//! Corp-code seeding command implementation.

use anyhow::{Context, Result, bail};
use dart::{CorpDirectory, SqliteDirectory, parse_corp_codes};
use std::path::Path;
use tracing::info;

use crate::config::Config;

/// Parse CORPCODE.xml and replace the contents of the corp-code database.
pub(crate) async fn seed_directory(config: &Config, path: &Path) -> Result<()> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let entries = parse_corp_codes(&xml)?;
    if entries.is_empty() {
        bail!("parsed 0 corp entries from {}; check the XML structure", path.display());
    }

    let directory = SqliteDirectory::new(&config.corp_db)
        .with_context(|| format!("opening {}", config.corp_db.display()))?;
    let stored = directory.replace_all(&entries).await?;

    info!(stored, path = %config.corp_db.display(), "Seeded corp codes");
    println!("Seeded {stored} corps to {}", config.corp_db.display());
    Ok(())
}
