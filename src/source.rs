use core::fmt;
use std::{collections::HashSet, path::Path};

use crate::{Error, Result};

/// A feed name as it appears in the source list, used both for the
/// upstream URL and the output file name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedIdentifier(String);

impl FeedIdentifier {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let unsafe_name = trimmed.is_empty()
            || trimmed.starts_with('.')
            || trimmed.contains(['/', '\\'])
            || trimmed.contains(char::is_whitespace);
        if unsafe_name {
            return Err(Error::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One non-blank row of the source list
pub type SourceEntry = Result<FeedIdentifier>;

/// Read the first field of every record, in order, skipping blank rows
/// and repeated names.
///
/// Rows that cannot name a feed come back as errors so the caller can
/// report and skip them without losing the rest of the list.
pub async fn load_sources(path: &Path) -> Result<Vec<SourceEntry>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        log::warn!("source list not found at `{}`", path.display());
        return Err(Error::MissingSourceList(path.to_path_buf()));
    }
    let raw = tokio::fs::read(path).await.inspect_err(|e| {
        log::warn!("failed to read source list `{}`: {e}", path.display());
    })?;
    parse_sources(&raw)
}

pub fn parse_sources(raw: &[u8]) -> Result<Vec<SourceEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw);
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.inspect_err(|e| log::warn!("bad row in source list: {e}"))?;
        let Some(first) = record.get(0).filter(|field| !field.is_empty()) else {
            continue;
        };
        if !seen.insert(first.to_string()) {
            log::debug!("skipping repeated identifier `{first}`");
            continue;
        }
        entries.push(FeedIdentifier::new(first));
    }
    Ok(entries)
}
