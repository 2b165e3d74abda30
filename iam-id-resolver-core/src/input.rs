//! Reading candidate identifiers from newline-delimited text.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};

use crate::errors::{ResolverError, Result};
use crate::identifier::validate_id;

/// Input lines split by local validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Unique valid IDs, in first-seen order
    pub valid: Vec<String>,
    /// Lines that failed validation, quotes removed, in input order
    pub skipped: Vec<String>,
}

/// Split `text` into valid candidates and skipped lines.
///
/// Quote characters are removed and surrounding whitespace trimmed before
/// validation. Skipped lines are kept with only their quotes removed.
/// Repeated valid IDs are kept once.
pub fn parse_candidates(text: &str, resolve_accounts: bool) -> Candidates {
    let mut candidates = Candidates::default();
    let mut seen = HashSet::new();

    for line in text.lines() {
        let unquoted: String = line.chars().filter(|c| !matches!(c, '"' | '\'')).collect();
        let cleaned = unquoted.trim();

        if !validate_id(cleaned, resolve_accounts) {
            debug!("Skipping invalid identifier {:?}", unquoted);
            candidates.skipped.push(unquoted.clone());
        } else if seen.insert(cleaned.to_string()) {
            candidates.valid.push(cleaned.to_string());
        } else {
            warn!("Duplicate identifier '{}' is resolved once", cleaned);
        }
    }

    candidates
}

/// Read and split the candidate file at `path`
pub async fn read_candidates(path: impl AsRef<Path>, resolve_accounts: bool) -> Result<Candidates> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ResolverError::file_system("read", path, e))?;
    Ok(parse_candidates(&text, resolve_accounts))
}
