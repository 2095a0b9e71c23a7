//! Organization id scheme: `ORG` followed by a zero-padded number.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::domain::arena::Forest;
use crate::domain::error::{DomainError, DomainResult};

pub const ID_PREFIX: &str = "ORG";

/// Minimum number of digits in a generated id; longer numbers are not truncated.
pub const ID_PAD_WIDTH: usize = 3;

fn id_regex() -> &'static Regex {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    ID_RE.get_or_init(|| Regex::new(r"^ORG(\d{2,})$").expect("static id pattern is valid"))
}

/// Numeric suffix of an id following the scheme, `None` otherwise.
pub fn numeric_suffix(id: &str) -> Option<u64> {
    let caps = id_regex().captures(id)?;
    let digits = caps.get(1)?.as_str();
    match digits.parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("ignoring id with oversized suffix {}: {}", id, e);
            None
        }
    }
}

pub fn format_id(number: u64) -> String {
    format!("{ID_PREFIX}{number:0width$}", width = ID_PAD_WIDTH)
}

/// Next free id: one above the highest numeric suffix in the forest.
///
/// Ids outside the scheme are ignored. Gaps left by deletions are never
/// filled, only the maximum counts.
pub fn generate_next_id(forest: &Forest) -> DomainResult<String> {
    let max = forest
        .iter()
        .filter_map(|(_, entry)| numeric_suffix(&entry.organization.organization_id))
        .max()
        .unwrap_or(0);
    let next = max.checked_add(1).map(format_id).ok_or_else(|| DomainError::IdSpaceExhausted {
        last: format_id(max),
    })?;
    debug!("generate_next_id: max suffix {} -> {}", max, next);
    Ok(next)
}
