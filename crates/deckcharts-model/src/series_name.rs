//! Series name decomposition.
//!
//! Series are labelled `<category>_<ordinal>`, e.g. `PE - Direct_-1`. The category groups series
//! that share a base color; the ordinal ("vintage") picks a darker or lighter shade of it.

use serde::{Deserialize, Serialize};

pub const SERIES_NAME_SEPARATOR: char = '_';

/// Series label that is never decomposed and never takes a palette slot.
pub const TARGET_NAV_LINE: &str = "Target NAV (Line)";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesIdentity {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i32>,
}

impl SeriesIdentity {
    pub fn decode(name: &str) -> Self {
        decode(name)
    }

    /// Whether the name carried an ordinal suffix (and therefore gets shaded).
    pub fn has_ordinal(&self) -> bool {
        self.ordinal.is_some()
    }
}

pub fn is_reserved(name: &str) -> bool {
    name == TARGET_NAV_LINE
}

/// Split a series name into category and ordinal.
///
/// Total: an unparsable suffix yields ordinal `0`, and names without a separator (or the
/// reserved literal) yield the whole name as category with no ordinal.
pub fn decode(name: &str) -> SeriesIdentity {
    if is_reserved(name) {
        return whole_name(name);
    }

    match name.rsplit_once(SERIES_NAME_SEPARATOR) {
        Some((category, suffix)) => SeriesIdentity {
            category: category.to_string(),
            ordinal: Some(parse_ordinal(suffix)),
        },
        None => whole_name(name),
    }
}

/// Build a series name from its parts.
pub fn encode(category: &str, ordinal: Option<i32>) -> String {
    match ordinal {
        Some(ordinal) => format!("{category}{SERIES_NAME_SEPARATOR}{ordinal}"),
        None => category.to_string(),
    }
}

fn whole_name(name: &str) -> SeriesIdentity {
    SeriesIdentity {
        category: name.to_string(),
        ordinal: None,
    }
}

fn parse_ordinal(suffix: &str) -> i32 {
    suffix.trim().parse::<i32>().unwrap_or(0)
}
