//! Table naming
//!
//! Table names are derived from the definition's type name when not given
//! explicitly: `BeatlesMembersTable` becomes `beatles_members`. Suffixed
//! tables (one physical table per tenant, say) append a normalized suffix:
//! `ServerSettingsTable` with `twitch-1234` becomes
//! `server_settings_twitch_1234`.

use crate::errors::{GatewayError, Result};

/// Canonical word separator in table names
pub const DELIMITER: char = '_';

/// Separators accepted in suffixes; all are rewritten to [`DELIMITER`]
const COMMON_DELIMITERS: [char; 2] = ['-', '_'];

const TABLE_SEGMENT: &str = "_table";

/// How a gateway picks its table name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableNaming {
    /// Derived from the definition type name
    #[default]
    Inferred,
    /// Used verbatim
    Explicit(String),
    /// Derived, then extended with a normalized suffix
    Suffixed(String),
}

impl TableNaming {
    /// Resolve the table name for a definition type
    pub fn resolve(&self, type_name: &str) -> Result<String> {
        match self {
            TableNaming::Inferred => Ok(infer_table_name(type_name)),
            TableNaming::Explicit(name) if name.trim().is_empty() => Err(
                GatewayError::invalid_configuration("table name must not be empty"),
            ),
            TableNaming::Explicit(name) => Ok(name.clone()),
            TableNaming::Suffixed(suffix) => suffixed_table_name(type_name, suffix),
        }
    }

    /// Normalized suffix of a `Suffixed` naming
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for a suffix made only of delimiters.
    pub fn suffix(&self) -> Result<Option<String>> {
        match self {
            TableNaming::Suffixed(suffix) => normalize_suffix(suffix).map(Some),
            _ => Ok(None),
        }
    }
}

/// Snake-case a type name and drop a trailing `_table` segment
///
/// A separator goes before every uppercase letter except the first
/// character, so `HTTPLog` becomes `h_t_t_p_log`.
pub fn infer_table_name(type_name: &str) -> String {
    let mut name = String::with_capacity(type_name.len() + 4);
    for (i, c) in type_name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            name.push(DELIMITER);
        }
        name.extend(c.to_lowercase());
    }

    match name.strip_suffix(TABLE_SEGMENT) {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Trim stray delimiters and rewrite accepted delimiters to `_`
///
/// Fails with `InvalidConfiguration` when nothing is left.
pub fn normalize_suffix(suffix: &str) -> Result<String> {
    let normalized: String = trim_delimiters(suffix)
        .chars()
        .map(|c| if COMMON_DELIMITERS.contains(&c) { DELIMITER } else { c })
        .collect();

    if normalized.is_empty() {
        return Err(GatewayError::invalid_configuration(format!(
            "invalid table suffix '{}'",
            suffix
        )));
    }
    Ok(normalized)
}

/// Inferred table name joined with a normalized suffix
pub fn suffixed_table_name(type_name: &str, suffix: &str) -> Result<String> {
    let suffix = normalize_suffix(suffix)?;
    let base = infer_table_name(type_name);
    Ok(format!("{}{}{}", trim_delimiters(&base), DELIMITER, suffix))
}

/// Last path segment of a Rust type name, without generic arguments
pub fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

fn trim_delimiters(part: &str) -> &str {
    part.trim_matches(|c| COMMON_DELIMITERS.contains(&c))
}
