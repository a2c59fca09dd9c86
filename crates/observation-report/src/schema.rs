//! Header resolution for natural-language column names.
//!
//! Each logical column carries an ordered alias list. Resolution happens once per
//! table; rows are then read positionally.

use std::collections::HashMap;

use crate::normalizer::normalize_name;
use crate::sources::Table;

/// One logical column and the header spellings accepted for it, most preferred first.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

impl ColumnSpec {
    pub const fn required(key: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            key,
            aliases,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            key,
            aliases,
            required: false,
        }
    }
}

/// Column positions for the claimed specs plus every header no spec claimed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    positions: HashMap<&'static str, usize>,
    unclaimed: Vec<usize>,
}

impl ResolvedColumns {
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Header positions, in table order, that matched none of the specs.
    pub fn unclaimed(&self) -> &[usize] {
        &self.unclaimed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("'{table}' has no {column} column (looked for {expected}); available: {}", available.join(", "))]
    MissingColumn {
        table: String,
        column: &'static str,
        expected: String,
        available: Vec<String>,
    },
}

pub fn resolve_columns(table: &Table, specs: &[ColumnSpec]) -> Result<ResolvedColumns, SchemaError> {
    let normalized: Vec<String> = table.headers.iter().map(|h| normalize_name(h)).collect();
    let mut claimed = vec![false; normalized.len()];
    let mut positions = HashMap::with_capacity(specs.len());

    for spec in specs {
        let found = spec.aliases.iter().find_map(|alias| {
            let alias = normalize_name(alias);
            normalized
                .iter()
                .enumerate()
                .find(|(index, header)| !claimed[*index] && **header == alias)
                .map(|(index, _)| index)
        });

        match found {
            Some(index) => {
                claimed[index] = true;
                positions.insert(spec.key, index);
            }
            None if spec.required => {
                return Err(SchemaError::MissingColumn {
                    table: table.name.clone(),
                    column: spec.key,
                    expected: spec.aliases.join(" | "),
                    available: table.headers.clone(),
                });
            }
            None => {}
        }
    }

    let unclaimed = claimed
        .iter()
        .enumerate()
        .filter(|(_, taken)| !**taken)
        .map(|(index, _)| index)
        .collect();

    Ok(ResolvedColumns {
        positions,
        unclaimed,
    })
}
