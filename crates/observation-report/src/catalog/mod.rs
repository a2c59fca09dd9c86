//! Program catalog: canonical ids and names for the free-text service column.
//!
//! The catalog is read-only reference data. Callers load it once and pass it by
//! reference (`Option<&ProgramCatalog>`) to whatever needs resolution.

mod parser;

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::normalizer::normalize_name;
use crate::schema::SchemaError;
use crate::sources::Table;

/// Minimum normalized Levenshtein similarity for a fuzzy name or alias match.
const FUZZY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    entries: Vec<CatalogEntry>,
    exact: HashMap<String, usize>,
    names: Vec<(String, usize)>,
}

impl ProgramCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut exact = HashMap::new();
        let mut names = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            exact.entry(normalize_name(&entry.id)).or_insert(index);
            for label in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
                let normalized = normalize_name(label);
                exact.entry(normalized.clone()).or_insert(index);
                names.push((normalized, index));
            }
        }

        Self {
            entries,
            exact,
            names,
        }
    }

    pub fn from_table(table: &Table) -> Result<Self, SchemaError> {
        parser::parse_entries(table).map(Self::new)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match on id, name, or alias; otherwise the closest name or alias
    /// above [`FUZZY_THRESHOLD`]. Ids never match fuzzily.
    pub fn resolve(&self, free_text: &str) -> Option<&CatalogEntry> {
        let query = normalize_name(free_text);
        if query.is_empty() {
            return None;
        }

        if let Some(&index) = self.exact.get(&query) {
            return self.entries.get(index);
        }

        let mut best: Option<(f64, usize)> = None;
        for (name, index) in &self.names {
            let score = strsim::normalized_levenshtein(&query, name);
            if score >= FUZZY_THRESHOLD && best.map_or(true, |(top, _)| score > top) {
                best = Some((score, *index));
            }
        }

        best.and_then(|(score, index)| {
            debug!(query = %free_text, score, "fuzzy catalog match");
            self.entries.get(index)
        })
    }
}

/// A service name after catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedProgram {
    pub id: String,
    pub name: String,
    /// `false` when the raw text was kept because the catalog had no match.
    pub matched: bool,
}

/// Resolves `raw` against the catalog, falling back to the trimmed raw text as
/// both id and name when the catalog is absent or has no match.
pub fn resolve_program(catalog: Option<&ProgramCatalog>, raw: &str) -> ResolvedProgram {
    match catalog.and_then(|catalog| catalog.resolve(raw)) {
        Some(entry) => ResolvedProgram {
            id: entry.id.clone(),
            name: entry.name.clone(),
            matched: true,
        },
        None => {
            let fallback = raw.trim().to_string();
            if catalog.is_some() {
                debug!(service = %fallback, "service not found in program catalog");
            }
            ResolvedProgram {
                id: fallback.clone(),
                name: fallback,
                matched: false,
            }
        }
    }
}
