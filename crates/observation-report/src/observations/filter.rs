use serde::{Deserialize, Serialize};

use super::pipeline::EnrichedObservation;

/// Interactive filters. Blank values mean "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_type: Option<String>,
}

/// Program visibility granted by the caller's role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "program", rename_all = "snake_case")]
pub enum RoleScope {
    #[default]
    Unrestricted,
    /// Pinned to one resolved program id; overrides any program filter.
    Program(String),
}

/// Outcome of filtering: matching rows, or an explicit empty state.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Matches(Vec<&'a EnrichedObservation>),
    NoResults,
}

impl<'a> Selection<'a> {
    pub fn observations(&self) -> &[&'a EnrichedObservation] {
        match self {
            Selection::Matches(rows) => rows,
            Selection::NoResults => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::NoResults)
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

impl ObservationFilter {
    /// The program constraint actually applied: the role's pinned program when
    /// there is one, otherwise the interactive choice.
    pub fn effective_program<'a>(&'a self, scope: &'a RoleScope) -> Option<&'a str> {
        match scope {
            RoleScope::Program(program) => Some(program.as_str()),
            RoleScope::Unrestricted => active(&self.program),
        }
    }

    pub fn matches(&self, scope: &RoleScope, observation: &EnrichedObservation) -> bool {
        let period_ok = active(&self.period).map_or(true, |period| observation.period == period);
        let program_ok = self
            .effective_program(scope)
            .map_or(true, |program| observation.program.id == program);
        let type_ok = active(&self.observation_type).map_or(true, |kind| {
            observation.record.observation_type.as_deref() == Some(kind)
        });

        period_ok && program_ok && type_ok
    }

    pub fn apply<'a>(
        &self,
        scope: &RoleScope,
        observations: &'a [EnrichedObservation],
    ) -> Selection<'a> {
        let rows: Vec<&EnrichedObservation> = observations
            .iter()
            .filter(|observation| self.matches(scope, observation))
            .collect();

        if rows.is_empty() {
            Selection::NoResults
        } else {
            Selection::Matches(rows)
        }
    }
}
