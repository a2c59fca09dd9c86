use super::classify::classify;
use super::cutoffs::CutoffTable;
use super::domain::{Classification, ObservationRecord};
use super::scoring::points_for;
use crate::catalog::{resolve_program, ProgramCatalog, ResolvedProgram};

/// An observation with every derived field attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedObservation {
    pub record: ObservationRecord,
    /// Per-item points in rubric order; `None` marks a not-applicable item.
    pub points: Vec<Option<f64>>,
    pub total_points: f64,
    pub answered: usize,
    /// Classified on the raw total, not rescaled by `answered`.
    pub classification: Option<Classification>,
    pub period: String,
    pub program: ResolvedProgram,
}

pub fn enrich(
    record: ObservationRecord,
    cutoffs: &CutoffTable,
    catalog: Option<&ProgramCatalog>,
) -> EnrichedObservation {
    let points: Vec<Option<f64>> = record.responses.iter().map(points_for).collect();
    let answered = points.iter().filter(|value| value.is_some()).count();
    let total_points: f64 = points.iter().flatten().sum();
    let period = cutoffs
        .resolve(record.observed_at.map(|dt| dt.date()))
        .to_string();
    let program = resolve_program(catalog, &record.service);

    EnrichedObservation {
        points,
        total_points,
        answered,
        classification: classify(Some(total_points)),
        period,
        program,
        record,
    }
}

pub fn enrich_all(
    records: Vec<ObservationRecord>,
    cutoffs: &CutoffTable,
    catalog: Option<&ProgramCatalog>,
) -> Vec<EnrichedObservation> {
    records
        .into_iter()
        .map(|record| enrich(record, cutoffs, catalog))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::observations::cutoffs::CutoffPeriod;
    use crate::observations::domain::{Cell, QualitativeFeedback, NO_PERIOD};
    use chrono::NaiveDate;

    fn record(responses: &[&str], observed_on: Option<NaiveDate>) -> ObservationRecord {
        ObservationRecord {
            row: 0,
            timestamp: "2024-03-15".to_string(),
            observed_at: observed_on.and_then(|date| date.and_hms_opt(9, 0, 0)),
            service: "Historia".to_string(),
            teacher: "Ana Ruiz".to_string(),
            group: None,
            observation_type: None,
            observer: None,
            responses: responses.iter().map(|raw| Cell::parse(raw)).collect(),
            feedback: QualitativeFeedback::default(),
        }
    }

    fn spring() -> CutoffTable {
        CutoffTable::new(vec![CutoffPeriod {
            label: "Spring".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        }])
    }

    #[test]
    fn not_applicable_items_add_nothing_and_are_not_answered() {
        let enriched = enrich(record(&["Sí", "", "No", "N/A", "2.5"], None), &spring(), None);

        assert_eq!(enriched.points, vec![Some(3.0), None, Some(1.0), None, Some(2.5)]);
        assert_eq!(enriched.total_points, 6.5);
        assert_eq!(enriched.answered, 3);
        assert_eq!(enriched.classification, Some(Classification::NotConsolidated));
        assert_eq!(enriched.period, NO_PERIOD);
    }

    #[test]
    fn tags_period_and_resolves_program() {
        let catalog = ProgramCatalog::new(vec![CatalogEntry {
            id: "HIS".to_string(),
            name: "Licenciatura en Historia".to_string(),
            aliases: vec!["Historia".to_string()],
        }]);
        let observed = NaiveDate::from_ymd_opt(2024, 3, 15);
        let enriched = enrich(record(&["Sí"], observed), &spring(), Some(&catalog));

        assert_eq!(enriched.period, "Spring");
        assert_eq!(enriched.program.id, "HIS");
        assert_eq!(enriched.program.name, "Licenciatura en Historia");
    }
}
