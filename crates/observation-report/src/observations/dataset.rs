use std::collections::BTreeSet;

use tracing::{info, warn};

use super::cutoffs::CutoffTable;
use super::domain::NO_PERIOD;
use super::filter::{ObservationFilter, RoleScope};
use super::parser::parse_records;
use super::pipeline::{enrich_all, EnrichedObservation};
use super::report::{
    area_breakdown, classification_distribution, summarize_periods, summarize_services,
    summarize_teachers, FilterOptions, ObservationDetail, ObservationReport, ObservationRow,
    ProgramOption, ReportStatus, TeacherDetail,
};
use super::ReportError;
use crate::catalog::ProgramCatalog;
use crate::config::SourceConfig;
use crate::normalizer::normalize_name;
use crate::sources::{Table, TableSource};

/// One load of the three sources, enriched and ready for any number of
/// filter selections.
#[derive(Debug, Clone)]
pub struct ObservationDataset {
    observations: Vec<EnrichedObservation>,
    rubric_items: Vec<String>,
    cutoffs: CutoffTable,
    catalog: Option<ProgramCatalog>,
    skipped: usize,
}

impl ObservationDataset {
    /// An unusable catalog degrades to raw service names; unusable
    /// observations or cutoffs are errors.
    pub fn from_tables(
        observation_table: &Table,
        cutoff_table: &Table,
        catalog_table: Option<&Table>,
    ) -> Result<Self, ReportError> {
        let catalog = catalog_table.and_then(|table| match ProgramCatalog::from_table(table) {
            Ok(catalog) => Some(catalog),
            Err(error) => {
                warn!(%error, "program catalog unusable, keeping raw service names");
                None
            }
        });

        let cutoffs =
            CutoffTable::from_table(cutoff_table).map_err(|error| ReportError::Shape {
                error,
                preview: cutoff_table.preview(5),
            })?;

        let parsed = parse_records(observation_table)?;
        let observations = enrich_all(parsed.records, &cutoffs, catalog.as_ref());

        info!(
            observations = observations.len(),
            skipped = parsed.skipped,
            rubric_items = parsed.rubric_items.len(),
            periods = cutoffs.periods().len(),
            catalog_entries = catalog.as_ref().map_or(0, ProgramCatalog::len),
            "observation dataset loaded"
        );

        Ok(Self {
            observations,
            rubric_items: parsed.rubric_items,
            cutoffs,
            catalog,
            skipped: parsed.skipped,
        })
    }

    pub fn load<S: TableSource + ?Sized>(
        source: &S,
        config: &SourceConfig,
    ) -> Result<Self, ReportError> {
        let observations = source.load(&config.observations)?;
        let cutoffs = source.load(&config.cutoffs)?;
        let catalog = config
            .catalog
            .as_deref()
            .and_then(|identifier| match source.load(identifier) {
                Ok(table) => Some(table),
                Err(error) => {
                    warn!(%error, catalog = identifier, "program catalog unavailable, keeping raw service names");
                    None
                }
            });

        Self::from_tables(&observations, &cutoffs, catalog.as_deref())
    }

    pub fn observations(&self) -> &[EnrichedObservation] {
        &self.observations
    }

    pub fn rubric_items(&self) -> &[String] {
        &self.rubric_items
    }

    pub fn cutoffs(&self) -> &CutoffTable {
        &self.cutoffs
    }

    pub fn catalog(&self) -> Option<&ProgramCatalog> {
        self.catalog.as_ref()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn report(&self, filter: &ObservationFilter, scope: &RoleScope) -> ObservationReport {
        let selection = filter.apply(scope, &self.observations);
        let rows = selection.observations();
        let status = if selection.is_empty() {
            ReportStatus::NoResults
        } else {
            ReportStatus::Ready
        };

        let teachers = summarize_teachers(rows);
        let teacher_classes =
            classification_distribution(teachers.iter().map(|teacher| teacher.classification));

        info!(
            matched = rows.len(),
            teachers = teachers.len(),
            status = ?status,
            "observation report computed"
        );

        ObservationReport {
            filter: filter.clone(),
            scope: scope.clone(),
            rows_loaded: self.observations.len() + self.skipped,
            rows_skipped: self.skipped,
            rubric_items: self.rubric_items.len(),
            status,
            status_label: status.label(),
            observations: rows.iter().map(|row| ObservationRow::from(*row)).collect(),
            services: summarize_services(rows),
            periods: summarize_periods(rows, &self.cutoffs),
            observation_classes: classification_distribution(
                rows.iter().map(|row| row.classification),
            ),
            teachers,
            teacher_classes,
        }
    }

    /// Filter values present in the data the scope can see. Periods keep the
    /// cutoff-table order with `No period` last.
    pub fn options(&self, scope: &RoleScope) -> FilterOptions {
        let selection = ObservationFilter::default().apply(scope, &self.observations);
        let visible = selection.observations();

        let present: BTreeSet<&str> = visible.iter().map(|row| row.period.as_str()).collect();
        let mut periods: Vec<String> = Vec::new();
        for period in self.cutoffs.periods() {
            let label = period.label.as_str();
            if present.contains(label) && !periods.iter().any(|seen| seen == label) {
                periods.push(label.to_string());
            }
        }
        if present.contains(NO_PERIOD) {
            periods.push(NO_PERIOD.to_string());
        }

        let programs: BTreeSet<(&str, &str)> = visible
            .iter()
            .map(|row| (row.program.name.as_str(), row.program.id.as_str()))
            .collect();
        let observation_types: BTreeSet<&str> = visible
            .iter()
            .filter_map(|row| row.record.observation_type.as_deref())
            .collect();

        FilterOptions {
            periods,
            programs: programs
                .into_iter()
                .map(|(name, id)| ProgramOption {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            observation_types: observation_types.into_iter().map(str::to_string).collect(),
        }
    }

    /// Rollup and area breakdown for one teacher under the current filters.
    /// Teacher names are compared after normalization.
    pub fn teacher(&self, name: &str, filter: &ObservationFilter, scope: &RoleScope) -> TeacherDetail {
        let wanted = normalize_name(name);
        let rows: Vec<&EnrichedObservation> = filter
            .apply(scope, &self.observations)
            .observations()
            .iter()
            .copied()
            .filter(|row| normalize_name(&row.record.teacher) == wanted)
            .collect();

        let teacher = rows
            .first()
            .map(|row| row.record.teacher.clone())
            .unwrap_or_else(|| name.trim().to_string());
        let status = if rows.is_empty() {
            ReportStatus::NoResults
        } else {
            ReportStatus::Ready
        };

        TeacherDetail {
            teacher,
            status,
            summary: summarize_teachers(&rows).into_iter().next(),
            observations: rows.iter().map(|row| ObservationRow::from(*row)).collect(),
            areas: area_breakdown(&rows),
        }
    }

    /// Detail for the observation read from source row `row`, if the scope
    /// can see it.
    pub fn observation(&self, row: usize, scope: &RoleScope) -> Result<ObservationDetail, ReportError> {
        let everything = ObservationFilter::default();
        let observation = self
            .observations
            .iter()
            .find(|observation| {
                observation.record.row == row && everything.matches(scope, observation)
            })
            .ok_or(ReportError::UnknownObservation(row))?;

        Ok(ObservationDetail::build(
            observation,
            &self.rubric_items,
            area_breakdown(&[observation]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::Classification;

    fn table(name: &str, csv: &str) -> Table {
        Table::from_reader(name, csv.as_bytes()).expect("csv parses")
    }

    fn observations() -> Table {
        table(
            "observations",
            "Marca temporal,Programa,Docente,Tipo de observación,Item 1,Item 2,Fortalezas\n\
15/03/2024 10:00:00,Historia,Ana Ruiz,Par,Sí,No,Claridad\n\
20/03/2024 10:00:00,Matemáticas,Luis Pérez,Coordinación,Sí,Sí,\n\
01/09/2024 09:00:00,Historia,Ana Ruiz,Coordinación,No se evidencia,N/A,\n\
,Historia,Marta,Par,Sí,Sí,\n",
        )
    }

    fn cutoffs() -> Table {
        table(
            "cutoffs",
            "Corte,Fecha inicio,Fecha fin\nPrimavera,2024-01-01,2024-06-30\n",
        )
    }

    fn catalog() -> Table {
        table(
            "catalog",
            "ID,Programa,Alias\nHIS,Licenciatura en Historia,Historia\nMAT,Licenciatura en Matemáticas,Matemáticas\n",
        )
    }

    fn dataset() -> ObservationDataset {
        ObservationDataset::from_tables(&observations(), &cutoffs(), Some(&catalog()))
            .expect("dataset loads")
    }

    #[test]
    fn report_counts_loaded_and_skipped_rows() {
        let report = dataset().report(&ObservationFilter::default(), &RoleScope::Unrestricted);

        assert_eq!(report.rows_loaded, 4);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.rubric_items, 2);
        assert_eq!(report.status, ReportStatus::Ready);
        assert_eq!(report.observations.len(), 3);
        assert_eq!(report.services.len(), 2);
        assert_eq!(report.periods.len(), 2);
        assert_eq!(report.periods[1].period, NO_PERIOD);
        assert_eq!(report.observation_classes[2].count, 3);
        assert_eq!(report.teachers[0].classification, Some(Classification::NotConsolidated));
    }

    #[test]
    fn report_without_matches_is_explicit() {
        let filter = ObservationFilter {
            period: Some("Otoño".to_string()),
            ..ObservationFilter::default()
        };
        let report = dataset().report(&filter, &RoleScope::Unrestricted);

        assert_eq!(report.status, ReportStatus::NoResults);
        assert!(report.observations.is_empty());
        assert!(report.teachers.is_empty());
        assert!(report.observation_classes.iter().all(|share| share.percentage.is_none()));
    }

    #[test]
    fn options_follow_the_role_scope() {
        let dataset = dataset();
        let all = dataset.options(&RoleScope::Unrestricted);
        assert_eq!(all.periods, vec!["Primavera".to_string(), NO_PERIOD.to_string()]);
        assert_eq!(
            all.programs.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["HIS", "MAT"]
        );
        assert_eq!(all.observation_types, vec!["Coordinación", "Par"]);

        let scoped = dataset.options(&RoleScope::Program("MAT".to_string()));
        assert_eq!(scoped.programs.len(), 1);
        assert_eq!(scoped.periods, vec!["Primavera".to_string()]);
        assert_eq!(scoped.observation_types, vec!["Coordinación"]);
    }

    #[test]
    fn teacher_detail_matches_names_loosely() {
        let detail = dataset().teacher(
            "  ana RUIZ ",
            &ObservationFilter::default(),
            &RoleScope::Unrestricted,
        );

        assert_eq!(detail.teacher, "Ana Ruiz");
        assert_eq!(detail.observations.len(), 2);
        let summary = detail.summary.expect("summary");
        assert_eq!(summary.total_points, 6.0);
        assert_eq!(summary.average_points, Some(3.0));
        assert_eq!(detail.areas[0].answered, 3);
        assert_eq!(detail.areas[0].max_points, 9.0);
    }

    #[test]
    fn unknown_teacher_has_no_results() {
        let detail = dataset().teacher("Nadie", &ObservationFilter::default(), &RoleScope::Unrestricted);
        assert_eq!(detail.status, ReportStatus::NoResults);
        assert!(detail.summary.is_none());
        assert!(detail.areas.iter().all(|area| area.percentage.is_none()));
    }

    #[test]
    fn observation_detail_carries_items_and_feedback() {
        let dataset = dataset();
        let detail = dataset
            .observation(0, &RoleScope::Unrestricted)
            .expect("row 0 exists");

        assert_eq!(detail.observation.program_id, "HIS");
        assert_eq!(detail.feedback.strengths.as_deref(), Some("Claridad"));
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].item, "Item 1");
        assert_eq!(detail.items[0].points, Some(3.0));
        assert_eq!(detail.items[1].response, "No");

        let hidden = dataset.observation(0, &RoleScope::Program("MAT".to_string()));
        assert!(matches!(hidden, Err(ReportError::UnknownObservation(0))));
        assert!(matches!(
            dataset.observation(3, &RoleScope::Unrestricted),
            Err(ReportError::UnknownObservation(3))
        ));
    }

    #[test]
    fn broken_catalog_falls_back_to_raw_names() {
        let broken = table("catalog", "Something,Else\nx,y\n");
        let dataset = ObservationDataset::from_tables(&observations(), &cutoffs(), Some(&broken))
            .expect("dataset loads");

        assert!(dataset.catalog().is_none());
        assert_eq!(dataset.observations()[0].program.id, "Historia");
        assert!(!dataset.observations()[0].program.matched);
    }

    #[test]
    fn cutoffs_without_required_columns_are_a_shape_error() {
        let bad = table("cutoffs", "Nombre,Cuando\nPrimavera,2024\n");
        let error = ObservationDataset::from_tables(&observations(), &bad, None)
            .expect_err("missing dates");
        assert!(error.is_data_shape());
        assert_eq!(error.preview().map(|t| t.name.as_str()), Some("cutoffs"));
    }
}
