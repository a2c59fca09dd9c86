use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::domain::{parse_datetime, NO_PERIOD};
use crate::schema::{resolve_columns, ColumnSpec, SchemaError};
use crate::sources::Table;

const CUTOFF_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("label", &["Corte", "Periodo", "Period", "Label", "Nombre"]),
    ColumnSpec::required(
        "start",
        &["Fecha inicio", "Fecha de inicio", "Inicio", "Start", "Start date", "Desde"],
    ),
    ColumnSpec::required(
        "end",
        &["Fecha fin", "Fecha de fin", "Fin", "End", "End date", "Hasta"],
    ),
];

/// A named reporting period; both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CutoffPeriod {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CutoffPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Cutoff intervals in table order. Order is the tie-break for overlaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutoffTable {
    periods: Vec<CutoffPeriod>,
}

impl CutoffTable {
    pub fn new(periods: Vec<CutoffPeriod>) -> Self {
        Self { periods }
    }

    /// Rows with an empty label or unparseable dates are skipped.
    pub fn from_table(table: &Table) -> Result<Self, SchemaError> {
        if table.headers.is_empty() {
            return Ok(Self::default());
        }

        let columns = resolve_columns(table, CUTOFF_COLUMNS)?;
        let (Some(label_col), Some(start_col), Some(end_col)) = (
            columns.position("label"),
            columns.position("start"),
            columns.position("end"),
        ) else {
            return Ok(Self::default());
        };

        let mut periods = Vec::with_capacity(table.rows.len());
        for row in table.data_rows() {
            let label = table.cell(row, label_col);
            let start = parse_datetime(table.cell(row, start_col)).map(|dt| dt.date());
            let end = parse_datetime(table.cell(row, end_col)).map(|dt| dt.date());

            match (label.is_empty(), start, end) {
                (false, Some(start), Some(end)) => periods.push(CutoffPeriod {
                    label: label.to_string(),
                    start,
                    end,
                }),
                _ => warn!(table = %table.name, row, "skipping cutoff row with missing label or dates"),
            }
        }

        Ok(Self { periods })
    }

    pub fn periods(&self) -> &[CutoffPeriod] {
        &self.periods
    }

    pub fn resolve(&self, date: Option<NaiveDate>) -> &str {
        resolve_period(date, &self.periods)
    }
}

/// Label of the first period containing `date`, else [`NO_PERIOD`].
pub fn resolve_period(date: Option<NaiveDate>, periods: &[CutoffPeriod]) -> &str {
    date.and_then(|date| periods.iter().find(|period| period.contains(date)))
        .map(|period| period.label.as_str())
        .unwrap_or(NO_PERIOD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn period(label: &str, start: NaiveDate, end: NaiveDate) -> CutoffPeriod {
        CutoffPeriod {
            label: label.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn resolves_inclusive_bounds() {
        let periods = vec![period("Spring", date(2024, 1, 1), date(2024, 6, 30))];
        assert_eq!(resolve_period(Some(date(2024, 3, 15)), &periods), "Spring");
        assert_eq!(resolve_period(Some(date(2024, 1, 1)), &periods), "Spring");
        assert_eq!(resolve_period(Some(date(2024, 6, 30)), &periods), "Spring");
        assert_eq!(resolve_period(Some(date(2024, 7, 1)), &periods), NO_PERIOD);
    }

    #[test]
    fn first_listed_overlap_wins() {
        let periods = vec![
            period("First cut", date(2024, 1, 1), date(2024, 3, 31)),
            period("Semester", date(2024, 1, 1), date(2024, 6, 30)),
        ];
        assert_eq!(resolve_period(Some(date(2024, 2, 1)), &periods), "First cut");
        assert_eq!(resolve_period(Some(date(2024, 5, 1)), &periods), "Semester");
    }

    #[test]
    fn missing_date_or_empty_table_has_no_period() {
        let periods = vec![period("Spring", date(2024, 1, 1), date(2024, 6, 30))];
        assert_eq!(resolve_period(None, &periods), NO_PERIOD);
        assert_eq!(resolve_period(Some(date(2024, 3, 15)), &[]), NO_PERIOD);
        assert_eq!(CutoffTable::default().resolve(Some(date(2024, 3, 15))), NO_PERIOD);
    }

    #[test]
    fn from_table_keeps_order_and_skips_bad_rows() {
        let table = Table::from_reader(
            "cutoffs",
            "Corte,Fecha inicio,Fecha fin\n\
Primer corte,2024-01-01,2024-03-31\n\
Sin fechas,pronto,\n\
Segundo corte,01/04/2024,30/06/2024\n"
                .as_bytes(),
        )
        .expect("parses");
        let cutoffs = CutoffTable::from_table(&table).expect("cutoffs build");

        let labels: Vec<_> = cutoffs.periods().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Primer corte", "Segundo corte"]);
        assert_eq!(cutoffs.periods()[1].start, date(2024, 4, 1));
        assert_eq!(cutoffs.resolve(Some(date(2024, 5, 5))), "Segundo corte");
    }

    #[test]
    fn from_table_reports_missing_columns() {
        let table = Table::from_reader("cutoffs", "Corte,Inicio\nA,2024-01-01\n".as_bytes())
            .expect("parses");
        assert!(CutoffTable::from_table(&table).is_err());
    }
}
