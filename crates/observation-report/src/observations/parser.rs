use tracing::warn;

use super::domain::{Cell, ObservationRecord, QualitativeFeedback, RUBRIC_ITEMS};
use super::ReportError;
use crate::schema::{resolve_columns, ColumnSpec};
use crate::sources::Table;

/// Metadata columns of the observation form. Rubric items are the unclaimed
/// headers after the last metadata column; form bookkeeping columns (email,
/// quiz score, class size) are listed here even though nothing reads them.
const OBSERVATION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required(
        "timestamp",
        &["Marca temporal", "Timestamp", "Fecha de observación", "Fecha", "Date"],
    ),
    ColumnSpec::required(
        "service",
        &[
            "Programa educativo",
            "Programa",
            "Servicio",
            "Licenciatura",
            "Program",
            "Service",
        ],
    ),
    ColumnSpec::required(
        "teacher",
        &[
            "Nombre del docente",
            "Docente observado",
            "Docente",
            "Profesor",
            "Teacher",
            "Teacher name",
        ],
    ),
    ColumnSpec::optional(
        "observed_on",
        &[
            "Fecha de observación",
            "Fecha de la observación",
            "Fecha de la clase",
            "Observation date",
        ],
    ),
    ColumnSpec::optional("group", &["Grupo", "Group"]),
    ColumnSpec::optional(
        "observation_type",
        &["Tipo de observación", "Tipo", "Observation type", "Type"],
    ),
    ColumnSpec::optional(
        "observer",
        &["Nombre del observador", "Observador", "Observer"],
    ),
    ColumnSpec::optional(
        "email",
        &[
            "Dirección de correo electrónico",
            "Correo electrónico",
            "Email address",
            "Email",
        ],
    ),
    ColumnSpec::optional("quiz_score", &["Puntuación", "Score"]),
    ColumnSpec::optional(
        "students",
        &[
            "Número de estudiantes",
            "Número de alumnos",
            "Estudiantes presentes",
            "Number of students",
            "Students",
        ],
    ),
    ColumnSpec::optional(
        "strengths",
        &["Fortalezas", "Fortalezas observadas", "Strengths"],
    ),
    ColumnSpec::optional(
        "improvements",
        &[
            "Áreas de oportunidad",
            "Áreas de mejora",
            "Recomendaciones",
            "Areas for improvement",
            "Improvements",
        ],
    ),
    ColumnSpec::optional(
        "comments",
        &["Comentarios", "Comentarios adicionales", "Observaciones", "Comments"],
    ),
];

/// Free-text columns that follow the rubric and so do not close the metadata block.
const FEEDBACK_KEYS: &[&str] = &["strengths", "improvements", "comments"];

/// Records plus what was lost on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedObservations {
    pub records: Vec<ObservationRecord>,
    pub skipped: usize,
    /// Rubric item headers in form order.
    pub rubric_items: Vec<String>,
}

pub fn parse_records(table: &Table) -> Result<ParsedObservations, ReportError> {
    if table.is_empty() {
        return Err(ReportError::EmptySource(table.name.clone()));
    }

    let columns = resolve_columns(table, OBSERVATION_COLUMNS).map_err(|error| {
        ReportError::Shape {
            error,
            preview: table.preview(5),
        }
    })?;
    let metadata_end = OBSERVATION_COLUMNS
        .iter()
        .filter(|spec| !FEEDBACK_KEYS.contains(&spec.key))
        .filter_map(|spec| columns.position(spec.key))
        .max();
    let (rubric, ignored): (Vec<usize>, Vec<usize>) = columns
        .unclaimed()
        .iter()
        .copied()
        .partition(|&col| metadata_end.map_or(true, |end| col > end));
    if !ignored.is_empty() {
        let headers: Vec<&str> = ignored.iter().map(|&col| table.headers[col].as_str()).collect();
        warn!(table = %table.name, ?headers, "ignoring unrecognized columns in the metadata block");
    }
    if rubric.len() > RUBRIC_ITEMS {
        warn!(
            table = %table.name,
            items = rubric.len(),
            expected = RUBRIC_ITEMS,
            "form has more rubric columns than the areas cover"
        );
    }
    let rubric_items = rubric.iter().map(|&col| table.headers[col].clone()).collect();

    let text = |row: usize, key: &str| -> Option<String> {
        columns
            .position(key)
            .map(|col| table.cell(row, col))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;

    for row in table.data_rows() {
        let (Some(timestamp), Some(service), Some(teacher)) = (
            text(row, "timestamp"),
            text(row, "service"),
            text(row, "teacher"),
        ) else {
            warn!(
                table = %table.name,
                row,
                "skipping observation without timestamp, service, or teacher"
            );
            skipped += 1;
            continue;
        };

        let observed_at = text(row, "observed_on")
            .and_then(|value| Cell::parse(&value).as_date())
            .or_else(|| Cell::parse(&timestamp).as_date());
        let responses = rubric
            .iter()
            .map(|&col| Cell::parse(table.cell(row, col)))
            .collect();

        records.push(ObservationRecord {
            row,
            timestamp,
            observed_at,
            service,
            teacher,
            group: text(row, "group"),
            observation_type: text(row, "observation_type"),
            observer: text(row, "observer").or_else(|| text(row, "email")),
            responses,
            feedback: QualitativeFeedback {
                strengths: text(row, "strengths"),
                improvements: text(row, "improvements"),
                comments: text(row, "comments"),
            },
        });
    }

    if records.is_empty() {
        return Err(ReportError::NoUsableRows {
            table: table.name.clone(),
            skipped,
        });
    }

    Ok(ParsedObservations {
        records,
        skipped,
        rubric_items,
    })
}
