use std::ops::Range;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Period label for observations outside every cutoff interval.
pub const NO_PERIOD: &str = "No period";

/// Number of rubric items the area partition is defined over.
pub const RUBRIC_ITEMS: usize = 40;

/// A spreadsheet cell after ingestion. Nothing downstream looks at raw strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
    Empty,
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        if let Ok(number) = trimmed.parse::<f64>() {
            if number.is_finite() {
                return Self::Number(number);
            }
        }

        if let Some(date) = parse_datetime(trimmed) {
            return Self::Date(date);
        }

        Self::Text(trimmed.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }
}

/// Form exports mix ISO timestamps with day-first local ones.
pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Consolidated,
    InProgress,
    NotConsolidated,
}

impl Classification {
    pub const fn ordered() -> [Self; 3] {
        [Self::Consolidated, Self::InProgress, Self::NotConsolidated]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Consolidated => "Consolidated",
            Self::InProgress => "In progress",
            Self::NotConsolidated => "Not consolidated",
        }
    }
}

/// The four rubric areas, each a contiguous slice of item positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Planning,
    Instruction,
    Assessment,
    Climate,
}

impl Area {
    pub const fn ordered() -> [Self; 4] {
        [Self::Planning, Self::Instruction, Self::Assessment, Self::Climate]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Planning => "Planning and organization",
            Self::Instruction => "Teaching and learning process",
            Self::Assessment => "Assessment",
            Self::Climate => "Classroom climate",
        }
    }

    pub const fn items(self) -> Range<usize> {
        match self {
            Self::Planning => 0..14,
            Self::Instruction => 14..30,
            Self::Assessment => 30..34,
            Self::Climate => 34..RUBRIC_ITEMS,
        }
    }

    pub fn for_item(position: usize) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|area| area.items().contains(&position))
    }
}

/// Free-text answers kept for the observation detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualitativeFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// One usable row of the observation form export.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// Zero-based data row in the source export, blank rows included.
    pub row: usize,
    pub timestamp: String,
    /// Observation date column when it parses, otherwise the submission timestamp.
    pub observed_at: Option<NaiveDateTime>,
    pub service: String,
    pub teacher: String,
    pub group: Option<String>,
    pub observation_type: Option<String>,
    pub observer: Option<String>,
    pub responses: Vec<Cell>,
    pub feedback: QualitativeFeedback,
}
