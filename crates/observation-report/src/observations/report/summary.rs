use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::super::classify::classify;
use super::super::cutoffs::CutoffTable;
use super::super::domain::{Classification, NO_PERIOD};
use super::super::pipeline::EnrichedObservation;
use crate::normalizer::normalize_name;

/// `sum / count`, undefined for an empty group.
pub fn average(sum: f64, count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSummary {
    pub program_id: String,
    pub program_name: String,
    pub observations: usize,
    pub teachers: usize,
    pub total_points: f64,
    pub average_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherSummary {
    pub teacher: String,
    pub observations: usize,
    pub total_points: f64,
    pub average_points: Option<f64>,
    /// Classified on the average total per observation.
    pub classification: Option<Classification>,
    pub classification_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: String,
    pub observations: usize,
    pub total_points: f64,
    pub average_points: Option<f64>,
}

/// One row per resolved program, sorted by program name.
pub fn summarize_services(observations: &[&EnrichedObservation]) -> Vec<ServiceSummary> {
    #[derive(Default)]
    struct Group<'a> {
        name: &'a str,
        count: usize,
        points: f64,
        teachers: HashSet<String>,
    }

    let mut groups: HashMap<&str, Group> = HashMap::new();
    for observation in observations {
        let group = groups.entry(observation.program.id.as_str()).or_default();
        group.name = observation.program.name.as_str();
        group.count += 1;
        group.points += observation.total_points;
        group.teachers.insert(normalize_name(&observation.record.teacher));
    }

    let mut summaries: Vec<ServiceSummary> = groups
        .into_iter()
        .map(|(program_id, group)| ServiceSummary {
            program_id: program_id.to_string(),
            program_name: group.name.to_string(),
            observations: group.count,
            teachers: group.teachers.len(),
            total_points: group.points,
            average_points: average(group.points, group.count),
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.program_name
            .cmp(&b.program_name)
            .then_with(|| a.program_id.cmp(&b.program_id))
    });
    summaries
}

/// One row per teacher, ordered Consolidated → In progress → Not consolidated
/// (unclassified last), then by descending average.
///
/// Names are grouped after normalization; the first spelling seen is shown.
pub fn summarize_teachers(observations: &[&EnrichedObservation]) -> Vec<TeacherSummary> {
    let mut groups: HashMap<String, (&str, usize, f64)> = HashMap::new();
    for observation in observations {
        let teacher = observation.record.teacher.as_str();
        let entry = groups
            .entry(normalize_name(teacher))
            .or_insert((teacher, 0, 0.0));
        entry.1 += 1;
        entry.2 += observation.total_points;
    }

    let mut summaries: Vec<TeacherSummary> = groups
        .into_values()
        .map(|(teacher, count, points)| {
            let average_points = average(points, count);
            let classification = classify(average_points);
            TeacherSummary {
                teacher: teacher.to_string(),
                observations: count,
                total_points: points,
                average_points,
                classification,
                classification_label: classification.map(Classification::label).unwrap_or(""),
            }
        })
        .collect();

    summaries.sort_by(compare_teachers);
    summaries
}

fn compare_teachers(a: &TeacherSummary, b: &TeacherSummary) -> Ordering {
    let by_class = match (a.classification, b.classification) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let by_average = match (a.average_points, b.average_points) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_class
        .then(by_average)
        .then_with(|| a.teacher.cmp(&b.teacher))
}

/// Observations per period in cutoff-table order, then `No period` when present.
pub fn summarize_periods(
    observations: &[&EnrichedObservation],
    cutoffs: &CutoffTable,
) -> Vec<PeriodSummary> {
    let mut labels: Vec<&str> = Vec::new();
    for period in cutoffs.periods() {
        if !labels.contains(&period.label.as_str()) {
            labels.push(period.label.as_str());
        }
    }
    labels.push(NO_PERIOD);

    labels
        .into_iter()
        .filter_map(|label| {
            let (count, points) = observations
                .iter()
                .filter(|observation| observation.period == label)
                .fold((0usize, 0.0f64), |(count, points), observation| {
                    (count + 1, points + observation.total_points)
                });
            (count > 0).then(|| PeriodSummary {
                period: label.to_string(),
                observations: count,
                total_points: points,
                average_points: average(points, count),
            })
        })
        .collect()
}
