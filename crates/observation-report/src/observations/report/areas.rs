use serde::Serialize;

use super::super::domain::Area;
use super::super::pipeline::EnrichedObservation;

/// Highest point value a single scored item is worth.
const MAX_ITEM_POINTS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaBreakdown {
    pub area: Area,
    pub area_label: &'static str,
    pub points: f64,
    /// 3 points for every answered item; unanswered items are not counted.
    pub max_points: f64,
    pub answered: usize,
    pub percentage: Option<f64>,
}

/// Sums points per area across `observations` (a single observation or every
/// observation of one teacher).
pub fn area_breakdown(observations: &[&EnrichedObservation]) -> Vec<AreaBreakdown> {
    Area::ordered()
        .into_iter()
        .map(|area| {
            let (points, answered) = observations
                .iter()
                .flat_map(|observation| {
                    let items = area.items();
                    observation
                        .points
                        .iter()
                        .skip(items.start)
                        .take(items.len())
                })
                .flatten()
                .fold((0.0f64, 0usize), |(points, answered), value| {
                    (points + value, answered + 1)
                });

            let max_points = MAX_ITEM_POINTS * answered as f64;
            AreaBreakdown {
                area,
                area_label: area.label(),
                points,
                max_points,
                answered,
                percentage: percentage(points, max_points),
            }
        })
        .collect()
}

fn percentage(points: f64, max_points: f64) -> Option<f64> {
    if max_points == 0.0 {
        None
    } else {
        Some(points / max_points * 100.0)
    }
}
