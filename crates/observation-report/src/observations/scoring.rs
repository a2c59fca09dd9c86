use super::domain::Cell;
use crate::normalizer::normalize_name;

const AFFIRMATIVE: &[&str] = &["si", "yes", "x"];
const NO_EVIDENCE: &[&str] = &["no evidence", "no se evidencia", "sin evidencia"];
const NEGATIVE: &str = "no";

/// Point value of one rubric response, or `None` when the item does not apply.
///
/// | Response                         | Points        |
/// |----------------------------------|---------------|
/// | `sí`, `si`, `yes`, `x`           | 3             |
/// | contains a "no evidence" phrase  | 2             |
/// | `no`                             | 1             |
/// | finite number                    | the number    |
/// | anything else                    | `None`        |
///
/// Numbers pass through unscaled so numeric instruments keep their own range.
pub fn points_for(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(value) => Some(*value),
        Cell::Text(text) => points_for_text(text),
        Cell::Date(_) | Cell::Empty => None,
    }
}

/// Scores a raw spreadsheet value.
pub fn score_response(raw: &str) -> Option<f64> {
    points_for(&Cell::parse(raw))
}

fn points_for_text(text: &str) -> Option<f64> {
    let token = normalize_name(text);
    if AFFIRMATIVE.contains(&token.as_str()) {
        Some(3.0)
    } else if NO_EVIDENCE.iter().any(|phrase| token.contains(phrase)) {
        Some(2.0)
    } else if token == NEGATIVE {
        Some(1.0)
    } else {
        None
    }
}
