use super::domain::Classification;

pub const CONSOLIDATED_MIN: f64 = 97.0;
pub const IN_PROGRESS_MIN: f64 = 76.0;

/// Buckets a point total (observation level) or an average total (teacher level).
///
/// | Value        | Classification   |
/// |--------------|------------------|
/// | >= 97        | Consolidated     |
/// | 76 ..= 96    | In progress      |
/// | <= 75        | Not consolidated |
///
/// Values between the integer bands take the lower label. `None` and NaN
/// cannot be classified.
pub fn classify(total: Option<f64>) -> Option<Classification> {
    match total {
        Some(t) if t.is_nan() => None,
        Some(t) if t >= CONSOLIDATED_MIN => Some(Classification::Consolidated),
        Some(t) if t >= IN_PROGRESS_MIN => Some(Classification::InProgress),
        Some(_) => Some(Classification::NotConsolidated),
        None => None,
    }
}

/// Label shown in tables; empty when the value cannot be classified.
pub fn classification_label(total: Option<f64>) -> &'static str {
    classify(total).map(Classification::label).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_land_on_documented_side() {
        assert_eq!(classify(Some(120.0)), Some(Classification::Consolidated));
        assert_eq!(classify(Some(97.0)), Some(Classification::Consolidated));
        assert_eq!(classify(Some(96.0)), Some(Classification::InProgress));
        assert_eq!(classify(Some(76.0)), Some(Classification::InProgress));
        assert_eq!(classify(Some(75.0)), Some(Classification::NotConsolidated));
        assert_eq!(classify(Some(0.0)), Some(Classification::NotConsolidated));
    }

    #[test]
    fn fractional_values_between_bands_take_lower_label() {
        assert_eq!(classify(Some(96.5)), Some(Classification::InProgress));
        assert_eq!(classify(Some(75.5)), Some(Classification::NotConsolidated));
    }

    #[test]
    fn undefined_values_have_empty_label() {
        assert_eq!(classify(None), None);
        assert_eq!(classify(Some(f64::NAN)), None);
        assert_eq!(classification_label(None), "");
        assert_eq!(classification_label(Some(85.0)), "In progress");
    }
}
