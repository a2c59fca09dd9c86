use serde::Serialize;

use super::super::domain::Classification;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationShare {
    pub classification: Classification,
    pub label: &'static str,
    pub count: usize,
    /// Share of the classified entries; `None` when nothing was classified.
    pub percentage: Option<f64>,
}

/// Counts per label in classification order. Unclassified entries are left out
/// of both the counts and the denominator.
pub fn classification_distribution<I>(classifications: I) -> Vec<ClassificationShare>
where
    I: IntoIterator<Item = Option<Classification>>,
{
    let mut counts = [0usize; 3];
    for classification in classifications.into_iter().flatten() {
        let slot = match classification {
            Classification::Consolidated => 0,
            Classification::InProgress => 1,
            Classification::NotConsolidated => 2,
        };
        counts[slot] += 1;
    }
    let classified: usize = counts.iter().sum();

    Classification::ordered()
        .into_iter()
        .zip(counts)
        .map(|(classification, count)| ClassificationShare {
            classification,
            label: classification.label(),
            count,
            percentage: (classified > 0).then(|| count as f64 / classified as f64 * 100.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_are_over_classified_entries() {
        let shares = classification_distribution([
            Some(Classification::Consolidated),
            Some(Classification::NotConsolidated),
            Some(Classification::NotConsolidated),
            Some(Classification::NotConsolidated),
            None,
        ]);

        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].count, 1);
        assert_eq!(shares[0].percentage, Some(25.0));
        assert_eq!(shares[1].count, 0);
        assert_eq!(shares[1].percentage, Some(0.0));
        assert_eq!(shares[2].label, "Not consolidated");
        assert_eq!(shares[2].percentage, Some(75.0));
    }

    #[test]
    fn nothing_classified_has_no_percentages() {
        let shares = classification_distribution([None, None]);
        assert!(shares.iter().all(|share| share.count == 0 && share.percentage.is_none()));
    }
}
