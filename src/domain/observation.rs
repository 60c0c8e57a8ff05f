// Vaccination observation domain models
use super::milestone::ProjectionError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub date: NaiveDate,
    pub daily_count: i64,
    pub cumulative_count: i64,
}

/// Daily observations for a single location, ascending by date with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSeries {
    pub location: String,
    observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Build a series from `(date, daily_count)` pairs, accumulating the running total.
    pub fn new(
        location: impl Into<String>,
        daily: impl IntoIterator<Item = (NaiveDate, i64)>,
    ) -> Result<Self, ProjectionError> {
        let mut observations: Vec<Observation> = Vec::new();
        let mut cumulative = 0i64;

        for (date, daily_count) in daily {
            if daily_count < 0 {
                return Err(ProjectionError::NegativeDailyCount { date });
            }
            if let Some(previous) = observations.last() {
                if date <= previous.date {
                    return Err(ProjectionError::UnorderedObservations { date });
                }
            }

            cumulative = cumulative.saturating_add(daily_count);
            observations.push(Observation {
                date,
                daily_count,
                cumulative_count: cumulative,
            });
        }

        Ok(Self {
            location: location.into(),
            observations,
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Every location's series from one snapshot of the vaccination source.
#[derive(Debug, Clone, Default)]
pub struct VaccinationDataset {
    series: BTreeMap<String, ObservationSeries>,
}

impl VaccinationDataset {
    pub fn new(series: impl IntoIterator<Item = ObservationSeries>) -> Self {
        Self {
            series: series
                .into_iter()
                .map(|s| (s.location.clone(), s))
                .collect(),
        }
    }

    /// Location names in sorted order
    pub fn locations(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    pub fn series_for(&self, location: &str) -> Option<&ObservationSeries> {
        self.series.get(location)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    #[test]
    fn test_cumulative_count_is_running_sum() {
        let series = ObservationSeries::new("Israel", vec![(day(1), 10), (day(2), 0), (day(3), 25)])
            .unwrap();

        let cumulative: Vec<i64> = series
            .observations()
            .iter()
            .map(|o| o.cumulative_count)
            .collect();
        assert_eq!(cumulative, vec![10, 10, 35]);
        assert_eq!(series.latest().unwrap().date, day(3));
        assert_eq!(series.first().unwrap().date, day(1));
    }

    #[test]
    fn test_rejects_unordered_and_duplicate_dates() {
        let err = ObservationSeries::new("Chile", vec![(day(2), 1), (day(1), 1)]).unwrap_err();
        assert_eq!(err, ProjectionError::UnorderedObservations { date: day(1) });

        let err = ObservationSeries::new("Chile", vec![(day(2), 1), (day(2), 1)]).unwrap_err();
        assert_eq!(err, ProjectionError::UnorderedObservations { date: day(2) });
    }

    #[test]
    fn test_rejects_negative_daily_count() {
        let err = ObservationSeries::new("Chile", vec![(day(1), 5), (day(2), -1)]).unwrap_err();
        assert_eq!(err, ProjectionError::NegativeDailyCount { date: day(2) });
    }

    #[test]
    fn test_dataset_lists_sorted_locations() {
        let dataset = VaccinationDataset::new(vec![
            ObservationSeries::new("Wales", vec![(day(1), 1)]).unwrap(),
            ObservationSeries::new("Austria", vec![(day(1), 1)]).unwrap(),
        ]);

        assert_eq!(dataset.locations(), vec!["Austria", "Wales"]);
        assert!(dataset.series_for("Wales").is_some());
        assert!(dataset.series_for("Narnia").is_none());
    }
}
