// Milestone domain models
use super::observation::ObservationSeries;
use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Doses a person needs before counting as fully covered.
pub const DEFAULT_DOSES_PER_COMPLETION: u32 = 2;

pub const DEFAULT_THRESHOLDS: [f64; 6] = [10.0, 30.0, 50.0, 70.0, 80.0, 100.0];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("population must be positive, got {population}")]
    InvalidPopulation { population: i64 },

    #[error("cannot project from a daily rate of {daily_count}")]
    ZeroOrNegativeRate { daily_count: i64 },

    #[error("doses per completion must be at least 1")]
    InvalidDosesPerCompletion,

    #[error("no observations for location")]
    EmptySeries,

    #[error("observation on {date} is not after the previous one")]
    UnorderedObservations { date: NaiveDate },

    #[error("negative daily count on {date}")]
    NegativeDailyCount { date: NaiveDate },

    #[error("projected date is {days} days away and out of calendar range")]
    DateOutOfRange { days: i64 },
}

/// Latest known state of a location, the input to every projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFact {
    pub population: i64,
    pub latest_date: NaiveDate,
    pub latest_daily_count: i64,
    pub latest_cumulative_count: i64,
    pub fully_covered_count: f64,
}

impl LocationFact {
    pub fn from_series(
        series: &ObservationSeries,
        population: i64,
        doses_per_completion: u32,
    ) -> Result<Self, ProjectionError> {
        if population <= 0 {
            return Err(ProjectionError::InvalidPopulation { population });
        }
        if doses_per_completion == 0 {
            return Err(ProjectionError::InvalidDosesPerCompletion);
        }
        let latest = series.latest().ok_or(ProjectionError::EmptySeries)?;

        Ok(Self {
            population,
            latest_date: latest.date,
            latest_daily_count: latest.daily_count,
            latest_cumulative_count: latest.cumulative_count,
            fully_covered_count: latest.cumulative_count as f64 / f64::from(doses_per_completion),
        })
    }

    /// Share of the population fully covered at the latest date, in percent
    pub fn percent_fully_covered(&self) -> f64 {
        self.fully_covered_count * 100.0 / self.population as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MilestoneStatus {
    /// Observed in the data
    Reached {
        date: NaiveDate,
        cumulative_count: i64,
    },
    /// Extrapolated from the latest daily rate
    Projected { date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneResult {
    pub threshold_percent: f64,
    pub target_completed_count: f64,
    pub target_dose_count: f64,
    pub is_reached: bool,
    pub status: MilestoneStatus,
    pub days_remaining: i64,
}

impl MilestoneResult {
    pub fn date(&self) -> NaiveDate {
        match self.status {
            MilestoneStatus::Reached { date, .. } | MilestoneStatus::Projected { date } => date,
        }
    }

    /// Dose count to mark on a chart: observed when reached, target otherwise
    pub fn marker_count(&self) -> f64 {
        match self.status {
            MilestoneStatus::Reached {
                cumulative_count, ..
            } => cumulative_count as f64,
            MilestoneStatus::Projected { .. } => self.target_dose_count,
        }
    }
}

/// Outcome for one threshold; failures stay local to that threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneEvaluation {
    pub threshold_percent: f64,
    pub outcome: Result<MilestoneResult, ProjectionError>,
}

impl Serialize for MilestoneEvaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MilestoneEvaluation", 3)?;
        state.serialize_field("thresholdPercent", &self.threshold_percent)?;
        match &self.outcome {
            Ok(result) => {
                state.serialize_field("result", result)?;
                state.skip_field("error")?;
            }
            Err(e) => {
                state.skip_field("result")?;
                state.serialize_field("error", &e.to_string())?;
            }
        }
        state.end()
    }
}
