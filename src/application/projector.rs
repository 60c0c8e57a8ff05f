// Goal projector - Milestone crossings and linear projections for one location
use crate::domain::milestone::{
    DEFAULT_DOSES_PER_COMPLETION, DEFAULT_THRESHOLDS, LocationFact, MilestoneEvaluation,
    MilestoneResult, MilestoneStatus, ProjectionError,
};
use crate::domain::observation::ObservationSeries;
use chrono::{NaiveDate, TimeDelta};

/// Thresholds to evaluate and the dose policy that defines full coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPolicy {
    pub thresholds: Vec<f64>,
    pub doses_per_completion: u32,
}

impl Default for ProjectionPolicy {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            doses_per_completion: DEFAULT_DOSES_PER_COMPLETION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentPoint {
    pub date: NaiveDate,
    pub cumulative_count: i64,
    pub percent_complete: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentSeries {
    points: Vec<PercentPoint>,
}

impl PercentSeries {
    pub fn points(&self) -> &[PercentPoint] {
        &self.points
    }

    /// Largest increase between two consecutive observations. The first
    /// observation counts as a step up from zero.
    pub fn largest_step(&self) -> f64 {
        let opening = self.points.first().map_or(0.0, |p| p.percent_complete.abs());

        self.points
            .windows(2)
            .map(|w| (w[1].percent_complete - w[0].percent_complete).abs())
            .fold(opening, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub date: NaiveDate,
    pub cumulative_count: i64,
    pub percent_complete: f64,
}

/// Share of the population fully covered on each observed day, in percent.
pub fn compute_percent_complete(
    series: &ObservationSeries,
    population: i64,
    doses_per_completion: u32,
) -> Result<PercentSeries, ProjectionError> {
    if population <= 0 {
        return Err(ProjectionError::InvalidPopulation { population });
    }
    if doses_per_completion == 0 {
        return Err(ProjectionError::InvalidDosesPerCompletion);
    }

    let denominator = population as f64 * f64::from(doses_per_completion);
    let points = series
        .observations()
        .iter()
        .map(|o| PercentPoint {
            date: o.date,
            cumulative_count: o.cumulative_count,
            percent_complete: o.cumulative_count as f64 * 100.0 / denominator,
        })
        .collect();

    Ok(PercentSeries { points })
}

/// Find the observation closest to `threshold_percent`.
///
/// Only thresholds the data has reached count. Daily data can step over a
/// threshold, so the nearest value counts as the crossing as long as it is no
/// further away than the largest single-day step in the series. Anything
/// further is treated as not observed. On ties the earliest observation wins.
pub fn find_milestone_crossing(series: &PercentSeries, threshold_percent: f64) -> Option<Crossing> {
    if !threshold_percent.is_finite() {
        return None;
    }
    if !series
        .points()
        .iter()
        .any(|p| p.percent_complete >= threshold_percent)
    {
        return None;
    }

    let mut nearest: Option<(&PercentPoint, f64)> = None;

    for point in series.points() {
        let distance = (point.percent_complete - threshold_percent).abs();
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((point, distance));
        }
    }

    let (point, distance) = nearest?;
    let tolerance = series.largest_step();
    if distance > tolerance {
        tracing::debug!(
            "Nearest value {:.2}% is {:.2} away from {}%, beyond the largest step {:.2}",
            point.percent_complete,
            distance,
            threshold_percent,
            tolerance
        );
        return None;
    }

    Some(Crossing {
        date: point.date,
        cumulative_count: point.cumulative_count,
        percent_complete: point.percent_complete,
    })
}

/// Extrapolate the date `threshold_percent` is reached at the latest daily rate.
pub fn project_milestone(
    fact: &LocationFact,
    threshold_percent: f64,
    doses_per_completion: u32,
) -> Result<MilestoneResult, ProjectionError> {
    if fact.population <= 0 {
        return Err(ProjectionError::InvalidPopulation {
            population: fact.population,
        });
    }
    if doses_per_completion == 0 {
        return Err(ProjectionError::InvalidDosesPerCompletion);
    }
    if fact.latest_daily_count <= 0 {
        return Err(ProjectionError::ZeroOrNegativeRate {
            daily_count: fact.latest_daily_count,
        });
    }

    let doses = f64::from(doses_per_completion);
    let target = fact.population as f64 * threshold_percent / 100.0;
    let remaining =
        ((target - fact.fully_covered_count) / fact.latest_daily_count as f64 * doses).floor();

    // `as` saturates, the checked add below catches anything past the calendar
    let days_remaining = remaining as i64;
    let projected_date = TimeDelta::try_days(days_remaining)
        .and_then(|delta| fact.latest_date.checked_add_signed(delta))
        .ok_or(ProjectionError::DateOutOfRange {
            days: days_remaining,
        })?;

    Ok(MilestoneResult {
        threshold_percent,
        target_completed_count: target,
        target_dose_count: target * doses,
        is_reached: days_remaining <= 0,
        status: MilestoneStatus::Projected {
            date: projected_date,
        },
        days_remaining,
    })
}

/// Evaluate every threshold, preferring an observed crossing over a projection.
///
/// An empty series or a bad population fails the whole location. Every other
/// failure is recorded against its own threshold.
pub fn evaluate_all_milestones(
    series: &ObservationSeries,
    population: i64,
    policy: &ProjectionPolicy,
) -> Result<Vec<MilestoneEvaluation>, ProjectionError> {
    let fact = LocationFact::from_series(series, population, policy.doses_per_completion)?;
    evaluate_milestones_for_fact(series, &fact, policy)
}

/// Same as [`evaluate_all_milestones`] for callers that already hold the fact
/// derived from `series`.
pub fn evaluate_milestones_for_fact(
    series: &ObservationSeries,
    fact: &LocationFact,
    policy: &ProjectionPolicy,
) -> Result<Vec<MilestoneEvaluation>, ProjectionError> {
    let percent = compute_percent_complete(series, fact.population, policy.doses_per_completion)?;

    Ok(policy
        .thresholds
        .iter()
        .map(|&threshold_percent| MilestoneEvaluation {
            threshold_percent,
            outcome: resolve_milestone(&percent, fact, threshold_percent, policy.doses_per_completion),
        })
        .collect())
}

fn resolve_milestone(
    percent: &PercentSeries,
    fact: &LocationFact,
    threshold_percent: f64,
    doses_per_completion: u32,
) -> Result<MilestoneResult, ProjectionError> {
    let Some(crossing) = find_milestone_crossing(percent, threshold_percent) else {
        return project_milestone(fact, threshold_percent, doses_per_completion);
    };

    tracing::debug!(
        "{}% observed on {} at {:.2}%",
        threshold_percent,
        crossing.date,
        crossing.percent_complete
    );

    let target = fact.population as f64 * threshold_percent / 100.0;
    Ok(MilestoneResult {
        threshold_percent,
        target_completed_count: target,
        target_dose_count: target * f64::from(doses_per_completion),
        is_reached: true,
        status: MilestoneStatus::Reached {
            date: crossing.date,
            cumulative_count: crossing.cumulative_count,
        },
        days_remaining: (crossing.date - fact.latest_date).num_days(),
    })
}
