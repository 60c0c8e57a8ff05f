// Goal service - Use case for evaluating vaccination goals per location
use crate::application::dataset_repository::DatasetRepository;
use crate::application::projector::{ProjectionPolicy, evaluate_milestones_for_fact};
use crate::domain::figure::GoalFigure;
use crate::domain::milestone::{LocationFact, MilestoneEvaluation, ProjectionError};
use crate::domain::observation::{Observation, VaccinationDataset};
use crate::domain::population::PopulationTable;
use crate::infrastructure::figure_mapper::report_to_figure;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoalError {
    #[error("no vaccination data for {location}")]
    UnknownLocation { location: String },

    #[error("no population figure for {location}")]
    UnresolvedLocation { location: String },

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("dataset unavailable: {0:#}")]
    Dataset(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub location: String,
    pub population: i64,
    pub reference_year: String,
    pub doses_per_completion: u32,
    pub vaccination_started: NaiveDate,
    pub fact: LocationFact,
    pub milestones: Vec<MilestoneEvaluation>,
    pub series: Vec<Observation>,
}

#[derive(Debug)]
pub struct LocationOutcome {
    pub location: String,
    pub result: Result<LocationReport, GoalError>,
}

#[derive(Clone)]
pub struct GoalService {
    repository: Arc<dyn DatasetRepository>,
    policy: ProjectionPolicy,
    headline_threshold: f64,
}

impl GoalService {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        policy: ProjectionPolicy,
        headline_threshold: f64,
    ) -> Self {
        Self {
            repository,
            policy,
            headline_threshold,
        }
    }

    pub async fn list_locations(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.repository.vaccination_dataset().await?.locations())
    }

    pub async fn evaluate_location(&self, location: &str) -> Result<LocationReport, GoalError> {
        let dataset = self.repository.vaccination_dataset().await?;
        let populations = self.repository.population_table().await?;

        self.evaluate_in(&dataset, &populations, location)
    }

    /// Evaluate several locations against one snapshot. A failing location
    /// is recorded in its outcome and the rest still run.
    pub async fn evaluate_locations(
        &self,
        locations: &[String],
    ) -> Result<Vec<LocationOutcome>, GoalError> {
        let dataset = self.repository.vaccination_dataset().await?;
        let populations = self.repository.population_table().await?;

        let outcomes = locations
            .iter()
            .map(|location| {
                let result = self.evaluate_in(&dataset, &populations, location);
                if let Err(e) = &result {
                    tracing::warn!("Skipping {}: {}", location, e);
                }
                LocationOutcome {
                    location: location.clone(),
                    result,
                }
            })
            .collect();

        Ok(outcomes)
    }

    /// Drop cached datasets so the next evaluation sees fresh data
    pub async fn refresh(&self) {
        self.repository.invalidate().await;
    }

    pub async fn figure_for(&self, location: &str) -> Result<GoalFigure, GoalError> {
        let report = self.evaluate_location(location).await?;
        Ok(report_to_figure(&report, self.headline_threshold))
    }

    fn evaluate_in(
        &self,
        dataset: &VaccinationDataset,
        populations: &PopulationTable,
        location: &str,
    ) -> Result<LocationReport, GoalError> {
        let series = dataset
            .series_for(location)
            .ok_or_else(|| GoalError::UnknownLocation {
                location: location.to_string(),
            })?;
        let population = populations
            .resolve(location)
            .ok_or_else(|| GoalError::UnresolvedLocation {
                location: location.to_string(),
            })?
            .population;

        let fact = LocationFact::from_series(series, population, self.policy.doses_per_completion)?;
        let milestones = evaluate_milestones_for_fact(series, &fact, &self.policy)?;
        let vaccination_started = series.first().ok_or(ProjectionError::EmptySeries)?.date;

        tracing::debug!(
            "Evaluated {} milestones for {} (population {})",
            milestones.len(),
            location,
            population
        );

        Ok(LocationReport {
            location: location.to_string(),
            population,
            reference_year: populations.reference_year.clone(),
            doses_per_completion: self.policy.doses_per_completion,
            vaccination_started,
            fact,
            milestones,
            series: series.observations().to_vec(),
        })
    }
}
