// Repository trait for vaccination and population datasets
use crate::domain::observation::VaccinationDataset;
use crate::domain::population::PopulationTable;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Latest snapshot of the vaccination dataset, gaps already filled
    async fn vaccination_dataset(&self) -> anyhow::Result<Arc<VaccinationDataset>>;

    /// Population table for the configured reference year
    async fn population_table(&self) -> anyhow::Result<Arc<PopulationTable>>;

    /// Drop any cached snapshots so the next call fetches again
    async fn invalidate(&self);
}
