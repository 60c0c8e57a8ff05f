// Dataset repository backed by HTTP or local CSV sources
use crate::application::dataset_repository::DatasetRepository;
use crate::domain::observation::VaccinationDataset;
use crate::domain::population::PopulationTable;
use crate::infrastructure::config::SourceSettings;
use crate::infrastructure::csv_dataset::{parse_population_csv, parse_vaccination_csv};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct CacheEntry<T> {
    fetched_at: DateTime<Utc>,
    value: Arc<T>,
}

/// Parsed datasets keyed by source identity, each stamped with its fetch time.
#[derive(Debug)]
struct DatasetCache<T> {
    ttl: TimeDelta,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> DatasetCache<T> {
    fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, identity: &str, now: DateTime<Utc>) -> Option<Arc<T>> {
        let entries = self.entries.read().await;
        entries
            .get(identity)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| entry.value.clone())
    }

    async fn insert(&self, identity: &str, fetched_at: DateTime<Utc>, value: Arc<T>) {
        let mut entries = self.entries.write().await;
        entries.insert(identity.to_string(), CacheEntry { fetched_at, value });
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

pub struct SourceRepository {
    client: reqwest::Client,
    settings: SourceSettings,
    vaccinations: DatasetCache<VaccinationDataset>,
    populations: DatasetCache<PopulationTable>,
}

impl SourceRepository {
    pub fn new(settings: SourceSettings) -> Self {
        let ttl = TimeDelta::from_std(settings.cache_ttl()).unwrap_or(TimeDelta::MAX);

        Self {
            client: reqwest::Client::new(),
            vaccinations: DatasetCache::new(ttl),
            populations: DatasetCache::new(ttl),
            settings,
        }
    }

    async fn fetch_text(&self, source: &str) -> Result<String> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let response = self
                .client
                .get(source)
                .send()
                .await
                .with_context(|| format!("Failed to request {}", source))?;

            if !response.status().is_success() {
                anyhow::bail!("Fetching {} failed with status {}", source, response.status());
            }

            response
                .text()
                .await
                .with_context(|| format!("Failed to read body of {}", source))
        } else {
            tokio::fs::read_to_string(source)
                .await
                .with_context(|| format!("Failed to read {}", source))
        }
    }
}

#[async_trait]
impl DatasetRepository for SourceRepository {
    async fn vaccination_dataset(&self) -> Result<Arc<VaccinationDataset>> {
        let source = &self.settings.vaccinations;
        let now = Utc::now();
        if let Some(dataset) = self.vaccinations.get(source, now).await {
            return Ok(dataset);
        }

        tracing::info!("Fetching vaccination data from {}", source);
        let body = self.fetch_text(source).await?;
        let dataset = Arc::new(
            parse_vaccination_csv(body.as_bytes())
                .with_context(|| format!("Failed to parse vaccination data from {}", source))?,
        );
        tracing::info!("Loaded vaccination data for {} locations", dataset.len());

        self.vaccinations.insert(source, now, dataset.clone()).await;
        Ok(dataset)
    }

    async fn population_table(&self) -> Result<Arc<PopulationTable>> {
        let source = &self.settings.population;
        let now = Utc::now();
        if let Some(table) = self.populations.get(source, now).await {
            return Ok(table);
        }

        tracing::info!("Fetching population data from {}", source);
        let body = self.fetch_text(source).await?;
        let table = Arc::new(
            parse_population_csv(
                body.as_bytes(),
                &self.settings.reference_year,
                self.settings.population_scale,
            )
            .with_context(|| format!("Failed to parse population data from {}", source))?,
        );
        tracing::info!(
            "Loaded {} population records for {}",
            table.len(),
            table.reference_year
        );

        self.populations.insert(source, now, table.clone()).await;
        Ok(table)
    }

    async fn invalidate(&self) {
        tracing::info!("Invalidating cached datasets");
        self.vaccinations.clear().await;
        self.populations.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "vaccination-goals-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn settings(vaccinations: &Path, population: &Path, ttl_secs: u64) -> SourceSettings {
        SourceSettings {
            vaccinations: vaccinations.to_string_lossy().into_owned(),
            population: population.to_string_lossy().into_owned(),
            reference_year: "2020".to_string(),
            population_scale: 1,
            cache_ttl_secs: ttl_secs,
        }
    }

    #[tokio::test]
    async fn test_cached_until_invalidated() {
        let vaccinations = temp_file(
            "cache-vacc.csv",
            "date,location,daily_vaccinations\n2021-01-01,Peru,1\n",
        );
        let population = temp_file("cache-pop.csv", "location,code,year,population\nPeru,PER,2020,100\n");
        let repository = SourceRepository::new(settings(&vaccinations, &population, 3600));

        let first = repository.vaccination_dataset().await.unwrap();
        assert_eq!(first.locations(), vec!["Peru"]);

        std::fs::write(
            &vaccinations,
            "date,location,daily_vaccinations\n2021-01-01,Chile,1\n",
        )
        .unwrap();
        let cached = repository.vaccination_dataset().await.unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        repository.invalidate().await;
        let refreshed = repository.vaccination_dataset().await.unwrap();
        assert_eq!(refreshed.locations(), vec!["Chile"]);

        let table = repository.population_table().await.unwrap();
        assert_eq!(table.resolve("PER").unwrap().population, 100);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let vaccinations = temp_file(
            "ttl-vacc.csv",
            "date,location,daily_vaccinations\n2021-01-01,Peru,1\n",
        );
        let population = temp_file("ttl-pop.csv", "location,code,year,population\n");
        let repository = SourceRepository::new(settings(&vaccinations, &population, 0));

        let first = repository.vaccination_dataset().await.unwrap();
        let second = repository.vaccination_dataset().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let missing = std::env::temp_dir().join("vaccination-goals-does-not-exist.csv");
        let repository = SourceRepository::new(settings(&missing, &missing, 60));

        let err = repository.vaccination_dataset().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_cache_entry_expires() {
        let cache: DatasetCache<u32> = DatasetCache::new(TimeDelta::seconds(10));
        let fetched_at = Utc::now();
        cache.insert("source", fetched_at, Arc::new(7)).await;

        assert_eq!(cache.get("source", fetched_at + TimeDelta::seconds(9)).await, Some(Arc::new(7)));
        assert_eq!(cache.get("source", fetched_at + TimeDelta::seconds(10)).await, None);
        assert_eq!(cache.get("other", fetched_at).await, None);
    }
}
