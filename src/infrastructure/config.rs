use crate::application::projector::ProjectionPolicy;
use crate::domain::milestone::{DEFAULT_DOSES_PER_COMPLETION, DEFAULT_THRESHOLDS};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GoalsConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub sources: SourceSettings,
    #[serde(default)]
    pub projection: ProjectionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    /// URL or local path of the vaccination CSV
    pub vaccinations: String,
    /// URL or local path of the population CSV
    pub population: String,
    #[serde(default = "default_reference_year")]
    pub reference_year: String,
    /// Multiplier applied to population values (UN tables are in thousands)
    #[serde(default = "default_population_scale")]
    pub population_scale: i64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl SourceSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectionSettings {
    #[serde(default = "default_doses_per_completion")]
    pub doses_per_completion: u32,
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
    #[serde(default = "default_headline_threshold")]
    pub headline_threshold: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            doses_per_completion: default_doses_per_completion(),
            thresholds: default_thresholds(),
            headline_threshold: default_headline_threshold(),
        }
    }
}

impl ProjectionSettings {
    pub fn policy(&self) -> ProjectionPolicy {
        ProjectionPolicy {
            thresholds: self.thresholds.clone(),
            doses_per_completion: self.doses_per_completion,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_reference_year() -> String {
    "2020".to_string()
}

fn default_population_scale() -> i64 {
    1
}

fn default_cache_ttl_secs() -> u64 {
    6 * 60 * 60
}

fn default_doses_per_completion() -> u32 {
    DEFAULT_DOSES_PER_COMPLETION
}

fn default_thresholds() -> Vec<f64> {
    DEFAULT_THRESHOLDS.to_vec()
}

fn default_headline_threshold() -> f64 {
    70.0
}

/// Load `config/goals.*`, then apply `GOALS__SECTION__KEY` environment overrides
pub fn load_goals_config() -> anyhow::Result<GoalsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/goals"))
        .add_source(
            config::Environment::with_prefix("GOALS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let goals: GoalsConfig = settings.try_deserialize()?;
    validate(&goals)?;
    Ok(goals)
}

fn validate(goals: &GoalsConfig) -> anyhow::Result<()> {
    if goals.projection.doses_per_completion == 0 {
        anyhow::bail!("projection.doses_per_completion must be at least 1");
    }
    if goals.sources.population_scale <= 0 {
        anyhow::bail!("sources.population_scale must be positive");
    }
    if let Some(bad) = goals
        .projection
        .thresholds
        .iter()
        .find(|t| !t.is_finite() || **t <= 0.0)
    {
        anyhow::bail!("projection.thresholds contains invalid value {}", bad);
    }
    let headline = goals.projection.headline_threshold;
    if !goals.projection.thresholds.contains(&headline) {
        anyhow::bail!(
            "projection.headline_threshold {} is not one of projection.thresholds",
            headline
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(toml: &str) -> GoalsConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let goals = parse(
            r#"
            [sources]
            vaccinations = "data/vaccinations.csv"
            population = "data/population.csv"
            "#,
        );

        assert_eq!(goals.server.bind, "0.0.0.0:8080");
        assert_eq!(goals.sources.reference_year, "2020");
        assert_eq!(goals.sources.population_scale, 1);
        assert_eq!(goals.sources.cache_ttl(), Duration::from_secs(21_600));
        assert_eq!(goals.projection.policy(), ProjectionPolicy::default());
        assert_eq!(goals.projection.headline_threshold, 70.0);
        assert!(validate(&goals).is_ok());
    }

    #[test]
    fn test_explicit_projection_settings() {
        let goals = parse(
            r#"
            [sources]
            vaccinations = "https://example.org/vaccinations.csv"
            population = "data/population.csv"
            population_scale = 1000

            [projection]
            doses_per_completion = 1
            thresholds = [25.0, 75.0]
            headline_threshold = 75.0
            "#,
        );

        let policy = goals.projection.policy();
        assert_eq!(policy.thresholds, vec![25.0, 75.0]);
        assert_eq!(policy.doses_per_completion, 1);
        assert_eq!(goals.sources.population_scale, 1000);
        assert!(validate(&goals).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_doses() {
        let goals = parse(
            r#"
            [sources]
            vaccinations = "v.csv"
            population = "p.csv"

            [projection]
            doses_per_completion = 0
            "#,
        );

        assert!(validate(&goals).is_err());
    }

    #[test]
    fn test_validate_rejects_headline_outside_thresholds() {
        let goals = parse(
            r#"
            [sources]
            vaccinations = "v.csv"
            population = "p.csv"

            [projection]
            thresholds = [25.0, 75.0]
            "#,
        );

        // default headline of 70 is not in the list
        let err = validate(&goals).unwrap_err();
        assert!(err.to_string().contains("headline_threshold"));
    }
}
