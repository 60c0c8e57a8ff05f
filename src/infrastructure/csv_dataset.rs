// CSV parsing for the vaccination and population sources
use crate::domain::observation::{ObservationSeries, VaccinationDataset};
use crate::domain::population::{PopulationRecord, PopulationTable};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct VaccinationRow {
    date: NaiveDate,
    location: String,
    #[serde(default)]
    daily_vaccinations: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PopulationRow {
    location: String,
    #[serde(default)]
    code: Option<String>,
    year: String,
    population: f64,
}

/// Parse an OWID-style vaccinations CSV. Only `date`, `location` and
/// `daily_vaccinations` are read; other columns are ignored.
pub fn parse_vaccination_csv<R: Read>(reader: R) -> Result<VaccinationDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut by_location: BTreeMap<String, Vec<(NaiveDate, Option<f64>)>> = BTreeMap::new();
    for (line, result) in csv_reader.deserialize::<VaccinationRow>().enumerate() {
        let row = result.with_context(|| format!("Invalid vaccination row {}", line + 2))?;
        by_location
            .entry(row.location)
            .or_default()
            .push((row.date, row.daily_vaccinations));
    }

    let mut series = Vec::with_capacity(by_location.len());
    for (location, mut rows) in by_location {
        rows.sort_by_key(|(date, _)| *date);

        match ObservationSeries::new(location.clone(), forward_fill(&rows)) {
            Ok(s) if !s.is_empty() => series.push(s),
            Ok(_) => tracing::debug!("No daily counts reported for {}", location),
            Err(e) => tracing::warn!("Dropping {} from vaccination data: {}", location, e),
        }
    }

    Ok(VaccinationDataset::new(series))
}

/// Fill missing daily values with the previous reported one. Rows before
/// the first reported value are dropped.
fn forward_fill(rows: &[(NaiveDate, Option<f64>)]) -> Vec<(NaiveDate, i64)> {
    let mut last: Option<i64> = None;

    rows.iter()
        .filter_map(|(date, value)| {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                last = Some(v.round() as i64);
            }
            last.map(|count| (*date, count))
        })
        .collect()
}

/// Parse a long-format population CSV (`location,code,year,population`),
/// keeping only `reference_year` and multiplying every value by `scale`.
pub fn parse_population_csv<R: Read>(
    reader: R,
    reference_year: &str,
    scale: i64,
) -> Result<PopulationTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line, result) in csv_reader.deserialize::<PopulationRow>().enumerate() {
        let row = result.with_context(|| format!("Invalid population row {}", line + 2))?;
        if row.year != reference_year {
            continue;
        }

        records.push(PopulationRecord {
            location: row.location,
            code: row.code.filter(|c| !c.is_empty()),
            population: (row.population * scale as f64).round() as i64,
        });
    }

    if records.is_empty() {
        tracing::warn!("Population data has no rows for {}", reference_year);
    }

    Ok(PopulationTable::new(reference_year, records))
}
