// Population lookup domain model

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub location: String,
    pub code: Option<String>,
    pub population: i64,
}

/// Populations for a single reference year.
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    pub reference_year: String,
    records: Vec<PopulationRecord>,
}

impl PopulationTable {
    pub fn new(reference_year: impl Into<String>, records: Vec<PopulationRecord>) -> Self {
        Self {
            reference_year: reference_year.into(),
            records,
        }
    }

    /// Resolve by location name first, then by code. Both comparisons ignore case.
    pub fn resolve(&self, key: &str) -> Option<&PopulationRecord> {
        let key = key.trim();

        self.records
            .iter()
            .find(|r| r.location.eq_ignore_ascii_case(key))
            .or_else(|| {
                self.records.iter().find(|r| {
                    r.code
                        .as_deref()
                        .is_some_and(|code| code.eq_ignore_ascii_case(key))
                })
            })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PopulationTable {
        PopulationTable::new(
            "2020",
            vec![
                PopulationRecord {
                    location: "France".to_string(),
                    code: Some("FRA".to_string()),
                    population: 65_273_511,
                },
                PopulationRecord {
                    location: "World".to_string(),
                    code: None,
                    population: 7_794_798_739,
                },
            ],
        )
    }

    #[test]
    fn test_resolve_by_name_ignoring_case() {
        let table = table();
        assert_eq!(table.resolve("france").unwrap().population, 65_273_511);
        assert_eq!(table.resolve(" WORLD ").unwrap().population, 7_794_798_739);
    }

    #[test]
    fn test_resolve_by_code() {
        assert_eq!(table().resolve("fra").unwrap().location, "France");
    }

    #[test]
    fn test_unresolved() {
        assert!(table().resolve("Atlantis").is_none());
    }
}
