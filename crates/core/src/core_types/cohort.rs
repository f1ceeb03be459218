//! Per-site inputs read by the classifier
//!
//! The host's succession, harvest, fire, wind and bark-beetle models own
//! these values; the classifier only reads a snapshot of them for one site.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::species::SpeciesDataset;
use crate::error::ConfigError;

/// Live cohort ages at one site, grouped by species index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteCohorts {
    ages: Vec<Vec<u32>>,
}

impl SiteCohorts {
    /// Empty site (no live cohorts).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from species names, resolving each through the dataset.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownSpecies`] for a name not in `species`.
    pub fn from_named<'a, I, A>(species: &SpeciesDataset, cohorts: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, A)>,
        A: IntoIterator<Item = u32>,
    {
        let mut site = Self::new();
        for (name, ages) in cohorts {
            let index = species
                .get(name)
                .ok_or_else(|| ConfigError::UnknownSpecies {
                    name: name.to_string(),
                })?
                .index;
            for age in ages {
                site.add(index, age);
            }
        }
        Ok(site)
    }

    /// Add one cohort.
    pub fn add(&mut self, species_index: usize, age: u32) {
        if species_index >= self.ages.len() {
            self.ages.resize_with(species_index + 1, Vec::new);
        }
        self.ages[species_index].push(age);
    }

    /// Builder form of [`SiteCohorts::add`].
    pub fn with(mut self, species_index: usize, age: u32) -> Self {
        self.add(species_index, age);
        self
    }

    /// Ages of a species' cohorts; empty when the species is absent.
    pub fn ages(&self, species_index: usize) -> &[u32] {
        self.ages.get(species_index).map_or(&[][..], Vec::as_slice)
    }

    /// Highest species index holding at least one cohort.
    pub fn highest_species_index(&self) -> Option<usize> {
        self.ages.iter().rposition(|ages| !ages.is_empty())
    }

    /// Total live cohorts across all species.
    pub fn cohort_count(&self) -> usize {
        self.ages.iter().map(Vec::len).sum()
    }
}

/// Disturbance history recorded at a site by the host's event models.
///
/// Times are absolute simulation years; `None` means the event never
/// happened or its model is not running. A severity of 0 means none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisturbanceHistory {
    /// Year of the most recent harvest
    pub time_of_last_harvest: Option<i32>,
    /// Prescription applied at the most recent harvest
    pub harvest_prescription: Option<String>,
    /// Year of the most recent fire
    pub time_of_last_fire: Option<i32>,
    /// Severity class of the most recent fire
    pub fire_severity: u8,
    /// Year of the most recent windthrow
    pub time_of_last_wind: Option<i32>,
    /// Severity class of the most recent windthrow
    pub wind_severity: u8,
}

impl DisturbanceHistory {
    /// Years elapsed since an event, `None` if it never happened.
    pub fn years_since(event_time: Option<i32>, current_time: i32) -> Option<i64> {
        event_time.map(|t| i64::from(current_time) - i64::from(t))
    }
}

/// Dead fir cohorts produced per simulation year by the bark-beetle model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeadFirHistory {
    counts_by_year: FxHashMap<i32, u32>,
}

impl DeadFirHistory {
    /// Empty history (model running, nothing killed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record dead cohorts for a year, adding to any previous count.
    pub fn record(&mut self, year: i32, count: u32) {
        *self.counts_by_year.entry(year).or_insert(0) += count;
    }

    /// Builder form of [`DeadFirHistory::record`].
    pub fn with(mut self, year: i32, count: u32) -> Self {
        self.record(year, count);
        self
    }

    /// Dead cohorts recorded for a year.
    pub fn count(&self, year: i32) -> u32 {
        self.counts_by_year.get(&year).copied().unwrap_or(0)
    }
}

/// Everything the classifier reads for one active site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellInputs {
    /// Live cohorts
    pub cohorts: SiteCohorts,
    /// Harvest, fire and wind history
    pub disturbance: DisturbanceHistory,
    /// `None` when the dead-fir model is not running
    pub dead_fir: Option<DeadFirHistory>,
}

impl CellInputs {
    /// Site with the given cohorts and no disturbance history.
    pub fn with_cohorts(cohorts: SiteCohorts) -> Self {
        Self {
            cohorts,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_grouping() {
        let site = SiteCohorts::new().with(2, 10).with(2, 40).with(0, 5);
        assert_eq!(site.ages(2), &[10, 40]);
        assert_eq!(site.ages(0), &[5]);
        assert!(site.ages(1).is_empty());
        assert!(site.ages(9).is_empty());
        assert_eq!(site.cohort_count(), 3);
        assert_eq!(site.highest_species_index(), Some(2));
        assert_eq!(SiteCohorts::new().highest_species_index(), None);
    }

    #[test]
    fn test_from_named_resolves_species() {
        let species = SpeciesDataset::new([("abiebals", 200), ("betupapy", 120)]).unwrap();
        let site = SiteCohorts::from_named(&species, [("betupapy", vec![20, 30])]).unwrap();
        assert_eq!(site.ages(1), &[20, 30]);

        let err = SiteCohorts::from_named(&species, [("larilari", vec![20])]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownSpecies {
                name: "larilari".to_string()
            }
        );
    }

    #[test]
    fn test_years_since() {
        assert_eq!(DisturbanceHistory::years_since(Some(20), 30), Some(10));
        assert_eq!(DisturbanceHistory::years_since(None, 30), None);
    }

    #[test]
    fn test_dead_fir_history_accumulates() {
        let history = DeadFirHistory::new().with(10, 2).with(10, 3).with(20, 1);
        assert_eq!(history.count(10), 5);
        assert_eq!(history.count(20), 1);
        assert_eq!(history.count(15), 0);
    }

    #[test]
    fn test_cell_inputs_deserialize_with_defaults() {
        let json = r#"{"cohorts": [[10, 20], [], [5]], "disturbance": {"time_of_last_fire": 12, "fire_severity": 3}}"#;
        let cell: CellInputs = serde_json::from_str(json).unwrap();
        assert_eq!(cell.cohorts.ages(0), &[10, 20]);
        assert_eq!(cell.disturbance.time_of_last_fire, Some(12));
        assert_eq!(cell.disturbance.fire_severity, 3);
        assert_eq!(cell.disturbance.time_of_last_harvest, None);
        assert!(cell.dead_fir.is_none());
    }
}
