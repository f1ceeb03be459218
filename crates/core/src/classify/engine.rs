//! Per-site fuel type decision
//!
//! Three phases, always in this order:
//!
//! 1. **Scoring** - every species with live cohorts adds (or subtracts) the
//!    value of its single best-placed cohort to each fuel type that lists it.
//! 2. **Selection** - the highest positive score wins, base categories adjust
//!    the conifer/deciduous sums, and the hardwood threshold may hand the site
//!    to the best deciduous type.
//! 3. **Disturbance override** - recent harvest, fire or wind events force a
//!    conversion fuel type. Later rules overwrite earlier ones.
//!
//! Cohort value within a fuel type's age window:
//!
//! ```text
//! span     = max(1, min(max_age, longevity) - min_age)
//! relative = max(1, age - min_age)
//! value    = relative / span × coefficient
//! ```

use serde::Serialize;

use crate::core_types::{
    BaseFuelType, CellInputs, DisturbanceCatalog, DisturbanceHistory, FuelCoefficients,
    FuelType, FuelTypeCatalog, SeverityKind, SpeciesDataset, FUEL_INDEX_SLOTS,
};

/// Score for every fuel index; slot 0 is never written.
pub type FuelScores = [f64; FUEL_INDEX_SLOTS];

/// Vegetation- and disturbance-derived classification of one site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FuelAssignment {
    /// Final fuel index, 0 when nothing scored
    pub fuel_type: u8,
    /// Best deciduous fuel index, 0 when none
    pub decid_fuel_type: u8,
    /// Conifer dominance, 0-100
    pub percent_conifer: u8,
    /// Hardwood dominance, 0-100
    pub percent_hardwood: u8,
}

/// Read-only classification settings shared by every site.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationContext<'a> {
    /// Species catalog (longevity, iteration order)
    pub species: &'a SpeciesDataset,
    /// Fuel types in definition order
    pub fuel_types: &'a FuelTypeCatalog,
    /// Disturbance rules in definition order
    pub disturbances: &'a DisturbanceCatalog,
    /// Per-species fuel coefficients
    pub coefficients: &'a FuelCoefficients,
    /// Dominance below this percent is snapped away
    pub hardwood_max: u8,
}

/// Classify one site.
///
/// Pure: the same inputs always give the same assignment.
pub fn classify_fuel(
    ctx: &ClassificationContext<'_>,
    cell: &CellInputs,
    current_time: i32,
) -> FuelAssignment {
    let scores = score_fuel_types(ctx, cell);
    let assignment = select_fuel_type(ctx.fuel_types, &scores, ctx.hardwood_max);
    apply_disturbances(ctx.disturbances, &cell.disturbance, current_time, assignment)
}

/// Value of one cohort for a fuel type, before the species multiplier.
///
/// The caller is responsible for the age-window check.
pub fn cohort_value(fuel_type: &FuelType, age: u32, longevity: u32, coefficient: f64) -> f64 {
    let min_age = f64::from(fuel_type.min_age());
    let max_age = f64::from(fuel_type.max_age().min(longevity));
    let span = (max_age - min_age).max(1.0);
    let relative = (f64::from(age) - min_age).max(1.0);
    relative / span * coefficient
}

/// Phase 1: accumulate species contributions into per-fuel-type scores.
pub fn score_fuel_types(ctx: &ClassificationContext<'_>, cell: &CellInputs) -> FuelScores {
    let mut scores = [0.0; FUEL_INDEX_SLOTS];

    for species in ctx.species {
        let ages = cell.cohorts.ages(species.index);
        if ages.is_empty() {
            continue;
        }
        let coefficient = ctx.coefficients.get(species.index);

        for fuel_type in ctx.fuel_types {
            let multiplier = fuel_type.multiplier(species.index);
            if multiplier == 0 {
                continue;
            }

            // One cohort per species: the best placed, not the sum of all.
            let species_value = ages
                .iter()
                .filter(|&&age| fuel_type.contains_age(age))
                .map(|&age| cohort_value(fuel_type, age, species.longevity, coefficient))
                .fold(0.0, f64::max);

            let slot = usize::from(fuel_type.fuel_index());
            if multiplier == -1 {
                scores[slot] -= species_value;
            }
            if multiplier == 1 {
                scores[slot] += species_value;
            }
        }
    }

    scores
}

/// Round a fraction to a whole percent, halves rounding up.
fn round_percent(fraction: f64) -> u8 {
    (fraction * 100.0 + 0.5).floor().clamp(0.0, 100.0) as u8
}

/// Phase 2: pick the winning fuel type and compute dominance.
pub fn select_fuel_type(
    fuel_types: &FuelTypeCatalog,
    scores: &FuelScores,
    hardwood_max: u8,
) -> FuelAssignment {
    let mut fuel_type = 0;
    let mut decid_fuel_type = 0;
    let mut max_value = 0.0;
    let mut max_decid_value = 0.0;
    let mut sum_conifer = 0.0;
    let mut sum_decid = 0.0;

    for candidate in fuel_types {
        let index = candidate.fuel_index();
        let score = scores[usize::from(index)];
        let base = candidate.base_fuel();

        if base.is_conifer() && score > 0.0 {
            sum_conifer += score;
        }
        if base == BaseFuelType::Deciduous && score > 0.0 {
            sum_decid += score;
        }
        // Strictly greater: ties keep the earlier catalog entry.
        if score > max_value {
            max_value = score;
            fuel_type = index;
        }
        if base == BaseFuelType::Deciduous && score > max_decid_value {
            max_decid_value = score;
            decid_fuel_type = index;
        }
    }

    match fuel_types.base_fuel_of(fuel_type) {
        Some(BaseFuelType::ConiferPlantation) => {
            decid_fuel_type = 0;
            sum_conifer = 100.0;
            sum_decid = 0.0;
        }
        Some(BaseFuelType::Slash | BaseFuelType::Open) => {
            sum_conifer = 0.0;
            sum_decid = 0.0;
        }
        _ => {}
    }

    let mut percent_conifer = 0;
    let mut percent_hardwood = 0;
    if sum_conifer > 0.0 || sum_decid > 0.0 {
        percent_conifer = round_percent(sum_conifer / (sum_conifer + sum_decid));
        // Rounded on its own; both shares on exactly .5 give a pair of 101.
        percent_hardwood = round_percent(sum_decid / (sum_conifer + sum_decid));

        if percent_hardwood < hardwood_max {
            percent_conifer = 100;
            percent_hardwood = 0;
        } else if percent_conifer < hardwood_max {
            percent_conifer = 0;
            percent_hardwood = 100;
            fuel_type = decid_fuel_type;
        }
    }

    FuelAssignment {
        fuel_type,
        decid_fuel_type,
        percent_conifer,
        percent_hardwood,
    }
}

/// Phase 3: let recent disturbances overwrite the vegetation result.
///
/// Every check of every rule runs; there is no early exit.
pub fn apply_disturbances(
    disturbances: &DisturbanceCatalog,
    history: &DisturbanceHistory,
    current_time: i32,
    mut assignment: FuelAssignment,
) -> FuelAssignment {
    let since_harvest = DisturbanceHistory::years_since(history.time_of_last_harvest, current_time);
    let since_fire = DisturbanceHistory::years_since(history.time_of_last_fire, current_time);
    let since_wind = DisturbanceHistory::years_since(history.time_of_last_wind, current_time);

    let mut force = |fuel_index: u8| {
        assignment = FuelAssignment {
            fuel_type: fuel_index,
            ..FuelAssignment::default()
        };
    };

    for rule in disturbances {
        if let (Some(since), Some(prescription)) = (since_harvest, &history.harvest_prescription) {
            if rule.is_recent(since) && rule.matches_prescription(prescription) {
                force(rule.fuel_index());
            }
        }

        let severities = [
            (SeverityKind::Fire, history.fire_severity, since_fire),
            (SeverityKind::Wind, history.wind_severity, since_wind),
        ];
        for (kind, severity, since) in severities {
            if severity == 0 {
                continue;
            }
            if let Some(since) = since {
                if rule.is_recent(since) && rule.matches_severity(kind, severity) {
                    force(rule.fuel_index());
                }
            }
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{DisturbanceType, Multiplier, SiteCohorts};
    use approx::assert_relative_eq;

    struct Fixture {
        species: SpeciesDataset,
        fuel_types: FuelTypeCatalog,
        disturbances: DisturbanceCatalog,
        coefficients: FuelCoefficients,
        hardwood_max: u8,
    }

    impl Fixture {
        /// Species 0 = fir (conifer), 1 = aspen (deciduous).
        fn new(fuel_types: Vec<FuelType>) -> Self {
            let species = SpeciesDataset::new([("abiebals", 150), ("poputrem", 100)]).unwrap();
            let coefficients = FuelCoefficients::new(species.len());
            Self {
                species,
                fuel_types: FuelTypeCatalog::new(fuel_types).unwrap(),
                disturbances: DisturbanceCatalog::default(),
                coefficients,
                hardwood_max: 0,
            }
        }

        fn ctx(&self) -> ClassificationContext<'_> {
            ClassificationContext {
                species: &self.species,
                fuel_types: &self.fuel_types,
                disturbances: &self.disturbances,
                coefficients: &self.coefficients,
                hardwood_max: self.hardwood_max,
            }
        }
    }

    fn fuel(
        index: i32,
        base: BaseFuelType,
        min: i32,
        max: i32,
        species: &[(usize, Multiplier)],
    ) -> FuelType {
        FuelType::new(index, base, min, max, species.iter().copied()).unwrap()
    }

    #[test]
    fn test_cohort_value_window_and_floors() {
        let ft = fuel(1, BaseFuelType::Conifer, 10, 60, &[(0, Multiplier::Positive)]);
        // span = 50, relative = 30
        assert_relative_eq!(cohort_value(&ft, 40, 300, 1.0), 0.6);
        // longevity caps the window: span = 40 - 10 = 30
        assert_relative_eq!(cohort_value(&ft, 40, 40, 1.0), 1.0);
        // relative floors at 1
        assert_relative_eq!(cohort_value(&ft, 10, 300, 1.0), 1.0 / 50.0);
        // span floors at 1
        let narrow = fuel(2, BaseFuelType::Conifer, 20, 20, &[(0, Multiplier::Positive)]);
        assert_relative_eq!(cohort_value(&narrow, 20, 300, 0.5), 0.5);
    }

    #[test]
    fn test_best_cohort_not_sum() {
        let fixture = Fixture::new(vec![fuel(
            1,
            BaseFuelType::Conifer,
            0,
            100,
            &[(0, Multiplier::Positive)],
        )]);
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 20).with(0, 50).with(0, 30));
        let scores = score_fuel_types(&fixture.ctx(), &cell);
        assert_relative_eq!(scores[1], 0.5);
    }

    #[test]
    fn test_negative_multiplier_subtracts() {
        let fixture = Fixture::new(vec![fuel(
            4,
            BaseFuelType::Conifer,
            0,
            100,
            &[(0, Multiplier::Positive), (1, Multiplier::Negative)],
        )]);
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 80).with(1, 50));
        let scores = score_fuel_types(&fixture.ctx(), &cell);
        // fir: 80/100, aspen: 50/100
        assert_relative_eq!(scores[4], 0.3);
    }

    #[test]
    fn test_cohorts_outside_window_ignored() {
        let fixture = Fixture::new(vec![fuel(
            1,
            BaseFuelType::Conifer,
            30,
            60,
            &[(0, Multiplier::Positive)],
        )]);
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 10).with(0, 90));
        let scores = score_fuel_types(&fixture.ctx(), &cell);
        assert_eq!(scores[1], 0.0);
        assert_eq!(classify_fuel(&fixture.ctx(), &cell, 0), FuelAssignment::default());
    }

    #[test]
    fn test_tie_keeps_first_in_catalog_order() {
        let fixture = Fixture::new(vec![
            fuel(8, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
            fuel(3, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
        ]);
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 40));
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!(result.fuel_type, 8);
        assert_eq!(result.percent_conifer, 100);
    }

    #[test]
    fn test_mixed_dominance_rounds_half_up() {
        let fixture = Fixture::new(vec![
            fuel(1, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
            fuel(2, BaseFuelType::Deciduous, 0, 100, &[(1, Multiplier::Positive)]),
        ]);
        // fir 0.6, aspen 0.2 -> 75% conifer
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 60).with(1, 20));
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!(result.fuel_type, 1);
        assert_eq!(result.decid_fuel_type, 2);
        assert_eq!(result.percent_conifer, 75);
        assert_eq!(result.percent_hardwood, 25);
    }

    #[test]
    fn test_slash_and_open_zero_dominance() {
        for base in [BaseFuelType::Slash, BaseFuelType::Open] {
            let fixture = Fixture::new(vec![
                fuel(1, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
                fuel(9, base, 0, 100, &[(1, Multiplier::Positive)]),
            ]);
            let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 10).with(1, 90));
            let result = classify_fuel(&fixture.ctx(), &cell, 0);
            assert_eq!(result.fuel_type, 9);
            assert_eq!(result.percent_conifer, 0);
            assert_eq!(result.percent_hardwood, 0);
        }
    }

    #[test]
    fn test_no_fuel_winner_keeps_dominance() {
        let fixture = Fixture::new(vec![
            fuel(1, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
            fuel(6, BaseFuelType::NoFuel, 0, 100, &[(1, Multiplier::Positive)]),
        ]);
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 10).with(1, 90));
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!(result.fuel_type, 6);
        assert_eq!(result.percent_conifer, 100);
    }

    #[test]
    fn test_hardwood_threshold_replaces_with_deciduous() {
        let mut fixture = Fixture::new(vec![
            fuel(1, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
            fuel(2, BaseFuelType::Deciduous, 0, 100, &[(1, Multiplier::Positive)]),
            fuel(3, BaseFuelType::Deciduous, 0, 100, &[(1, Multiplier::Positive)]),
        ]);
        fixture.hardwood_max = 40;
        // fir 0.5 wins outright, but aspen scores 0.46 in two deciduous types:
        // conifer share = 0.5 / 1.42 = 35%
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 50).with(1, 46));
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!(result.percent_conifer, 0);
        assert_eq!(result.percent_hardwood, 100);
        assert_eq!(result.fuel_type, 2);
        assert_eq!(result.decid_fuel_type, 2);
    }

    #[test]
    fn test_hardwood_threshold_snaps_to_conifer() {
        let mut fixture = Fixture::new(vec![
            fuel(1, BaseFuelType::Conifer, 0, 100, &[(0, Multiplier::Positive)]),
            fuel(2, BaseFuelType::Deciduous, 0, 100, &[(1, Multiplier::Positive)]),
        ]);
        fixture.hardwood_max = 40;
        // fir 0.65, aspen 0.35 -> hardwood 35%
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 65).with(1, 35));
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!(result.fuel_type, 1);
        assert_eq!(result.decid_fuel_type, 2);
        assert_eq!(result.percent_conifer, 100);
        assert_eq!(result.percent_hardwood, 0);
    }

    #[test]
    fn test_half_percent_shares_round_independently() {
        let fuel_types = vec![
            fuel(1, BaseFuelType::Conifer, 0, 8, &[(0, Multiplier::Positive)]),
            fuel(2, BaseFuelType::Deciduous, 0, 8, &[(1, Multiplier::Positive)]),
        ];
        // fir 1/8, aspen 7/8 -> 12.5% / 87.5%
        let cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 1).with(1, 7));

        let fixture = Fixture::new(fuel_types.clone());
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!((result.percent_conifer, result.percent_hardwood), (13, 88));

        // 88 is not below 88, so only the conifer check snaps.
        let mut fixture = Fixture::new(fuel_types);
        fixture.hardwood_max = 88;
        let result = classify_fuel(&fixture.ctx(), &cell, 0);
        assert_eq!(result.percent_conifer, 0);
        assert_eq!(result.percent_hardwood, 100);
        assert_eq!(result.fuel_type, 2);
    }

    #[test]
    fn test_wind_severity_override_resets_dominance() {
        let mut fixture = Fixture::new(vec![fuel(
            1,
            BaseFuelType::Conifer,
            0,
            100,
            &[(0, Multiplier::Positive)],
        )]);
        fixture.disturbances = DisturbanceCatalog::new([DisturbanceType::new(
            40,
            10,
            ["Clearcut", "WindSeverity3"],
        )
        .unwrap()]);
        let mut cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 40));
        cell.disturbance.time_of_last_wind = Some(95);
        cell.disturbance.wind_severity = 3;

        let result = classify_fuel(&fixture.ctx(), &cell, 100);
        assert_eq!(
            result,
            FuelAssignment {
                fuel_type: 40,
                ..FuelAssignment::default()
            }
        );
    }

    #[test]
    fn test_stale_or_zero_severity_events_ignored() {
        let mut fixture = Fixture::new(vec![fuel(
            1,
            BaseFuelType::Conifer,
            0,
            100,
            &[(0, Multiplier::Positive)],
        )]);
        let rule = DisturbanceType::new(40, 10, ["FireSeverity0", "Clearcut"]).unwrap();
        fixture.disturbances = DisturbanceCatalog::new([rule]);
        let mut cell = CellInputs::with_cohorts(SiteCohorts::new().with(0, 40));
        cell.disturbance.time_of_last_fire = Some(99);
        cell.disturbance.fire_severity = 0;
        cell.disturbance.time_of_last_harvest = Some(80);
        cell.disturbance.harvest_prescription = Some("Clearcut".to_string());

        let result = classify_fuel(&fixture.ctx(), &cell, 100);
        assert_eq!(result.fuel_type, 1);
        assert_eq!(result.percent_conifer, 100);
    }
}
