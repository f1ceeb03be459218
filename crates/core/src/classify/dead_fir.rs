//! Share of a site's cohorts that are recently killed fir
//!
//! Only meaningful when the bark-beetle model is running and recording dead
//! fir cohorts per year. Deaths before the most recent fire are ignored, as
//! are deaths older than the configured maximum age.

use crate::core_types::CellInputs;

/// Percent of cohorts at the site that are dead fir, 0-100.
///
/// Returns 0 when the site has no dead-fir history (model inactive) and when
/// the site has neither live nor dead cohorts.
pub fn percent_dead_fir(cell: &CellInputs, current_time: i32, dead_fir_max_age: u32) -> u8 {
    let Some(history) = &cell.dead_fir else {
        return 0;
    };

    let current = i64::from(current_time);
    let after_fire = i64::from(cell.disturbance.time_of_last_fire.unwrap_or(0).max(0));
    let oldest_counted = current - i64::from(dead_fir_max_age);
    let start = after_fire.max(oldest_counted);

    let dead: u64 = (start..=current)
        .filter_map(|year| i32::try_from(year).ok())
        .map(|year| u64::from(history.count(year)))
        .sum();

    let live = cell.cohorts.cohort_count() as u64;
    let total = live + dead;
    if total == 0 {
        return 0;
    }

    let percent = (dead as f64 / total as f64 * 100.0 + 0.5).floor();
    percent.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{DeadFirHistory, SiteCohorts};

    fn site(live: usize, history: Option<DeadFirHistory>) -> CellInputs {
        let mut cohorts = SiteCohorts::new();
        for age in 0..live {
            cohorts.add(0, 10 + age as u32);
        }
        CellInputs {
            cohorts,
            dead_fir: history,
            ..CellInputs::default()
        }
    }

    #[test]
    fn test_inactive_model_is_zero() {
        assert_eq!(percent_dead_fir(&site(5, None), 50, 15), 0);
    }

    #[test]
    fn test_counts_within_max_age() {
        // 3 dead at year 40 (10 years ago) count; 4 at year 30 are too old.
        let history = DeadFirHistory::new().with(40, 3).with(30, 4);
        let cell = site(9, Some(history));
        // 3 / (9 + 3) = 25%
        assert_eq!(percent_dead_fir(&cell, 50, 15), 25);
    }

    #[test]
    fn test_deaths_before_last_fire_ignored() {
        let history = DeadFirHistory::new().with(42, 5).with(46, 1);
        let mut cell = site(3, Some(history));
        cell.disturbance.time_of_last_fire = Some(45);
        // only year 46: 1 / (3 + 1)
        assert_eq!(percent_dead_fir(&cell, 50, 15), 25);
    }

    #[test]
    fn test_all_dead_and_empty_site() {
        let history = DeadFirHistory::new().with(50, 2);
        assert_eq!(percent_dead_fir(&site(0, Some(history)), 50, 15), 100);
        assert_eq!(percent_dead_fir(&site(0, Some(DeadFirHistory::new())), 50, 15), 0);
    }

    #[test]
    fn test_rounds_half_up() {
        // 1 / 8 = 12.5% -> 13
        let history = DeadFirHistory::new().with(50, 1);
        assert_eq!(percent_dead_fir(&site(7, Some(history)), 50, 0), 13);
    }
}
