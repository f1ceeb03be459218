//! Disturbance conversion rules
//!
//! A rule forces a fuel type onto a site for a number of years after a
//! qualifying harvest, fire or wind event. Triggers are plain labels:
//! a harvest prescription name, or a severity label such as
//! `FireSeverity3` / `WindSeverity2`.
//!
//! Several rules may target the same fuel index. Catalog order matters:
//! when more than one rule fires for a site, the last one wins.

use std::fmt;

use serde::Serialize;

use crate::core_types::fuel::validate_fuel_index;
use crate::error::ConfigError;

/// Disturbance agent whose severity can trigger a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityKind {
    /// Fire severity, labels start with `FireSeverity`
    Fire,
    /// Wind severity, labels start with `WindSeverity`
    Wind,
}

impl SeverityKind {
    /// Literal label prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Fire => "FireSeverity",
            Self::Wind => "WindSeverity",
        }
    }
}

impl fmt::Display for SeverityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One disturbance-triggered reclassification rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisturbanceType {
    fuel_index: u8,
    max_age: u32,
    labels: Vec<String>,
}

impl DisturbanceType {
    /// Build and validate a rule.
    ///
    /// # Errors
    /// - [`ConfigError::FuelIndexOutOfRange`] unless `1 <= fuel_index <= 100`
    /// - [`ConfigError::NonPositiveMaxAge`] unless `max_age > 0`
    /// - [`ConfigError::EmptyTriggerList`] if `labels` is empty
    pub fn new<I, S>(fuel_index: i32, max_age: i32, labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fuel_index = validate_fuel_index(fuel_index)?;
        let max_age = match u32::try_from(max_age) {
            Ok(age) if age > 0 => age,
            _ => return Err(ConfigError::NonPositiveMaxAge { value: max_age }),
        };
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ConfigError::EmptyTriggerList);
        }
        Ok(Self {
            fuel_index,
            max_age,
            labels,
        })
    }

    /// Fuel index forced when the rule fires.
    pub fn fuel_index(&self) -> u8 {
        self.fuel_index
    }

    /// Years after the event during which the rule applies.
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Trigger labels in definition order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// True when an event `years_since` years ago is still recent enough.
    pub fn is_recent(&self, years_since: i64) -> bool {
        years_since <= i64::from(self.max_age)
    }

    /// True when any label equals the site's prescription name (both trimmed).
    pub fn matches_prescription(&self, prescription: &str) -> bool {
        let prescription = prescription.trim();
        self.labels.iter().any(|label| label.trim() == prescription)
    }

    /// True when a severity label of `kind` ends in the digit for `code`.
    ///
    /// Only the final character of the label is compared, so a multi-digit
    /// code can never match.
    pub fn matches_severity(&self, kind: SeverityKind, code: u8) -> bool {
        let code = code.to_string();
        self.labels
            .iter()
            .filter(|label| label.starts_with(kind.prefix()))
            .filter_map(|label| label.chars().next_back())
            .any(|last| code.len() == 1 && code.starts_with(last))
    }
}

/// Ordered disturbance rules. Duplicate fuel indices are allowed.
#[derive(Debug, Clone, Default)]
pub struct DisturbanceCatalog {
    rules: Vec<DisturbanceType>,
}

impl DisturbanceCatalog {
    /// Wrap rules in definition order.
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = DisturbanceType>,
    {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in definition order.
    pub fn iter(&self) -> std::slice::Iter<'_, DisturbanceType> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a DisturbanceCatalog {
    type Item = &'a DisturbanceType;
    type IntoIter = std::slice::Iter<'a, DisturbanceType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
