use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, Context, bail};
use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::classify::types::RegionLabel;
use crate::utils::file_utils;

/// Inclusive range of years accepted as a bare four-digit date signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl YearWindow {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::new(2023, 2027)
    }
}

/// Recognized country names per region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable {
    regions: BTreeMap<RegionLabel, Vec<String>>,
}

impl RegionTable {
    /// Build a table from (region, names) pairs
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (RegionLabel, Vec<S>)>,
        S: Into<String>,
    {
        let regions = entries.into_iter()
            .map(|(region, names)| (region, names.into_iter().map(Into::into).collect()))
            .collect();
        Self { regions }
    }

    /// Iterate over every (region, name) pair in a stable order
    pub fn names(&self) -> impl Iterator<Item = (RegionLabel, &str)> {
        self.regions.iter()
            .flat_map(|(region, names)| names.iter().map(move |name| (*region, name.as_str())))
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionLabel> + '_ {
        self.regions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::from_entries([
            (RegionLabel::Us, vec![
                "United States", "United States of America", "USA", "US", "U.S.", "U.S.A.",
                "America", "Puerto Rico",
            ]),
            (RegionLabel::Apac, vec![
                "Australia", "New Zealand", "China", "Japan", "India", "Singapore",
                "Hong Kong", "South Korea", "Korea", "Taiwan", "Malaysia", "Indonesia",
                "Thailand", "Vietnam", "Philippines",
            ]),
            (RegionLabel::Eu, vec![
                "United Kingdom", "UK", "Great Britain", "England", "Ireland", "Germany",
                "France", "Spain", "Italy", "Netherlands", "Belgium", "Luxembourg",
                "Switzerland", "Austria", "Sweden", "Norway", "Denmark", "Finland",
                "Poland", "Portugal", "Czech Republic", "Greece",
            ]),
        ])
    }
}

/// Configuration consumed by the classification core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum reference year treated as fresh
    pub freshness_threshold_year: i32,

    /// Bounds for accepting a bare four-digit year
    pub plausible_year_window: YearWindow,

    /// Region lookup table
    pub region_table: RegionTable,

    /// Similarity ratio required for a fuzzy country match
    pub fuzzy_match_cutoff: f64,

    /// Proposal age buckets that mark a proposal as active
    pub active_age_buckets: Vec<String>,

    /// Name marker for opportunities put on hold
    pub hold_marker: String,

    /// Name marker for direct-sales opportunities
    pub direct_marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            freshness_threshold_year: 2025,
            plausible_year_window: YearWindow::default(),
            region_table: RegionTable::default(),
            fuzzy_match_cutoff: 0.7,
            active_age_buckets: vec!["0-3 Months".to_string(), "3-6 Months".to_string()],
            hold_marker: "hold".to_string(),
            direct_marker: "direct".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Load a configuration file, TOML or YAML by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading classifier config from {}", path.display());

        let content = file_utils::read_file_to_string(path)?;

        let config: ClassifierConfig = if file_utils::has_any_extension(path, &["yaml", "yml"]) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config {}", path.display()))?
        } else if file_utils::has_extension(path, "toml") {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config {}", path.display()))?
        } else {
            bail!("Unsupported config format: {}", path.display());
        };

        config.validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;

        info!("Loaded classifier config: threshold year {}, {} region names",
            config.freshness_threshold_year, config.region_table.len());
        Ok(config)
    }

    /// Check the configuration for values the classifier cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_match_cutoff) {
            bail!("fuzzy_match_cutoff must be within [0, 1], got {}", self.fuzzy_match_cutoff);
        }

        let window = self.plausible_year_window;
        if window.min > window.max {
            bail!("plausible_year_window min {} is after max {}", window.min, window.max);
        }

        if self.region_table.regions().any(|r| matches!(r, RegionLabel::MissingCountry)) {
            bail!("region_table cannot assign names to MissingCountry");
        }

        if self.hold_marker.trim().is_empty() || self.direct_marker.trim().is_empty() {
            bail!("hold_marker and direct_marker must not be empty");
        }

        Ok(())
    }
}
