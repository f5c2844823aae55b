use std::collections::HashMap;

use log::{debug, trace};

use crate::classify::types::RegionLabel;
use crate::config::RegionTable;

/// Maps free-text country names onto regions
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    /// Lower-cased name to region, for exact lookups
    exact: HashMap<String, RegionLabel>,

    /// Distinct lower-cased names in table order, for fuzzy lookups
    candidates: Vec<String>,

    /// Minimum similarity ratio for a fuzzy match
    cutoff: f64,
}

impl RegionClassifier {
    /// Create a classifier over the given table
    pub fn new(table: &RegionTable, cutoff: f64) -> Self {
        let mut exact = HashMap::with_capacity(table.len());
        let mut candidates = Vec::with_capacity(table.len());

        for (region, name) in table.names() {
            let key = normalize(name);
            if key.is_empty() {
                continue;
            }
            // First region listing a name keeps it
            if !exact.contains_key(&key) {
                exact.insert(key.clone(), region);
                candidates.push(key);
            }
        }

        debug!("Region classifier built with {} names, cutoff {}", candidates.len(), cutoff);

        Self { exact, candidates, cutoff }
    }

    /// Region of a country name
    pub fn classify_region(&self, country: Option<&str>) -> RegionLabel {
        let key = match country.map(normalize) {
            Some(key) if !key.is_empty() => key,
            _ => return RegionLabel::MissingCountry,
        };

        if let Some(region) = self.exact.get(&key) {
            return *region;
        }

        match self.best_fuzzy_match(&key) {
            Some((name, region)) => {
                trace!("Fuzzy matched {:?} to {:?}", key, name);
                region
            }
            None => RegionLabel::RestOfWorld,
        }
    }

    /// Candidate with the highest matching-characters ratio (2*M/T) at or above the cutoff;
    /// ties keep the earlier candidate
    fn best_fuzzy_match(&self, key: &str) -> Option<(&str, RegionLabel)> {
        let possibilities: Vec<&str> = self.candidates.iter().map(String::as_str).collect();

        difflib::get_close_matches(key, possibilities, 1, self.cutoff as f32)
            .into_iter()
            .next()
            .and_then(|name| self.exact.get(name).map(|region| (name, *region)))
    }
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self::new(&RegionTable::default(), 0.7)
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
