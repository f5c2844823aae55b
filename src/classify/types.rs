use std::fmt;
use serde::{Serialize, Deserialize};

/// A single opportunity row as read from a pipeline export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    /// Free-text opportunity name, empty when the source cell is blank
    pub name: String,

    /// Free-text update notes, newest note first
    pub notes: Option<String>,

    /// Proposal age category such as "0-3 Months"
    pub proposal_age_bucket: Option<String>,

    /// Free-text country name, possibly misspelled
    pub country: Option<String>,
}

impl OpportunityRecord {
    /// Create a record with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_age(mut self, bucket: impl Into<String>) -> Self {
        self.proposal_age_bucket = Some(bucket.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Pipeline status assigned to an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusLabel {
    Active,
    OnHold,
    DirectUpdateNeeded,
    CroUpdateNeeded,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 4] = [
        StatusLabel::Active,
        StatusLabel::OnHold,
        StatusLabel::DirectUpdateNeeded,
        StatusLabel::CroUpdateNeeded,
    ];

    /// Label written to exported tables
    pub fn display_name(&self) -> &'static str {
        match self {
            StatusLabel::Active => "Active",
            StatusLabel::OnHold => "On Hold",
            StatusLabel::DirectUpdateNeeded => "Direct Update Needed",
            StatusLabel::CroUpdateNeeded => "CRO Update Needed",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Coarse geographic region of an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionLabel {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "APAC")]
    Apac,
    #[serde(rename = "EU")]
    Eu,
    RestOfWorld,
    MissingCountry,
}

impl RegionLabel {
    pub const ALL: [RegionLabel; 5] = [
        RegionLabel::Us,
        RegionLabel::Apac,
        RegionLabel::Eu,
        RegionLabel::RestOfWorld,
        RegionLabel::MissingCountry,
    ];

    /// Label written to exported tables
    pub fn display_name(&self) -> &'static str {
        match self {
            RegionLabel::Us => "US",
            RegionLabel::Apac => "APAC",
            RegionLabel::Eu => "EU",
            RegionLabel::RestOfWorld => "Rest of World",
            RegionLabel::MissingCountry => "Missing Country",
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Rule of the status cascade that produced a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusRule {
    /// Name carries the hold marker
    HoldOverride,

    /// Proposal is young enough to be active without notes
    NewProposalBypass,

    /// First-line note date is at or after the freshness threshold
    FreshNote,

    /// No usable or only stale date signal
    UpdateFallback,
}

/// Classification of a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Assigned status
    pub status: StatusLabel,

    /// Assigned region
    pub region: RegionLabel,

    /// Rule that decided the status
    pub rule: StatusRule,

    /// Reference year extracted from the notes, when the extractor ran and found one
    pub reference_year: Option<i32>,
}

/// Options for processing a table of records
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Number of worker threads; defaults to all but one core
    pub parallel_threads: Option<usize>,

    /// Tables smaller than this are classified on the calling thread
    pub min_parallel_records: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            parallel_threads: None,
            min_parallel_records: 512,
        }
    }
}
