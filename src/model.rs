// src/model.rs

use serde::{Deserialize, Serialize};

/// Label of the synthetic row appended to the counts table.
pub const TOTAL_LABEL: &str = "Total";

/// Header of the scraped CSV.
pub const RECORD_HEADERS: &[&str] = &[
    "primary_subject",
    "complaint_narrative",
    "scam_type",
    "website",
];

/// Header of the exploded CSV: the scraped columns plus the matched label.
pub const EXPLODED_HEADERS: &[&str] = &[
    "primary_subject",
    "complaint_narrative",
    "scam_type",
    "website",
    "scam_type_list",
];

/// Header of the counts CSV.
pub const COUNT_HEADERS: &[&str] = &["scam_type", "count"];

/// One row of the tracker table.
///
/// `scam_type` is the raw cell, possibly several labels run together. An empty
/// CSV field reads back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamRecord {
    pub primary_subject: String,
    pub complaint_narrative: String,
    pub scam_type: Option<String>,
    pub website: String,
}

/// A [`ScamRecord`] paired with exactly one matched label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplodedRecord {
    pub primary_subject: String,
    pub complaint_narrative: String,
    pub scam_type: Option<String>,
    pub website: String,
    pub scam_type_list: String,
}

impl ExplodedRecord {
    pub fn new(record: &ScamRecord, label: String) -> Self {
        Self {
            primary_subject: record.primary_subject.clone(),
            complaint_narrative: record.complaint_narrative.clone(),
            scam_type: record.scam_type.clone(),
            website: record.website.clone(),
            scam_type_list: label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub scam_type: String,
    pub count: u64,
}
