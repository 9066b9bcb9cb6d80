// src/categorize/mod.rs
use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeMap, path::Path};
use tracing::{debug, info};

use crate::{
    config::Config,
    model::{CountRow, ExplodedRecord, ScamRecord, COUNT_HEADERS, EXPLODED_HEADERS, TOTAL_LABEL},
    store,
};

pub mod summary;

/// Canonical scam-type labels, as they appear on the tracker.
pub const KNOWN_TYPES: &[&str] = &[
    "Crypto Giveaway/Airdrop Scam",
    "Crypto Wallet Drainer Attack",
    "Fraudulent Trading Platform",
    "High Yield Investment Program",
    "Investment Group Scam",
    "Liquidity Mining Scam",
    "AI Investment Scam",
    "Bait and Switch Scam",
    "Pig Butchering Scam",
    "Romance Scam",
    "Rug Pull Scam",
    "Signal Selling Scam",
];

static KNOWN: Lazy<LabelMatcher> = Lazy::new(|| {
    LabelMatcher::new(KNOWN_TYPES.iter().copied())
        .expect("known scam-type labels form a valid pattern")
});

/// What a record with a blank `scam_type` cell contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlankPolicy {
    /// No labels, so no exploded rows.
    #[default]
    Skip,
    /// A single explicit label, e.g. `"Unknown"`.
    Sentinel(String),
}

impl BlankPolicy {
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(l) if !l.trim().is_empty() => Self::Sentinel(unreserved(l.trim())),
            _ => Self::Skip,
        }
    }
}

/// Name a data label takes when it would read as the synthetic total row.
pub const RESERVED_RENAME: &str = "Total (as reported)";

/// `TOTAL_LABEL` belongs to the counts table; a cell that says exactly that
/// is renamed so the written table has a single total row.
fn unreserved(label: &str) -> String {
    if label.eq_ignore_ascii_case(TOTAL_LABEL) {
        RESERVED_RENAME.to_string()
    } else {
        label.to_string()
    }
}

/// Splits a raw `scam_type` cell into the known labels it contains.
///
/// The labels are compiled into one alternation, longest first, so at any
/// position the longest known label wins over one it contains.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    pattern: Regex,
    blank: BlankPolicy,
}

impl LabelMatcher {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if labels.is_empty() {
            bail!("label matcher needs at least one non-empty label");
        }
        // stable: equal lengths keep their listed order
        labels.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternation = labels
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation).context("compiling label pattern")?;
        Ok(Self {
            pattern,
            blank: BlankPolicy::Skip,
        })
    }

    /// Matcher over [`KNOWN_TYPES`], compiled once per process.
    pub fn known() -> &'static LabelMatcher {
        &KNOWN
    }

    pub fn with_blank_policy(mut self, blank: BlankPolicy) -> Self {
        self.blank = blank;
        self
    }

    /// Labels found in `raw`, in order of appearance.
    ///
    /// A cell with no known label comes back whole (trimmed) as its own
    /// label. A missing cell has no labels.
    pub fn split(&self, raw: Option<&str>) -> Vec<String> {
        let Some(raw) = raw else {
            return Vec::new();
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return match &self.blank {
                BlankPolicy::Skip => Vec::new(),
                BlankPolicy::Sentinel(label) => vec![label.clone()],
            };
        }
        let found: Vec<String> = self
            .pattern
            .find_iter(raw)
            .map(|m| m.as_str().to_string())
            .collect();
        if found.is_empty() {
            vec![unreserved(trimmed)]
        } else {
            found
        }
    }
}

/// One row per (record, label). Records keep input order; labels keep match
/// order.
pub fn explode(records: &[ScamRecord], matcher: &LabelMatcher) -> Vec<ExplodedRecord> {
    records
        .iter()
        .flat_map(|record| {
            matcher
                .split(record.scam_type.as_deref())
                .into_iter()
                .map(move |label| ExplodedRecord::new(record, label))
        })
        .collect()
}

/// Frequency of each label, most common first, ties by label.
pub fn tally<'a, I>(labels: I) -> Vec<CountRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(scam_type, count)| CountRow {
            scam_type: scam_type.to_string(),
            count,
        })
        .collect();
    // BTreeMap order is already by label; a stable sort keeps it for ties
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Per-label counts with the total kept apart from the data rows, so no
/// label can be taken for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCounts {
    pub rows: Vec<CountRow>,
    pub total: u64,
}

impl LabelCounts {
    pub fn new(rows: Vec<CountRow>) -> Self {
        let total = rows.iter().map(|r| r.count).sum();
        Self { rows, total }
    }

    /// The rows as written to the counts CSV: data rows, then `Total`.
    pub fn with_total_row(&self) -> Vec<CountRow> {
        let mut out = self.rows.clone();
        out.push(CountRow {
            scam_type: TOTAL_LABEL.to_string(),
            count: self.total,
        });
        out
    }
}

/// [`tally`] over the exploded labels, with their total.
pub fn count_labels(exploded: &[ExplodedRecord]) -> LabelCounts {
    LabelCounts::new(tally(exploded.iter().map(|e| e.scam_type_list.as_str())))
}

/// Read `input`, explode and count, then write both output tables.
pub fn categorize_file(
    input: &Path,
    counts_out: &Path,
    exploded_out: &Path,
    matcher: &LabelMatcher,
) -> Result<LabelCounts> {
    let records = store::read_records(input)?;
    info!(rows = records.len(), file = %input.display(), "loaded scraped records");

    let exploded = explode(&records, matcher);
    debug!(
        records = records.len(),
        exploded = exploded.len(),
        "exploded multi-label rows"
    );
    let counts = count_labels(&exploded);

    store::write_csv(counts_out, COUNT_HEADERS, &counts.with_total_row())?;
    info!(file = %counts_out.display(), "saved counts");
    store::write_csv(exploded_out, EXPLODED_HEADERS, &exploded)?;
    info!(file = %exploded_out.display(), "saved exploded rows");
    Ok(counts)
}

/// Categorizer stage: paths and blank policy from `config`, count table to
/// stdout.
pub fn run(config: &Config) -> Result<LabelCounts> {
    let matcher = LabelMatcher::known()
        .clone()
        .with_blank_policy(BlankPolicy::from_label(
            config.categorize.blank_label.as_deref(),
        ));
    let counts = categorize_file(
        &config.paths.scraped_csv(),
        &config.paths.counts_csv(),
        &config.paths.exploded_csv(),
        &matcher,
    )?;
    summary::print(&counts);
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RECORD_HEADERS;
    use std::fs;

    fn record(scam_type: Option<&str>) -> ScamRecord {
        ScamRecord {
            primary_subject: "Subject".into(),
            complaint_narrative: "Narrative".into(),
            scam_type: scam_type.map(String::from),
            website: "site.test".into(),
        }
    }

    #[test]
    fn splits_concatenated_labels() {
        let got = LabelMatcher::known().split(Some("Fraudulent Trading PlatformPig Butchering Scam"));
        assert_eq!(got, vec!["Fraudulent Trading Platform", "Pig Butchering Scam"]);
    }

    #[test]
    fn repeated_label_is_not_merged() {
        for label in KNOWN_TYPES {
            let raw = format!("{label}{label}");
            assert_eq!(
                LabelMatcher::known().split(Some(raw.as_str())),
                vec![label.to_string(), label.to_string()],
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn unknown_text_is_kept_trimmed() {
        assert_eq!(
            LabelMatcher::known().split(Some("  Totally Unknown Category ")),
            vec!["Totally Unknown Category"]
        );
    }

    #[test]
    fn missing_cell_has_no_labels() {
        assert!(LabelMatcher::known().split(None).is_empty());
    }

    #[test]
    fn blank_cell_follows_policy() {
        let skip = LabelMatcher::known().clone();
        assert!(skip.split(Some("")).is_empty());
        assert!(skip.split(Some("   ")).is_empty());

        let sentinel = skip.with_blank_policy(BlankPolicy::from_label(Some("Unknown")));
        assert_eq!(sentinel.split(Some(" \t")), vec!["Unknown"]);
        // only blanks get the sentinel
        assert_eq!(sentinel.split(Some("Romance Scam")), vec!["Romance Scam"]);
        assert!(sentinel.split(None).is_empty());
    }

    #[test]
    fn blank_sentinel_label_falls_back_to_skip() {
        assert_eq!(BlankPolicy::from_label(Some("  ")), BlankPolicy::Skip);
        assert_eq!(BlankPolicy::from_label(None), BlankPolicy::Skip);
    }

    #[test]
    fn longest_label_wins_at_same_position() -> Result<()> {
        let m = LabelMatcher::new(["Scam", "Rug Pull Scam", "Rug Pull"])?;
        assert_eq!(m.split(Some("Rug Pull ScamScam")), vec!["Rug Pull Scam", "Scam"]);
        Ok(())
    }

    #[test]
    fn labels_embedded_in_noise_are_found() {
        let got = LabelMatcher::known().split(Some("misc: Romance Scam / Rug Pull Scam."));
        assert_eq!(got, vec!["Romance Scam", "Rug Pull Scam"]);
    }

    #[test]
    fn empty_label_set_is_rejected() {
        assert!(LabelMatcher::new(Vec::<String>::new()).is_err());
        assert!(LabelMatcher::new([""]).is_err());
    }

    #[test]
    fn exploded_rows_match_label_counts() {
        let records = vec![
            record(Some("Romance ScamRug Pull Scam")),
            record(None),
            record(Some("   ")),
            record(Some("Something New")),
            record(Some("Pig Butchering Scam")),
        ];
        let matcher = LabelMatcher::known();
        let exploded = explode(&records, matcher);

        let expected: usize = records
            .iter()
            .map(|r| matcher.split(r.scam_type.as_deref()).len())
            .sum();
        assert_eq!(exploded.len(), expected);
        assert_eq!(exploded.len(), 4);

        let labels: Vec<&str> = exploded.iter().map(|e| e.scam_type_list.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Romance Scam", "Rug Pull Scam", "Something New", "Pig Butchering Scam"]
        );
        assert_eq!(
            exploded[0].scam_type.as_deref(),
            Some("Romance ScamRug Pull Scam")
        );
    }

    #[test]
    fn counts_are_ordered_and_totalled() {
        let records = vec![
            record(Some("Romance Scam")),
            record(Some("Rug Pull ScamRomance Scam")),
            record(Some("AI Investment Scam")),
            record(Some("Rug Pull Scam")),
            record(Some("Zebra")),
        ];
        let counts = count_labels(&explode(&records, LabelMatcher::known()));

        let written = counts.with_total_row();
        let pairs: Vec<(&str, u64)> = written
            .iter()
            .map(|c| (c.scam_type.as_str(), c.count))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Romance Scam", 2),
                ("Rug Pull Scam", 2),
                ("AI Investment Scam", 1),
                ("Zebra", 1),
                ("Total", 6),
            ]
        );
        assert_eq!(counts.total, counts.rows.iter().map(|c| c.count).sum::<u64>());
    }

    #[test]
    fn empty_input_counts_to_zero_total() {
        let counts = count_labels(&[]);
        assert!(counts.rows.is_empty());
        assert_eq!(counts.total, 0);
        assert_eq!(
            counts.with_total_row(),
            vec![CountRow {
                scam_type: TOTAL_LABEL.into(),
                count: 0
            }]
        );
    }

    #[test]
    fn cell_reading_total_is_not_taken_for_the_total_row() {
        let records = vec![record(Some("Total")), record(Some("Romance Scam"))];
        let counts = count_labels(&explode(&records, LabelMatcher::known()));

        assert_eq!(counts.total, 2);
        assert_eq!(counts.total, counts.rows.iter().map(|c| c.count).sum::<u64>());

        let written = counts.with_total_row();
        let totals = written.iter().filter(|c| c.scam_type == TOTAL_LABEL).count();
        assert_eq!(totals, 1);
        assert_eq!(written.last().map(|c| c.count), Some(2));
        assert!(written
            .iter()
            .any(|c| c.scam_type == RESERVED_RENAME && c.count == 1));
    }

    #[test]
    fn sentinel_named_total_is_renamed() {
        assert_eq!(
            BlankPolicy::from_label(Some("total")),
            BlankPolicy::Sentinel(RESERVED_RENAME.into())
        );
    }

    #[test]
    fn categorize_file_is_idempotent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("scraped.csv");
        let records = vec![
            record(Some("Fraudulent Trading PlatformPig Butchering Scam")),
            record(Some("Crypto Giveaway/Airdrop Scam")),
            record(None),
            record(Some("Totally Unknown Category")),
        ];
        store::write_csv(&input, RECORD_HEADERS, &records)?;

        let counts_out = dir.path().join("counts.csv");
        let exploded_out = dir.path().join("exploded.csv");

        categorize_file(&input, &counts_out, &exploded_out, LabelMatcher::known())?;
        let counts_first = fs::read(&counts_out)?;
        let exploded_first = fs::read(&exploded_out)?;

        categorize_file(&input, &counts_out, &exploded_out, LabelMatcher::known())?;
        assert_eq!(fs::read(&counts_out)?, counts_first);
        assert_eq!(fs::read(&exploded_out)?, exploded_first);

        let counts_text = String::from_utf8(counts_first)?;
        assert!(counts_text.starts_with("scam_type,count\n"));
        assert!(counts_text.ends_with("Total,4\n"));

        let exploded = store::read_exploded(&exploded_out)?;
        assert_eq!(exploded.len(), 4);
        assert_eq!(exploded[2].scam_type_list, "Crypto Giveaway/Airdrop Scam");
        Ok(())
    }

    #[test]
    fn categorize_file_fails_without_input() {
        let dir = tempfile::tempdir().unwrap();
        let res = categorize_file(
            &dir.path().join("missing.csv"),
            &dir.path().join("c.csv"),
            &dir.path().join("e.csv"),
            LabelMatcher::known(),
        );
        assert!(res.is_err());
        assert!(!dir.path().join("c.csv").exists());
    }

    #[test]
    fn categorize_file_rejects_a_foreign_header() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("scraped.csv");
        std::fs::write(&input, "name,description,category\nAcme,lost funds,Romance Scam\n")?;
        let counts = dir.path().join("c.csv");
        let exploded = dir.path().join("e.csv");

        let res = categorize_file(&input, &counts, &exploded, LabelMatcher::known());
        assert!(res.is_err());
        assert!(!counts.exists());
        assert!(!exploded.exists());
        Ok(())
    }
}
