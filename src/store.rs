// src/store.rs

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::model::{ExplodedRecord, ScamRecord, EXPLODED_HEADERS, RECORD_HEADERS};

/// Read a headed CSV into `T`, failing before any row is read if the header
/// lacks one of `required`.
pub fn read_csv<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|want| !headers.iter().any(|h| h == *want))
        .collect();
    if !missing.is_empty() {
        bail!(
            "{}: missing column(s) {} (found {})",
            path.display(),
            missing.join(", "),
            headers.iter().collect::<Vec<_>>().join(", ")
        );
    }
    let mut rows = Vec::new();
    for (i, row) in rdr.deserialize().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row: T = row.with_context(|| format!("{}: bad row at line {}", path.display(), i + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_records(path: &Path) -> Result<Vec<ScamRecord>> {
    read_csv(path, RECORD_HEADERS)
}

pub fn read_exploded(path: &Path) -> Result<Vec<ExplodedRecord>> {
    read_csv(path, EXPLODED_HEADERS)
}

/// Write `headers` then one line per row. The header is always written, even
/// for an empty table. Data lands in a `.tmp` sibling first and is renamed
/// into place once flushed.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp_path = tmp_sibling(path);
    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("could not create `{}`", tmp_path.display()))?;
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        wtr.write_record(headers)
            .with_context(|| format!("writing header to {}", tmp_path.display()))?;
        for row in rows {
            wtr.serialize(row)
                .with_context(|| format!("writing row to {}", tmp_path.display()))?;
        }
        wtr.flush()
            .with_context(|| format!("flushing {}", tmp_path.display()))?;
    }
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to rename `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
