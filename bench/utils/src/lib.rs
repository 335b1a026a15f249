//! Loading numeric series from files and writing descriptive statistics.
//!
//! `.csv` input is read as header-less comma separated values with every
//! field of every row taken in order; any other file is read as one number
//! per line. Blank lines and blank fields are skipped.

use anyhow::{bail, Context, Result};
use harness::describe::Description;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Lines,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> InputFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Lines,
        }
    }
}

/// Parse `content` into numbers. Errors name the offending line.
pub fn parse_values(content: &str, format: InputFormat) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = match format {
            InputFormat::Csv => line.split(',').collect(),
            InputFormat::Lines => vec![line],
        };
        for field in fields {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let value: f64 = field
                .parse()
                .with_context(|| format!("line {}: {field:?} is not a number", line_num + 1))?;
            if !value.is_finite() {
                bail!("line {}: {field:?} is not a finite number", line_num + 1);
            }
            values.push(value);
        }
    }
    Ok(values)
}

pub fn load_values(path: &Path) -> Result<Vec<f64>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let values = parse_values(&content, InputFormat::from_path(path))
        .with_context(|| format!("parsing {}", path.display()))?;
    if values.is_empty() {
        bail!("{} contains no numbers", path.display());
    }
    Ok(values)
}

/// Describe the numbers stored in `path`.
pub fn describe_file(path: &Path) -> Result<Description> {
    let values = load_values(path)?;
    log::debug!("{}: {} values", path.display(), values.len());
    Description::from_values(&values).context("no values to describe")
}

/// Write `statistic,value` rows with a header line.
pub fn write_csv(description: &Description, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "statistic,value")?;
    for (label, value) in description.rows() {
        writeln!(out, "{label},{value}")?;
    }
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
