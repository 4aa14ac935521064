//! Parser for the benchmark scores dataset.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::dataset::stats::{numeric_stats, parse_numeric};

/// Benchmark name substrings matched case-insensitively against column
/// headers. The upstream schema names score columns after the benchmark.
const BENCHMARK_PATTERNS: &[&str] = &[
    "mmlu",
    "glue",
    "superglue",
    "hellaswag",
    "truthfulqa",
    "gpqa",
    "math",
    "frontiermath",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarksSummary {
    pub last_updated: DateTime<Utc>,
    pub total_entries: usize,
    pub benchmarks: BTreeMap<String, BenchmarkStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub max: f64,
    pub mean: f64,
    pub count: usize,
    pub latest_date: Option<String>,
}

/// Parses the benchmarks CSV: every column whose name contains a known
/// benchmark substring gets max/mean/count over its numeric values, plus the
/// last non-empty date (file order) among its scored rows when a `date`
/// column exists. Columns with no numeric values are omitted.
pub fn parse_benchmarks(csv_path: &Path) -> Result<BenchmarksSummary> {
    info!("Parsing benchmarks dataset: {}", csv_path.display());

    let file =
        File::open(csv_path).with_context(|| format!("opening {}", csv_path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .context("reading csv headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    info!("Benchmark columns: {:?}", headers);

    let date_idx = headers.iter().position(|h| h.eq_ignore_ascii_case("date"));

    let score_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let lower = h.to_lowercase();
            BENCHMARK_PATTERNS.iter().any(|p| lower.contains(p))
        })
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .context("reading csv rows")?;

    let mut benchmarks = BTreeMap::new();
    for (idx, name) in score_columns {
        let mut values = Vec::new();
        let mut latest_date = None;

        for record in &records {
            let Some(score) = record.get(idx).and_then(parse_numeric) else {
                continue;
            };
            values.push(score);

            if let Some(di) = date_idx {
                let date = record.get(di).unwrap_or("").trim();
                if !date.is_empty() {
                    latest_date = Some(date.to_string());
                }
            }
        }

        if let Some(stats) = numeric_stats(&values) {
            benchmarks.insert(
                name,
                BenchmarkStats {
                    max: stats.max,
                    mean: stats.mean,
                    count: values.len(),
                    latest_date,
                },
            );
        }
    }

    Ok(BenchmarksSummary {
        last_updated: Utc::now(),
        total_entries: records.len(),
        benchmarks,
    })
}
