//! Parser for the AI models dataset.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use crate::dataset::columns::{canonical_headers, column_index};
use crate::dataset::stats::{numeric_stats, parse_numeric};

const RECENT_MODELS_LIMIT: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelsSummary {
    pub last_updated: DateTime<Utc>,
    pub total_models: usize,
    pub language_models: usize,
    pub models_with_compute: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_stats: Option<ComputeStats>,
    pub recent_models: Vec<RecentModel>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputeStats {
    pub min_flop: f64,
    pub max_flop: f64,
    pub mean_flop: f64,
    pub median_flop: f64,
    pub total_models_with_compute: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecentModel {
    pub model_name: String,
    pub publication_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_flop: Option<f64>,
}

/// Parses the models CSV into a summary of language-model compute.
///
/// Rows whose domain contains "language" or "llm" (case-insensitive) count
/// as language models; when the domain column is absent no filtering is
/// applied. Compute statistics cover the language subset only. Output is
/// deterministic for identical input bytes, except `last_updated`.
pub fn parse_models(csv_path: &Path) -> Result<ModelsSummary> {
    info!("Parsing models dataset: {}", csv_path.display());

    let file =
        File::open(csv_path).with_context(|| format!("opening {}", csv_path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = canonical_headers(reader.headers().context("reading csv headers")?);
    info!("Available columns: {:?}", headers);

    let domain_idx = column_index(&headers, "domain");
    let compute_idx = column_index(&headers, "compute_flop");
    let name_idx = column_index(&headers, "model_name");
    let date_idx = column_index(&headers, "publication_date");

    if domain_idx.is_none() {
        warn!("Domain column not found, using all models");
    }

    let mut total_models = 0;
    let mut language_models = 0;
    let mut compute_values = Vec::new();
    let mut dated_models: Vec<RecentModel> = Vec::new();

    for record in reader.records() {
        let record = record.context("reading csv row")?;
        total_models += 1;

        let is_language = match domain_idx {
            Some(i) => {
                let domain = record.get(i).unwrap_or("").to_lowercase();
                domain.contains("language") || domain.contains("llm")
            }
            None => true,
        };
        if is_language {
            language_models += 1;
        }

        let compute = compute_idx
            .and_then(|i| record.get(i))
            .and_then(parse_numeric);
        if is_language {
            if let Some(v) = compute {
                compute_values.push(v);
            }
        }

        if let (Some(ni), Some(di)) = (name_idx, date_idx) {
            if let Some(date) = record.get(di).and_then(parse_publication_date) {
                dated_models.push(RecentModel {
                    model_name: record.get(ni).unwrap_or("").to_string(),
                    publication_date: date,
                    compute_flop: compute,
                });
            }
        }
    }

    // Newest first; sort is stable, so ties keep file order.
    dated_models.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
    dated_models.truncate(RECENT_MODELS_LIMIT);

    let compute_stats = numeric_stats(&compute_values).map(|s| ComputeStats {
        min_flop: s.min,
        max_flop: s.max,
        mean_flop: s.mean,
        median_flop: s.median,
        total_models_with_compute: compute_values.len(),
    });

    Ok(ModelsSummary {
        last_updated: Utc::now(),
        total_models,
        language_models,
        models_with_compute: compute_values.len(),
        compute_stats,
        recent_models: dated_models,
    })
}

fn parse_publication_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai-models.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_language_model_filtering_and_compute_stats() {
        let (_dir, path) = write_csv(
            "Model,Organization,Domain,Training compute (FLOP)\n\
             GPT-X,Acme,Language Model,1e24\n\
             ImgNet,Acme,Vision,5e20\n",
        );

        let summary = parse_models(&path).unwrap();
        assert_eq!(summary.total_models, 2);
        assert_eq!(summary.language_models, 1);
        assert_eq!(summary.models_with_compute, 1);
        let stats = summary.compute_stats.unwrap();
        assert_eq!(stats.max_flop, 1e24);
        assert_eq!(stats.min_flop, 1e24);
        assert_eq!(stats.total_models_with_compute, 1);
    }

    #[test]
    fn test_missing_domain_column_keeps_all_rows() {
        let (_dir, path) = write_csv(
            "Model,Training compute (FLOP)\n\
             GPT-X,1e24\n\
             ImgNet,5e20\n\
             Mystery,\n",
        );

        let summary = parse_models(&path).unwrap();
        assert_eq!(summary.total_models, 3);
        assert_eq!(summary.language_models, summary.total_models);
        assert_eq!(summary.models_with_compute, 2);
    }

    #[test]
    fn test_non_numeric_compute_yields_empty_stats() {
        let (_dir, path) = write_csv(
            "Model,Domain,Training compute (FLOP)\n\
             A,Language,unknown\n\
             B,Language,n/a\n",
        );

        let summary = parse_models(&path).unwrap();
        assert_eq!(summary.total_models, 2);
        assert_eq!(summary.models_with_compute, 0);
        assert!(summary.compute_stats.is_none());
    }

    #[test]
    fn test_recent_models_sorted_newest_first() {
        let (_dir, path) = write_csv(
            "Model,Domain,Publication date,Training compute (FLOP)\n\
             Old,Language,2020-05-01,1e22\n\
             New,Language,2024-03-15,1e25\n\
             Undated,Language,,1e23\n",
        );

        let summary = parse_models(&path).unwrap();
        assert_eq!(summary.recent_models.len(), 2);
        assert_eq!(summary.recent_models[0].model_name, "New");
        assert_eq!(summary.recent_models[1].model_name, "Old");
        assert_eq!(summary.recent_models[0].compute_flop, Some(1e25));
    }

    #[test]
    fn test_recent_models_capped_at_ten() {
        let mut content = String::from("Model,Publication date\n");
        for i in 0..15 {
            content.push_str(&format!("M{i},2024-01-{:02}\n", i + 1));
        }
        let (_dir, path) = write_csv(&content);

        let summary = parse_models(&path).unwrap();
        assert_eq!(summary.recent_models.len(), 10);
        assert_eq!(summary.recent_models[0].model_name, "M14");
    }
}
