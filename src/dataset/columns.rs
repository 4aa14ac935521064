//! Canonical column names for the models dataset.
//!
//! The source schema is not contractually stable across provider revisions,
//! so only known header variants are renamed; everything else passes through
//! untouched.

use csv::StringRecord;

/// Known header variants across provider schema revisions.
const COLUMN_MAPPING: &[(&str, &str)] = &[
    ("Training compute (FLOP)", "compute_flop"),
    ("Training Compute (FLOP)", "compute_flop"),
    ("Compute (FLOP)", "compute_flop"),
    ("Parameters", "parameters"),
    ("Domain", "domain"),
    ("Organization", "organization"),
    ("Publication date", "publication_date"),
    ("Publication Date", "publication_date"),
    ("Model", "model_name"),
    ("Model name", "model_name"),
    ("Notability criteria", "notability"),
    ("Confidence", "confidence"),
];

pub fn canonical_name(header: &str) -> &str {
    COLUMN_MAPPING
        .iter()
        .find(|(from, _)| *from == header)
        .map(|(_, to)| *to)
        .unwrap_or(header)
}

pub fn canonical_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| canonical_name(h).to_string())
        .collect()
}

pub fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_variants_renamed() {
        assert_eq!(canonical_name("Training compute (FLOP)"), "compute_flop");
        assert_eq!(canonical_name("Training Compute (FLOP)"), "compute_flop");
        assert_eq!(canonical_name("Model"), "model_name");
        assert_eq!(canonical_name("Domain"), "domain");
    }

    #[test]
    fn test_unknown_headers_pass_through() {
        assert_eq!(canonical_name("Country (of organization)"), "Country (of organization)");
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let raw = StringRecord::from(vec![
            "Model",
            "Organization",
            "Domain",
            "Training compute (FLOP)",
        ]);
        let once = canonical_headers(&raw);
        let twice = canonical_headers(&StringRecord::from(once.clone()));
        assert_eq!(once, twice);
    }
}
