//! Missing value profile of the loaded applicant records

use super::record::{ApplicantRecord, CategoricalAttribute, NumericAttribute};

/// Ratio of missing values per attribute column, sorted by ratio descending.
///
/// Columns with no missing values are included with a ratio of 0.
pub fn analyze_missing_values(records: &[ApplicantRecord]) -> Vec<(String, f64)> {
    if records.is_empty() {
        return Vec::new();
    }

    let total = records.len() as f64;
    let mut missing_ratios: Vec<(String, f64)> = Vec::new();

    for attribute in NumericAttribute::ALL {
        let missing = records
            .iter()
            .filter(|r| r.numeric(attribute).is_none())
            .count();
        missing_ratios.push((attribute.column().to_string(), missing as f64 / total));
    }

    for attribute in CategoricalAttribute::ALL {
        let missing = records
            .iter()
            .filter(|r| r.categorical(attribute).is_none())
            .count();
        missing_ratios.push((attribute.column().to_string(), missing as f64 / total));
    }

    // Stable sort keeps declaration order among equal ratios
    missing_ratios.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    missing_ratios
}

/// Columns whose missing ratio is strictly above zero
pub fn columns_with_missing(missing_ratios: &[(String, f64)]) -> Vec<&(String, f64)> {
    missing_ratios.iter().filter(|(_, ratio)| *ratio > 0.0).collect()
}
