//! # Dataset Validation
//!
//! Detects out-of-vocabulary values in an observed table.
//!
//! For every column that is also a schema key, the distinct present values
//! of the column are compared against the key's [`AllowedValues`]. Columns
//! unknown to the schema are ignored, as are free-form keys. The result is
//! sparse: only keys with at least one offending value appear.
//!
//! Comparison is exact on the literal text: no case folding, no trimming,
//! no numeric coercion (`"1"` and `"1.0"` are different values).

use std::collections::{BTreeMap, BTreeSet};

use annot_core::ObservedTable;
use serde::Serialize;

use crate::flatten::{AllowedValues, FlattenedSchema};

/// Outcome of validating one observed table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    /// Keys examined: columns present in both the table and the schema,
    /// in table column order.
    checked: Vec<String>,
    /// Key -> observed values not permitted by the schema.
    malformed: BTreeMap<String, BTreeSet<String>>,
}

impl ValidationReport {
    /// Returns true if no malformed values were found.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }

    /// The sparse mapping from key to malformed values.
    pub fn malformed(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.malformed
    }

    /// Consume the report, returning the malformed-value mapping.
    pub fn into_malformed(self) -> BTreeMap<String, BTreeSet<String>> {
        self.malformed
    }

    /// Keys that were examined.
    pub fn checked(&self) -> &[String] {
        &self.checked
    }

    /// Keys with at least one malformed value.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.malformed.keys().map(String::as_str)
    }
}

/// Validate `observed` against `schema`.
///
/// Never fails: missing columns are skipped and only content mismatches are
/// reported.
pub fn validate(observed: &ObservedTable, schema: &FlattenedSchema) -> ValidationReport {
    let mut report = ValidationReport::default();

    for column in observed.column_names() {
        let Some(allowed) = schema.allowed(column) else {
            continue;
        };
        report.checked.push(column.to_string());

        let AllowedValues::Enumerated(permitted) = allowed else {
            tracing::trace!(column, "free-form key; any value accepted");
            continue;
        };

        let malformed: BTreeSet<String> = observed
            .unique_values(column)
            .unwrap_or_default()
            .into_iter()
            .filter(|v| !permitted.contains(*v))
            .map(str::to_string)
            .collect();

        if !malformed.is_empty() {
            tracing::debug!(column, count = malformed.len(), "out-of-vocabulary values");
            report.malformed.insert(column.to_string(), malformed);
        }
    }

    tracing::info!(
        checked = report.checked.len(),
        malformed = report.malformed.len(),
        "validated observed table"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use annot_core::AnnotationField;

    fn species_schema() -> FlattenedSchema {
        flatten(&[AnnotationField::enumerated("species", ["human", "mouse"])], None)
    }

    #[test]
    fn reports_values_outside_the_enumeration() {
        let table = ObservedTable::from_str_columns([("species", vec!["human", "rat", "rat"])]).unwrap();
        let report = validate(&table, &species_schema());
        assert!(!report.is_clean());
        let malformed = report.malformed().get("species").unwrap();
        assert_eq!(malformed.iter().collect::<Vec<_>>(), ["rat"]);
    }

    #[test]
    fn clean_table_yields_empty_mapping() {
        let table = ObservedTable::from_str_columns([("species", vec!["human", "mouse"])]).unwrap();
        let report = validate(&table, &species_schema());
        assert!(report.is_clean());
        assert_eq!(report.checked(), ["species"]);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let table = ObservedTable::from_str_columns([("unrelatedField", vec!["anything"])]).unwrap();
        let report = validate(&table, &species_schema());
        assert!(report.is_clean());
        assert!(report.checked().is_empty());
    }

    #[test]
    fn comparison_is_exact() {
        let table = ObservedTable::from_str_columns([("species", vec!["Human", "human ", "mouse"])]).unwrap();
        let report = validate(&table, &species_schema());
        let malformed = report.malformed().get("species").unwrap();
        assert!(malformed.contains("Human"));
        assert!(malformed.contains("human "));
        assert!(!malformed.contains("mouse"));
    }

    #[test]
    fn numeric_literals_are_not_coerced() {
        let schema = flatten(&[AnnotationField::enumerated("readLength", ["50", "100"])], None);
        let table = ObservedTable::from_str_columns([("readLength", vec!["50", "100.0"])]).unwrap();
        let report = validate(&table, &schema);
        assert_eq!(
            report.malformed().get("readLength").unwrap().iter().collect::<Vec<_>>(),
            ["100.0"]
        );
    }

    #[test]
    fn free_form_keys_accept_any_value() {
        let schema = flatten(&[AnnotationField::free_form("notes")], None);
        let table = ObservedTable::from_str_columns([("notes", vec!["whatever", "else"])]).unwrap();
        let report = validate(&table, &schema);
        assert!(report.is_clean());
        assert_eq!(report.checked(), ["notes"]);
    }

    #[test]
    fn missing_cells_are_not_values() {
        let table = ObservedTable::from_columns([("species", vec![None, Some("human".to_string())])]).unwrap();
        assert!(validate(&table, &species_schema()).is_clean());
    }

    #[test]
    fn report_serializes_as_sorted_sets() {
        let table = ObservedTable::from_str_columns([("species", vec!["zebrafish", "rat"])]).unwrap();
        let json = serde_json::to_value(validate(&table, &species_schema())).unwrap();
        assert_eq!(json["malformed"]["species"], serde_json::json!(["rat", "zebrafish"]));
    }
}
