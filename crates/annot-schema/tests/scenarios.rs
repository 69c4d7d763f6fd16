//! # End-to-End Flatten/Validate Scenarios
//!
//! Documents are parsed from JSON exactly as published, flattened, and used
//! to validate small observed tables.

use std::collections::BTreeSet;

use annot_core::{parse_document, ModuleName, ObservedTable};
use annot_schema::{flatten, validate, AllowedValues, FlattenedSchema};

fn flatten_json(module: &str, json: &str) -> FlattenedSchema {
    let module = ModuleName::new(module).unwrap();
    let fields = parse_document(&module, json.as_bytes()).unwrap();
    flatten(&fields, Some(&module))
}

fn species_schema() -> FlattenedSchema {
    flatten_json(
        "experimentalData",
        r#"[{"name": "species", "enumValues": [{"value": "human"}, {"value": "mouse"}]}]"#,
    )
}

#[test]
fn enumerated_field_expands_to_one_row_per_value() {
    let schema = species_schema();
    assert_eq!(schema.len(), 2);
    assert!(schema.rows().iter().all(|r| r.key == "species"));
    let values: BTreeSet<&str> = schema.values_for("species").into_iter().collect();
    assert_eq!(values, BTreeSet::from(["human", "mouse"]));
}

#[test]
fn free_form_field_is_a_single_empty_row() {
    let schema = flatten_json("experimentalData", r#"[{"name": "notes", "enumValues": []}]"#);
    assert_eq!(schema.len(), 1);
    assert_eq!(schema.rows()[0].key, "notes");
    assert_eq!(schema.rows()[0].value, "");
    assert_eq!(schema.allowed("notes"), Some(&AllowedValues::Unconstrained));
}

#[test]
fn unknown_species_is_reported() {
    let table = ObservedTable::from_str_columns([("species", vec!["human", "rat"])]).unwrap();
    let report = validate(&table, &species_schema());
    let malformed = report.into_malformed();
    assert_eq!(malformed.len(), 1);
    assert_eq!(malformed["species"], BTreeSet::from(["rat".to_string()]));
}

#[test]
fn known_species_only_is_clean() {
    let table = ObservedTable::from_str_columns([("species", vec!["human", "mouse"])]).unwrap();
    assert!(validate(&table, &species_schema()).malformed().is_empty());
}

#[test]
fn unrelated_columns_are_ignored() {
    let table = ObservedTable::from_str_columns([
        ("unrelatedField", vec!["x"]),
        ("species", vec!["mouse"]),
    ])
    .unwrap();
    let report = validate(&table, &species_schema());
    assert!(report.is_clean());
    assert_eq!(report.checked(), ["species"]);
}

#[test]
fn csv_view_against_multi_field_module() {
    let schema = flatten_json(
        "neuro",
        r#"[
            {"name": "tissue", "description": "Tissue", "columnType": "STRING",
             "enumValues": [{"value": "cerebellum"}, {"value": "hippocampus"}]},
            {"name": "assay", "columnType": "STRING",
             "enumValues": [{"value": "rnaSeq"}, {"value": "wholeGenomeSeq"}]},
            {"name": "specimenID", "columnType": "STRING", "enumValues": []}
        ]"#,
    );
    let view = "id,name,tissue,assay,specimenID\n\
                syn1,a.bam,cerebellum,rnaSeq,S1\n\
                syn2,b.bam,cortex,rnaseq,S2\n\
                syn3,c.bam,,wholeGenomeSeq,S3\n";
    let table = ObservedTable::from_csv_reader(view.as_bytes(), b',').unwrap();

    let report = validate(&table, &schema);
    assert_eq!(report.checked(), ["tissue", "assay", "specimenID"]);
    let malformed = report.malformed();
    assert_eq!(malformed.len(), 2);
    assert_eq!(malformed["tissue"], BTreeSet::from(["cortex".to_string()]));
    assert_eq!(malformed["assay"], BTreeSet::from(["rnaseq".to_string()]));
}

#[test]
fn concatenated_modules_validate_together() {
    let a = species_schema();
    let b = flatten_json("analysis", r#"[{"name": "tool", "enumValues": [{"value": "STAR"}]}]"#);
    let combined = FlattenedSchema::concat([a, b]);

    let table = ObservedTable::from_str_columns([
        ("species", vec!["human"]),
        ("tool", vec!["bwa"]),
    ])
    .unwrap();
    let report = validate(&table, &combined);
    assert_eq!(report.fields().collect::<Vec<_>>(), ["tool"]);
    assert_eq!(
        combined.rows_for("tool").next().and_then(|r| r.module.as_ref()).map(ModuleName::as_str),
        Some("analysis")
    );
}

#[test]
fn number_literals_validate_by_document_text() {
    let schema = flatten_json(
        "experimentalData",
        r#"[{"name": "readLength", "columnType": "INTEGER",
             "enumValues": [{"value": 1e2}, {"value": 150}]}]"#,
    );
    assert_eq!(schema.values_for("readLength"), ["1e2", "150"]);

    let table = ObservedTable::from_str_columns([("readLength", vec!["1e2", "150", "100.0"])]).unwrap();
    let report = validate(&table, &schema);
    assert_eq!(report.malformed()["readLength"], BTreeSet::from(["100.0".to_string()]));
}

#[test]
fn free_text_under_free_form_key_is_never_malformed() {
    let schema = flatten_json("experimentalData", r#"[{"name": "notes", "enumValues": []}]"#);
    let table = ObservedTable::from_str_columns([("notes", vec!["free text", ""])]).unwrap();
    let report = validate(&table, &schema);
    assert!(report.is_clean());
    assert_eq!(report.checked(), ["notes"]);
}
