//! # Annotation Document Parsing Against Published Shapes
//!
//! Exercises `parse_document` on documents shaped like the modules of the
//! public annotation dictionary, including the irregularities found there:
//! fields without descriptions, numeric literals, and null sources.

use annot_core::{parse_document, DocumentError, ModuleName};

const NEURO_MODULE: &str = r#"[
  {
    "name": "tissue",
    "description": "Tissue from which a sample was derived",
    "columnType": "STRING",
    "maximumSize": 250,
    "enumValues": [
      {"value": "dorsolateral prefrontal cortex", "description": "", "source": "http://purl.obolibrary.org/obo/UBERON_0009834"},
      {"value": "cerebellum", "description": "Part of the metencephalon", "source": null},
      {"value": "hippocampus"}
    ]
  },
  {
    "name": "cellType",
    "description": "",
    "columnType": "STRING",
    "enumValues": []
  },
  {
    "name": "readLength",
    "columnType": "INTEGER",
    "enumValues": [{"value": 50}, {"value": 100}, {"value": 150}]
  }
]"#;

#[test]
fn parses_neuro_module() {
    let module = ModuleName::new("neuro").unwrap();
    let fields = parse_document(&module, NEURO_MODULE.as_bytes()).unwrap();

    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name, "tissue");
    assert_eq!(fields[0].enum_values.len(), 3);
    assert_eq!(fields[0].enum_values[0].value_description.as_deref(), Some(""));
    assert_eq!(fields[0].enum_values[1].source, None);
    assert!(fields[1].is_free_form());
    assert_eq!(fields[2].column_type, "INTEGER");

    let lengths: Vec<&str> = fields[2].enum_values.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(lengths, ["50", "100", "150"]);
}

#[test]
fn second_bad_field_is_reported_with_its_index() {
    let module = ModuleName::new("neuro").unwrap();
    let doc = r#"[{"name": "a", "enumValues": []}, {"name": 7, "enumValues": []}]"#;
    let err = parse_document(&module, doc.as_bytes()).unwrap_err();
    assert_eq!(
        err,
        DocumentError::InvalidAttribute {
            module: "neuro".to_string(),
            index: 1,
            attribute: "name",
            expected: "a string",
        }
    );
    assert!(err.to_string().contains("field #1"));
}

#[test]
fn empty_document_has_no_fields() {
    let module = ModuleName::new("empty").unwrap();
    assert!(parse_document(&module, b"[]").unwrap().is_empty());
}
