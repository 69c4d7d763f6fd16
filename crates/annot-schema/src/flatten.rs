//! # Schema Flattening
//!
//! Normalizes a module's semi-structured dictionary into one flat table.
//!
//! ## Row Shape
//!
//! | key | description | columnType | maximumSize | valueDescription | value | source | module |
//! |-----|-------------|------------|-------------|------------------|-------|--------|--------|
//!
//! - A free-form field yields exactly one row with `value`,
//!   `valueDescription` and `source` empty.
//! - An enumerated field with `k` literals yields `k` rows in literal order,
//!   each carrying the field's scalar attributes.
//! - Rows appear in document order. Keys are not unique: two fields sharing
//!   a name both contribute rows.
//! - Extra enum entry attributes (an ontology term, say) ride along on their
//!   row and become trailing columns in CSV output.
//!
//! ## Merge By Identity
//!
//! A literal's own `description` becomes `valueDescription`, and the row's
//! `key` always comes from the field. Literal attributes are never
//! concatenated positionally with field attributes, so a literal that echoes
//! a `name` cannot displace the field's key (the parser logs that case).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use annot_core::{parse_document, AnnotationField, EnumEntry, ModuleName};
use serde::{Serialize, Serializer};

use crate::error::SchemaError;

/// Column order of the flattened table in every external representation.
pub const COLUMNS: [&str; 8] = [
    "key",
    "description",
    "columnType",
    "maximumSize",
    "valueDescription",
    "value",
    "source",
    "module",
];

/// One row of a flattened schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedSchemaRow {
    /// The field name this row belongs to.
    pub key: String,
    /// The field's description.
    pub description: String,
    /// The field's platform type tag.
    pub column_type: String,
    /// The field's maximum size, if any.
    pub maximum_size: Option<i64>,
    /// The literal's description; empty when absent or for free-form fields.
    pub value_description: String,
    /// The permitted literal; empty for free-form fields.
    pub value: String,
    /// The literal's provenance; empty when absent or for free-form fields.
    pub source: String,
    /// Module the field was flattened from.
    pub module: Option<ModuleName>,
    /// Extra attributes of the literal's enum entry, as literal text.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// The allowed-value constraint of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedValues {
    /// Free-form: any value is permitted.
    Unconstrained,
    /// Only these literals are permitted.
    Enumerated(BTreeSet<String>),
}

impl AllowedValues {
    /// Returns true if `value` satisfies the constraint.
    pub fn permits(&self, value: &str) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Enumerated(values) => values.contains(value),
        }
    }

    /// The permitted literals, or `None` for a free-form key.
    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Unconstrained => None,
            Self::Enumerated(values) => Some(values),
        }
    }

    /// Fold another contribution for the same key into this one.
    ///
    /// Enumerations union. A free-form contribution does not lift an
    /// existing enumeration, and an enumeration replaces a free-form entry.
    fn absorb(&mut self, key: &str, other: Self) {
        match (&mut *self, other) {
            (Self::Enumerated(mine), Self::Enumerated(theirs)) => mine.extend(theirs),
            (Self::Unconstrained, Self::Unconstrained) => {}
            (Self::Enumerated(_), Self::Unconstrained) => {
                tracing::warn!(key, "free-form duplicate of an enumerated field; keeping the enumeration");
            }
            (Self::Unconstrained, enumerated @ Self::Enumerated(_)) => {
                tracing::warn!(key, "enumerated duplicate of a free-form field; enforcing the enumeration");
                *self = enumerated;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyIndex {
    rows: Vec<usize>,
    allowed: AllowedValues,
}

/// A flattened, key-indexed dictionary table.
///
/// Immutable once built. Rows keep document order; the index maps each key
/// to its row positions and its [`AllowedValues`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlattenedSchema {
    rows: Vec<FlattenedSchemaRow>,
    index: HashMap<String, KeyIndex>,
}

/// Flatten one module's fields into a [`FlattenedSchema`].
///
/// `module` is attached to every row; pass `None` when the document's
/// provenance is unknown.
pub fn flatten(document: &[AnnotationField], module: Option<&ModuleName>) -> FlattenedSchema {
    let mut schema = FlattenedSchema::default();
    let mut enumerated = 0usize;

    for field in document {
        if field.is_free_form() {
            schema.push_group(vec![free_form_row(field, module)], AllowedValues::Unconstrained);
        } else {
            enumerated += 1;
            let rows: Vec<FlattenedSchemaRow> = field
                .enum_values
                .iter()
                .map(|entry| FlattenedSchemaRow {
                    key: field.name.clone(),
                    description: field.description.clone(),
                    column_type: field.column_type.clone(),
                    maximum_size: field.maximum_size,
                    value_description: entry.value_description.clone().unwrap_or_default(),
                    value: entry.value.clone(),
                    source: entry.source.clone().unwrap_or_default(),
                    module: module.cloned(),
                    extra: extra_columns(&field.name, entry),
                })
                .collect();
            let allowed = AllowedValues::Enumerated(rows.iter().map(|r| r.value.clone()).collect());
            schema.push_group(rows, allowed);
        }
    }

    tracing::debug!(
        module = module.map(ModuleName::as_str).unwrap_or("-"),
        fields = document.len(),
        enumerated,
        rows = schema.len(),
        "flattened annotation module"
    );
    schema
}

/// Read a local dictionary document and flatten it.
///
/// Parse errors are labelled with `module` when given, otherwise with the
/// document's file stem. Rows carry `module` as given.
///
/// # Errors
///
/// Returns [`SchemaError::Io`] if the file cannot be read and
/// [`SchemaError::Document`] if it is malformed.
pub fn flatten_path(path: &Path, module: Option<&ModuleName>) -> Result<FlattenedSchema, SchemaError> {
    let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let label = match module {
        Some(m) => m.clone(),
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| ModuleName::from_file_name(n).ok())
            .ok_or_else(|| SchemaError::ModuleName(path.display().to_string()))?,
    };
    let fields = parse_document(&label, &bytes)?;
    Ok(flatten(&fields, module))
}

fn free_form_row(field: &AnnotationField, module: Option<&ModuleName>) -> FlattenedSchemaRow {
    FlattenedSchemaRow {
        key: field.name.clone(),
        description: field.description.clone(),
        column_type: field.column_type.clone(),
        maximum_size: field.maximum_size,
        value_description: String::new(),
        value: String::new(),
        source: String::new(),
        module: module.cloned(),
        extra: BTreeMap::new(),
    }
}

fn extra_columns(key: &str, entry: &EnumEntry) -> BTreeMap<String, String> {
    entry
        .extra_literals()
        .filter(|(attribute, _)| {
            let clash = COLUMNS.contains(attribute);
            if clash {
                tracing::warn!(key, attribute, "enum entry attribute shadows a schema column; dropped");
            }
            !clash
        })
        .map(|(attribute, text)| (attribute.to_string(), text))
        .collect()
}

impl FlattenedSchema {
    fn push_group(&mut self, rows: Vec<FlattenedSchemaRow>, allowed: AllowedValues) {
        let Some(key) = rows.first().map(|r| r.key.clone()) else {
            return;
        };
        let start = self.rows.len();
        let positions: Vec<usize> = (start..start + rows.len()).collect();
        self.rows.extend(rows);

        match self.index.get_mut(&key) {
            Some(entry) => {
                entry.rows.extend(positions);
                entry.allowed.absorb(&key, allowed);
            }
            None => {
                self.index.insert(
                    key,
                    KeyIndex {
                        rows: positions,
                        allowed,
                    },
                );
            }
        }
    }

    /// Concatenate schemas (typically one per module) in iteration order.
    ///
    /// Keys present in several schemas keep all their rows; their allowed
    /// values are combined as for duplicate fields within one module.
    pub fn concat<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = FlattenedSchema>,
    {
        let mut combined = Self::default();
        for schema in schemas {
            let offset = combined.rows.len();
            combined.rows.extend(schema.rows);
            for (key, entry) in schema.index {
                let shifted: Vec<usize> = entry.rows.iter().map(|r| r + offset).collect();
                match combined.index.get_mut(&key) {
                    Some(existing) => {
                        existing.rows.extend(shifted);
                        existing.allowed.absorb(&key, entry.allowed);
                    }
                    None => {
                        combined.index.insert(
                            key,
                            KeyIndex {
                                rows: shifted,
                                allowed: entry.allowed,
                            },
                        );
                    }
                }
            }
        }
        combined
    }

    /// All rows in document order.
    pub fn rows(&self) -> &[FlattenedSchemaRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the schema has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.key.as_str())
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// Returns true if any row is keyed by `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Rows keyed by `key`, in document order.
    pub fn rows_for<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a FlattenedSchemaRow> + 'a {
        self.index
            .get(key)
            .into_iter()
            .flat_map(|entry| entry.rows.iter())
            .filter_map(|&i| self.rows.get(i))
    }

    /// The `value` column of the rows keyed by `key`, in document order.
    pub fn values_for(&self, key: &str) -> Vec<&str> {
        self.rows_for(key).map(|r| r.value.as_str()).collect()
    }

    /// The allowed-value constraint of `key`, if the key is in the schema.
    pub fn allowed(&self, key: &str) -> Option<&AllowedValues> {
        self.index.get(key).map(|entry| &entry.allowed)
    }

    /// Names of the extra entry attributes carried by any row, sorted.
    pub fn extra_columns(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|r| r.extra.keys().map(String::as_str))
            .collect()
    }

    /// Write the table as CSV with a header row in [`COLUMNS`] order,
    /// followed by any [`extra_columns`](Self::extra_columns). Cells a row
    /// does not carry are empty.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Csv`] if the writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SchemaError> {
        let extra = self.extra_columns();
        let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        out.write_record(COLUMNS.iter().copied().chain(extra.iter().copied()))?;

        for row in &self.rows {
            let maximum_size = row.maximum_size.map(|n| n.to_string()).unwrap_or_default();
            let mut record: Vec<&str> = vec![
                row.key.as_str(),
                row.description.as_str(),
                row.column_type.as_str(),
                maximum_size.as_str(),
                row.value_description.as_str(),
                row.value.as_str(),
                row.source.as_str(),
                row.module.as_ref().map_or("", ModuleName::as_str),
            ];
            record.extend(extra.iter().map(|c| row.extra.get(*c).map_or("", String::as_str)));
            out.write_record(&record)?;
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

impl Serialize for FlattenedSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn field() -> impl Strategy<Value = AnnotationField> {
        (
            "[a-z]{1,6}",
            prop::collection::vec("[a-zA-Z0-9 ]{0,8}", 0..6),
        )
            .prop_map(|(name, values)| AnnotationField::enumerated(name, values))
    }

    proptest! {
        /// Every field contributes max(1, k) rows, in order, with its values.
        #[test]
        fn row_count_matches_fields(doc in prop::collection::vec(field(), 0..8)) {
            let schema = flatten(&doc, None);
            let expected: usize = doc.iter().map(|f| f.enum_values.len().max(1)).sum();
            prop_assert_eq!(schema.len(), expected);

            let mut cursor = 0;
            for f in &doc {
                if f.is_free_form() {
                    prop_assert_eq!(&schema.rows()[cursor].value, "");
                    cursor += 1;
                } else {
                    for entry in &f.enum_values {
                        prop_assert_eq!(&schema.rows()[cursor].key, &f.name);
                        prop_assert_eq!(&schema.rows()[cursor].value, &entry.value);
                        cursor += 1;
                    }
                }
            }
        }

        /// Flattening the same document twice yields identical tables.
        #[test]
        fn flatten_is_idempotent(doc in prop::collection::vec(field(), 0..8)) {
            prop_assert_eq!(flatten(&doc, None), flatten(&doc, None));
        }

        /// Every field name is a key of the flattened table.
        #[test]
        fn every_field_is_present(doc in prop::collection::vec(field(), 0..8)) {
            let schema = flatten(&doc, None);
            for f in &doc {
                prop_assert!(schema.contains_key(&f.name));
                prop_assert!(schema.rows_for(&f.name).count() >= 1);
            }
        }
    }
}
