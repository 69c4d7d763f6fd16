//! # Annotation Dictionary Model
//!
//! One module of the annotation dictionary is a JSON array of field
//! descriptors. Each descriptor names a key that may appear on a remote
//! entity, and optionally enumerates the literals that key may take:
//!
//! ```json
//! [
//!   {"name": "species", "description": "Organism", "columnType": "STRING",
//!    "maximumSize": 50,
//!    "enumValues": [{"value": "human", "description": "Homo sapiens", "source": "NCBI"}]},
//!   {"name": "notes", "description": "Free text", "columnType": "STRING", "enumValues": []}
//! ]
//! ```
//!
//! [`parse_document`] is deliberately strict about the two attributes every
//! consumer relies on (`name` and `enumValues`) and lenient about the
//! descriptive ones, which default to empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::identity::ModuleName;

/// One field descriptor of a module's dictionary document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationField {
    /// The annotation key.
    pub name: String,
    /// Free-text description of the key.
    #[serde(default)]
    pub description: String,
    /// Platform column type tag, e.g. `"STRING"` or `"INTEGER"`.
    #[serde(default)]
    pub column_type: String,
    /// Maximum value length, when the platform constrains it.
    #[serde(default)]
    pub maximum_size: Option<i64>,
    /// Permitted literals. Empty means the field is free-form.
    #[serde(default)]
    pub enum_values: Vec<EnumEntry>,
}

/// One permitted literal of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntry {
    /// The literal, in its JSON text form for non-string scalars.
    pub value: String,
    /// Description of this literal. Named `description` in the raw document.
    #[serde(rename = "description", default, skip_serializing_if = "Option::is_none")]
    pub value_description: Option<String>,
    /// Provenance reference for the literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Any further attributes of the entry, e.g. an ontology term.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Enum entry attributes with a dedicated meaning; never kept in `extra`.
const ENTRY_ATTRIBUTES: [&str; 4] = ["value", "description", "source", "name"];

impl AnnotationField {
    /// A field with no enumerated values.
    pub fn free_form(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            column_type: String::new(),
            maximum_size: None,
            enum_values: Vec::new(),
        }
    }

    /// A field restricted to the given literals, in order.
    pub fn enumerated<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: values.into_iter().map(EnumEntry::new).collect(),
            ..Self::free_form(name)
        }
    }

    /// Returns true when the field carries no allowed-value constraint.
    pub fn is_free_form(&self) -> bool {
        self.enum_values.is_empty()
    }
}

impl EnumEntry {
    /// An entry with only a literal.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            value_description: None,
            source: None,
            extra: BTreeMap::new(),
        }
    }

    /// Extra attributes as literal text, in attribute name order.
    pub fn extra_literals(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.extra.iter().map(|(name, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.as_str(), text)
        })
    }
}

/// Parse one module's raw dictionary document.
///
/// # Errors
///
/// Returns a [`DocumentError`] naming the module, the zero-based field index
/// and the attribute for the first defect found. Nothing is skipped: a
/// document with one bad field is rejected as a whole.
pub fn parse_document(
    module: &ModuleName,
    bytes: &[u8],
) -> Result<Vec<AnnotationField>, DocumentError> {
    let items = parse_array(module, bytes)?;
    let mut fields = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| DocumentError::NotAnObject {
            module: module.to_string(),
            index,
        })?;
        fields.push(parse_field(module, index, obj)?);
    }

    tracing::debug!(module = %module, fields = fields.len(), "parsed annotation document");
    Ok(fields)
}

/// Extract only the field names from a dictionary document.
///
/// Used where the document serves as a list of annotation keys (manifest
/// columns) and the enumerations are irrelevant, so only `name` is required.
///
/// # Errors
///
/// Same error shape as [`parse_document`].
pub fn parse_field_names(module: &ModuleName, bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let items = parse_array(module, bytes)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = item.as_object().ok_or_else(|| DocumentError::NotAnObject {
                module: module.to_string(),
                index,
            })?;
            required_str(module, index, obj, "name")
        })
        .collect()
}

fn parse_array(module: &ModuleName, bytes: &[u8]) -> Result<Vec<Value>, DocumentError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| DocumentError::InvalidJson {
        module: module.to_string(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(DocumentError::NotAnArray {
            module: module.to_string(),
        }),
    }
}

fn parse_field(
    module: &ModuleName,
    index: usize,
    obj: &Map<String, Value>,
) -> Result<AnnotationField, DocumentError> {
    let name = required_str(module, index, obj, "name")?;
    let description = optional_str(module, index, obj, "description")?.unwrap_or_default();
    let column_type = optional_str(module, index, obj, "columnType")?.unwrap_or_default();
    let maximum_size = optional_int(module, index, obj, "maximumSize")?;

    let raw_values = match obj.get("enumValues") {
        Some(Value::Array(values)) => values,
        Some(_) => {
            return Err(DocumentError::InvalidAttribute {
                module: module.to_string(),
                index,
                attribute: "enumValues",
                expected: "an array",
            })
        }
        None => {
            return Err(DocumentError::MissingAttribute {
                module: module.to_string(),
                index,
                attribute: "enumValues",
            })
        }
    };

    let mut enum_values = Vec::with_capacity(raw_values.len());
    for (entry, raw) in raw_values.iter().enumerate() {
        enum_values.push(parse_entry(module, index, entry, &name, raw)?);
    }

    Ok(AnnotationField {
        name,
        description,
        column_type,
        maximum_size,
        enum_values,
    })
}

fn parse_entry(
    module: &ModuleName,
    index: usize,
    entry: usize,
    field_name: &str,
    raw: &Value,
) -> Result<EnumEntry, DocumentError> {
    let bad = |attribute: &'static str, expected: &'static str| DocumentError::InvalidEnumEntry {
        module: module.to_string(),
        index,
        entry,
        attribute,
        expected,
    };

    let obj = raw.as_object().ok_or_else(|| bad("(entry)", "a JSON object"))?;

    let value = obj
        .get("value")
        .and_then(scalar_literal)
        .ok_or_else(|| bad("value", "a string, number or boolean"))?;

    let text = |attribute: &'static str| match obj.get(attribute) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(bad(attribute, "a string")),
    };
    let value_description = text("description")?;
    let source = text("source")?;

    // An entry echoing a `name` would collide with the field's own key once
    // flattened. The field's identity is authoritative.
    if let Some(echo) = obj.get("name") {
        tracing::warn!(
            module = %module,
            field = field_name,
            entry,
            echo = %echo,
            "enum entry carries its own 'name' attribute; keeping the field name"
        );
    }

    let extra = obj
        .iter()
        .filter(|(attribute, v)| !ENTRY_ATTRIBUTES.contains(&attribute.as_str()) && !v.is_null())
        .map(|(attribute, v)| (attribute.clone(), v.clone()))
        .collect();

    Ok(EnumEntry {
        value,
        value_description,
        source,
        extra,
    })
}

/// Literal text of a JSON scalar: strings verbatim, numbers and booleans as written.
///
/// Numbers keep their document text (`1e2` stays `1e2`) because serde_json
/// is built with `arbitrary_precision`.
fn scalar_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required_str(
    module: &ModuleName,
    index: usize,
    obj: &Map<String, Value>,
    attribute: &'static str,
) -> Result<String, DocumentError> {
    optional_str(module, index, obj, attribute)?.ok_or_else(|| DocumentError::MissingAttribute {
        module: module.to_string(),
        index,
        attribute,
    })
}

fn optional_str(
    module: &ModuleName,
    index: usize,
    obj: &Map<String, Value>,
    attribute: &'static str,
) -> Result<Option<String>, DocumentError> {
    match obj.get(attribute) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DocumentError::InvalidAttribute {
            module: module.to_string(),
            index,
            attribute,
            expected: "a string",
        }),
    }
}

fn optional_int(
    module: &ModuleName,
    index: usize,
    obj: &Map<String, Value>,
    attribute: &'static str,
) -> Result<Option<i64>, DocumentError> {
    let invalid = || DocumentError::InvalidAttribute {
        module: module.to_string(),
        index,
        attribute,
        expected: "an integer",
    };
    match obj.get(attribute) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            // Some published documents write sizes as `250.0`.
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(invalid()),
            }
        }
        Some(_) => Err(invalid()),
    }
}
