//! # Identifier Newtypes
//!
//! String newtypes for the three namespaces the curator deals with. A
//! module name, a release tag and a remote entity id are all plain strings
//! on the wire; the newtypes keep them from being swapped in signatures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Name of an annotation module, e.g. `"experimentalData"`.
///
/// Module names are the file stems of the dictionary documents, so they
/// must be non-empty and must not contain path separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleName(String);

/// Release label carried by unversioned dictionaries.
pub const LOCAL_RELEASE: &str = "local";

/// Published version tag of the annotation dictionary, e.g. `"v7.2.0"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseVersion(String);

/// Identifier of an entity (project, folder, file, table) in the remote store,
/// e.g. `"syn1234567"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl ModuleName {
    /// Create a module name, rejecting empty input and path separators.
    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentifierError {
                kind: "module name",
                value: name,
                reason: "must not be empty",
            });
        }
        if name.contains('/') || name.contains('\\') {
            return Err(IdentifierError {
                kind: "module name",
                value: name,
                reason: "must not contain path separators",
            });
        }
        Ok(Self(name))
    }

    /// Derive a module name from a document file name (`"analysis.json"` -> `"analysis"`).
    pub fn from_file_name(file_name: &str) -> Result<Self, IdentifierError> {
        let stem = std::path::Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        Self::new(stem)
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ReleaseVersion {
    /// Create a release version, rejecting empty tags.
    pub fn new(tag: impl Into<String>) -> Result<Self, IdentifierError> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(IdentifierError {
                kind: "release version",
                value: tag,
                reason: "must not be empty",
            });
        }
        Ok(Self(tag))
    }

    /// Label for an unversioned dictionary, such as a local checkout.
    pub fn local() -> Self {
        Self(LOCAL_RELEASE.to_string())
    }

    /// Borrow the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EntityId {
    /// Create an entity id, rejecting empty and whitespace-bearing input.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(IdentifierError {
                kind: "entity id",
                value: id,
                reason: "must be non-empty and contain no whitespace",
            });
        }
        Ok(Self(id))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModuleName {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for ReleaseVersion {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for EntityId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_rejects_empty() {
        assert!(ModuleName::new("").is_err());
        assert!(ModuleName::new("   ").is_err());
    }

    #[test]
    fn module_name_rejects_separators() {
        let err = ModuleName::new("data/analysis").unwrap_err();
        assert_eq!(err.kind, "module name");
    }

    #[test]
    fn module_name_from_file_name_strips_extension() {
        let m = ModuleName::from_file_name("analysis.json").unwrap();
        assert_eq!(m.as_str(), "analysis");
    }

    #[test]
    fn entity_id_rejects_whitespace() {
        assert!(EntityId::new("syn 123").is_err());
        assert_eq!(EntityId::new("syn123").unwrap().to_string(), "syn123");
    }

    #[test]
    fn release_version_parses_from_str() {
        let v: ReleaseVersion = "v7.2.0".parse().unwrap();
        assert_eq!(v.as_str(), "v7.2.0");
    }

    #[test]
    fn newtypes_serialize_transparently() {
        let m = ModuleName::new("neuro").unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"neuro\"");
        let back: EntityId = serde_json::from_str("\"syn42\"").unwrap();
        assert_eq!(back.as_str(), "syn42");
    }
}
