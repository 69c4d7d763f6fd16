//! The annotation source seam.

use std::collections::BTreeMap;

use annot_core::{AnnotationField, ModuleName, ReleaseVersion};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Where one module's document can be fetched from.
///
/// `location` is source-specific: a download URL for GitHub, a file path
/// for a local directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLocator {
    /// The module this locator resolves.
    pub module: ModuleName,
    /// Source-specific location of the document.
    pub location: String,
}

/// A versioned provider of annotation dictionary documents.
///
/// Implementations are synchronous: each method is a single blocking call
/// with no internal retry. The trait is object-safe so callers can pick an
/// implementation at runtime.
pub trait AnnotationSource: Send + Sync {
    /// The most recent published release of the dictionary.
    fn latest_release(&self) -> Result<ReleaseVersion, SourceError>;

    /// Modules available at `version`, keyed by module name.
    fn list_modules(
        &self,
        version: &ReleaseVersion,
    ) -> Result<BTreeMap<ModuleName, ModuleLocator>, SourceError>;

    /// Fetch and parse one module's document.
    fn fetch(&self, locator: &ModuleLocator) -> Result<Vec<AnnotationField>, SourceError>;

    /// Fetch a module by name at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ModuleNotFound`] if `module` is not listed at
    /// `version`, otherwise whatever listing or fetching returns.
    fn fetch_module(
        &self,
        version: &ReleaseVersion,
        module: &ModuleName,
    ) -> Result<Vec<AnnotationField>, SourceError> {
        let modules = self.list_modules(version)?;
        let locator = modules.get(module).ok_or_else(|| SourceError::ModuleNotFound {
            module: module.to_string(),
            version: version.to_string(),
        })?;
        self.fetch(locator)
    }
}
