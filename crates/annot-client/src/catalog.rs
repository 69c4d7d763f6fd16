//! Fetch and flatten many modules at one release.

use annot_core::{ModuleName, ReleaseVersion};
use annot_schema::{flatten, FlattenedSchema};

use crate::error::SourceError;
use crate::source::AnnotationSource;

/// Outcome of loading several modules. A module that fails to fetch or
/// parse lands in `failures` and does not prevent the others from loading.
#[derive(Debug)]
pub struct CatalogReport {
    pub version: ReleaseVersion,
    /// Successfully flattened modules, in module-name order.
    pub schemas: Vec<(ModuleName, FlattenedSchema)>,
    pub failures: Vec<(ModuleName, SourceError)>,
}

impl CatalogReport {
    /// All loaded modules concatenated in module order.
    pub fn combined(&self) -> FlattenedSchema {
        FlattenedSchema::concat(self.schemas.iter().map(|(_, schema)| schema.clone()))
    }

    /// Consume the report, concatenating the loaded modules.
    pub fn into_combined(self) -> FlattenedSchema {
        FlattenedSchema::concat(self.schemas.into_iter().map(|(_, schema)| schema))
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loader for flattened module schemas.
pub struct SchemaCatalog;

impl SchemaCatalog {
    /// Fetch and flatten `modules` at `version`; an empty slice means every
    /// module listed at that release.
    ///
    /// # Errors
    ///
    /// Only listing the release is fatal. Requested modules that are not
    /// listed are reported as [`SourceError::ModuleNotFound`] failures.
    pub fn load(
        source: &dyn AnnotationSource,
        version: &ReleaseVersion,
        modules: &[ModuleName],
    ) -> Result<CatalogReport, SourceError> {
        let listed = source.list_modules(version)?;

        let wanted: Vec<ModuleName> = if modules.is_empty() {
            listed.keys().cloned().collect()
        } else {
            let mut wanted = modules.to_vec();
            wanted.sort();
            wanted.dedup();
            wanted
        };

        let mut report = CatalogReport {
            version: version.clone(),
            schemas: Vec::with_capacity(wanted.len()),
            failures: Vec::new(),
        };

        for module in wanted {
            let result = match listed.get(&module) {
                Some(locator) => source.fetch(locator),
                None => Err(SourceError::ModuleNotFound {
                    module: module.to_string(),
                    version: version.to_string(),
                }),
            };
            match result {
                Ok(fields) => {
                    let schema = flatten(&fields, Some(&module));
                    tracing::debug!(%module, rows = schema.len(), "module flattened");
                    report.schemas.push((module, schema));
                }
                Err(e) => {
                    tracing::warn!(%module, %version, "module failed to load: {e}");
                    report.failures.push((module, e));
                }
            }
        }

        tracing::info!(
            %version,
            loaded = report.schemas.len(),
            failed = report.failures.len(),
            "catalog loaded"
        );
        Ok(report)
    }
}
