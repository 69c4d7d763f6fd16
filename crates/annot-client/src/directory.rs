//! Annotation source backed by a local directory of `<module>.json` files,
//! e.g. a checkout of the dictionary repository's data folder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use annot_core::{parse_document, AnnotationField, ModuleName, ReleaseVersion};

use crate::error::SourceError;
use crate::source::{AnnotationSource, ModuleLocator};

/// A directory serving a single, fixed release.
#[derive(Debug, Clone)]
pub struct DirectoryAnnotationSource {
    root: PathBuf,
    release: ReleaseVersion,
}

impl DirectoryAnnotationSource {
    /// Serve the documents under `root` as the `"local"` release.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            release: ReleaseVersion::local(),
        }
    }

    /// Serve the documents under `root` as the given release.
    pub fn with_release(root: impl Into<PathBuf>, release: ReleaseVersion) -> Self {
        Self {
            root: root.into(),
            release,
        }
    }

    /// The directory being served.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AnnotationSource for DirectoryAnnotationSource {
    fn latest_release(&self) -> Result<ReleaseVersion, SourceError> {
        Ok(self.release.clone())
    }

    fn list_modules(
        &self,
        version: &ReleaseVersion,
    ) -> Result<BTreeMap<ModuleName, ModuleLocator>, SourceError> {
        if version != &self.release {
            return Err(SourceError::UnknownRelease(version.to_string()));
        }

        let unavailable = |e: std::io::Error| SourceError::Unavailable {
            endpoint: self.root.display().to_string(),
            reason: e.to_string(),
        };

        let mut modules = BTreeMap::new();
        for entry in std::fs::read_dir(&self.root).map_err(unavailable)? {
            let path = entry.map_err(unavailable)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match ModuleName::from_file_name(name) {
                Ok(module) => {
                    modules.insert(
                        module.clone(),
                        ModuleLocator {
                            module,
                            location: path.display().to_string(),
                        },
                    );
                }
                Err(e) => tracing::warn!(path = %path.display(), "skipping document: {e}"),
            }
        }
        Ok(modules)
    }

    fn fetch(&self, locator: &ModuleLocator) -> Result<Vec<AnnotationField>, SourceError> {
        let bytes = std::fs::read(&locator.location).map_err(|e| SourceError::Unavailable {
            endpoint: locator.location.clone(),
            reason: e.to_string(),
        })?;
        Ok(parse_document(&locator.module, &bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annot_core::identity::LOCAL_RELEASE;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("neuro.json"),
            r#"[{"name": "tissue", "enumValues": [{"value": "cerebellum"}]}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("analysis.json"), r#"[{"name": "tool", "enumValues": []}]"#)
            .unwrap();
        std::fs::write(dir.path().join("README.md"), "not a module").unwrap();
        dir
    }

    #[test]
    fn lists_json_documents_only() {
        let dir = fixture();
        let source = DirectoryAnnotationSource::new(dir.path());
        let release = source.latest_release().unwrap();
        assert_eq!(release.as_str(), LOCAL_RELEASE);

        let modules = source.list_modules(&release).unwrap();
        let names: Vec<&str> = modules.keys().map(ModuleName::as_str).collect();
        assert_eq!(names, ["analysis", "neuro"]);
    }

    #[test]
    fn fetch_module_parses_document() {
        let dir = fixture();
        let source = DirectoryAnnotationSource::new(dir.path());
        let release = source.latest_release().unwrap();
        let fields = source
            .fetch_module(&release, &ModuleName::new("neuro").unwrap())
            .unwrap();
        assert_eq!(fields[0].name, "tissue");
    }

    #[test]
    fn unknown_module_is_not_found() {
        let dir = fixture();
        let source = DirectoryAnnotationSource::new(dir.path());
        let release = source.latest_release().unwrap();
        let err = source
            .fetch_module(&release, &ModuleName::new("missing").unwrap())
            .unwrap_err();
        assert!(matches!(err, SourceError::ModuleNotFound { .. }));
    }

    #[test]
    fn other_release_is_rejected() {
        let dir = fixture();
        let source = DirectoryAnnotationSource::new(dir.path());
        let err = source
            .list_modules(&ReleaseVersion::new("v1.0.0").unwrap())
            .unwrap_err();
        assert!(matches!(err, SourceError::UnknownRelease(_)));
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let source = DirectoryAnnotationSource::new("/nonexistent/annotations");
        let release = source.latest_release().unwrap();
        assert!(matches!(
            source.list_modules(&release).unwrap_err(),
            SourceError::Unavailable { .. }
        ));
    }
}
