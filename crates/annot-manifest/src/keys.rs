//! Annotation keys: the manifest's annotation columns.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use annot_core::{parse_field_names, ModuleName};
use url::Url;

use crate::error::ManifestError;

/// Provenance columns that lead every manifest.
pub const PROVENANCE_KEYS: [&str; 2] = ["used", "executed"];

/// Collect annotation keys from dictionary documents.
///
/// Each source is a local path or an `http(s)` URL of a `.json` document
/// in the dictionary format; only field names are read. The result starts
/// with [`PROVENANCE_KEYS`] and keeps the first occurrence of every key.
///
/// # Errors
///
/// [`ManifestError::NotJson`] for a source without a `.json` extension,
/// otherwise I/O, download or document errors for the offending source.
pub fn annotation_keys<S: AsRef<str>>(sources: &[S]) -> Result<Vec<String>, ManifestError> {
    let mut keys: Vec<String> = PROVENANCE_KEYS.iter().map(|k| k.to_string()).collect();
    let mut seen: HashSet<String> = keys.iter().cloned().collect();

    for source in sources {
        let source = source.as_ref();
        let (file_name, bytes) = match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let file_name = url
                    .path_segments()
                    .and_then(|segments| segments.last())
                    .unwrap_or_default()
                    .to_string();
                require_json(source, &file_name)?;
                (file_name, download(&url)?)
            }
            _ => {
                let path = Path::new(source);
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                require_json(source, &file_name)?;
                let bytes = std::fs::read(path).map_err(|e| ManifestError::Io {
                    path: source.to_string(),
                    source: e,
                })?;
                (file_name, bytes)
            }
        };

        let module = ModuleName::from_file_name(&file_name)
            .map_err(|_| ManifestError::NotJson(source.to_string()))?;
        let names = parse_field_names(&module, &bytes)?;
        let before = keys.len();
        for name in names {
            if seen.insert(name.clone()) {
                keys.push(name);
            } else {
                tracing::debug!(key = %name, %module, "duplicate annotation key ignored");
            }
        }
        tracing::debug!(%module, added = keys.len() - before, "collected annotation keys");
    }

    Ok(keys)
}

fn require_json(source: &str, file_name: &str) -> Result<(), ManifestError> {
    if Path::new(file_name).extension().and_then(|e| e.to_str()) == Some("json") {
        Ok(())
    } else {
        Err(ManifestError::NotJson(source.to_string()))
    }
}

fn download(url: &Url) -> Result<Vec<u8>, ManifestError> {
    let fetch_error = |reason: String| ManifestError::Fetch {
        location: url.to_string(),
        reason,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| fetch_error(e.to_string()))?;
    let resp = client
        .get(url.clone())
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(fetch_error(format!("status {status}")));
    }
    let bytes = resp.bytes().map_err(|e| fetch_error(e.to_string()))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sources_gives_provenance_keys() {
        let keys = annotation_keys::<&str>(&[]).unwrap();
        assert_eq!(keys, ["used", "executed"]);
    }

    #[test]
    fn local_documents_contribute_names_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let neuro = dir.path().join("neuro.json");
        let analysis = dir.path().join("analysis.json");
        std::fs::write(
            &neuro,
            r#"[{"name": "tissue", "enumValues": [{"value": "cortex"}]}, {"name": "assay"}]"#,
        )
        .unwrap();
        std::fs::write(&analysis, r#"[{"name": "assay"}, {"name": "tool"}]"#).unwrap();

        let sources = [neuro.display().to_string(), analysis.display().to_string()];
        let keys = annotation_keys(&sources).unwrap();
        assert_eq!(keys, ["used", "executed", "tissue", "assay", "tool"]);
    }

    #[test]
    fn non_json_source_is_rejected() {
        let err = annotation_keys(&["keys.csv"]).unwrap_err();
        assert!(matches!(err, ManifestError::NotJson(ref s) if s == "keys.csv"));

        let err = annotation_keys(&["https://example.org/keys.yaml"]).unwrap_err();
        assert!(matches!(err, ManifestError::NotJson(_)));
    }

    #[test]
    fn missing_local_file_is_io_error() {
        let err = annotation_keys(&["/nonexistent/neuro.json"]).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
