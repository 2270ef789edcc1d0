use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
#[error("Failed to read the schema of subgraph \"{name}\" from {path}: {source}")]
pub struct SchemaLoadError {
    name: String,
    path: String,
    source: std::io::Error,
}

/// `STITCHING_SCHEMA_DIR`, or the `graphql` directory shipped with the demo.
pub fn schema_dir() -> PathBuf {
    std::env::var("STITCHING_SCHEMA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("graphql"))
}

pub fn read_schema(dir: &Path, name: &str) -> Result<String, SchemaLoadError> {
    let path = dir.join(format!("{}.graphql", name));
    debug!(subgraph = name, path = %path.display(), "reading schema");

    std::fs::read_to_string(&path).map_err(|source| SchemaLoadError {
        name: name.to_string(),
        path: path.display().to_string(),
        source,
    })
}
