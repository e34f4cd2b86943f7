//! Catalog sources: the embedded default catalog and directories of JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::RawPropertyRecord;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Records of the catalog shipped with the crate.
pub fn builtin() -> Result<Vec<RawPropertyRecord>> {
    parse_records(BUILTIN_CATALOG, "builtin catalog")
}

/// Parses a JSON array of records. Elements that are not usable records are
/// skipped with a warning; a document that is not an array is an error.
pub fn parse_records(text: &str, origin: &str) -> Result<Vec<RawPropertyRecord>> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(text)? {
        serde_json::Value::Array(values) => values,
        _ => return Err(Error::Catalog(format!("{origin}: expected a JSON array of records"))),
    };
    let mut records = Vec::with_capacity(values.len());
    for (position, value) in values.into_iter().enumerate() {
        match RawPropertyRecord::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!(origin, position, error = %e, "skipping unreadable catalog record"),
        }
    }
    Ok(records)
}

#[derive(Default)]
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn new() -> Self { Self }

    /// Loads every `*.json` file under `dir`, in path order.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<RawPropertyRecord>> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("catalog directory {}", dir.display())));
        }
        let files = self.list_json_files(dir);
        if files.is_empty() {
            warn!("No .json files found under {}.", dir.display());
            return Ok(vec![]);
        }
        let mut all_records = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!("Loading catalog file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            let content = fs::read_to_string(file_path)?;
            let origin = file_path.display().to_string();
            all_records.extend(parse_records(&content, &origin)?);
        }
        info!("Loaded {} files into {} catalog records", files.len(), all_records.len());
        Ok(all_records)
    }

    /// Loads `dir` when given, the built-in catalog otherwise.
    pub fn load(&self, dir: Option<&Path>) -> Result<Vec<RawPropertyRecord>> {
        match dir {
            Some(dir) => self.load_dir(dir),
            None => builtin(),
        }
    }

    fn list_json_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut json_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        json_files.sort();
        json_files
    }
}
