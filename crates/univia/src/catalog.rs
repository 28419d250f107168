//! Loading of the normalized university and student stores.
//!
//! A store is either a JSON array of records or an object keyed by record id
//! whose values carry the record under `normalized`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::matching::{StudentProfile, University};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load_records<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&raw)?;
    info!(path = %path.display(), count = records.len(), "store loaded");
    Ok(records)
}

pub fn parse_records<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, CatalogError> {
    let value: Value = serde_json::from_str(raw)?;

    let entries = match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, entry)| {
                let mut record = match entry {
                    Value::Object(mut fields) => fields
                        .remove("normalized")
                        .unwrap_or(Value::Object(serde_json::Map::new())),
                    _ => Value::Object(serde_json::Map::new()),
                };
                if let Value::Object(fields) = &mut record {
                    fields.entry("id").or_insert(Value::String(key));
                }
                record
            })
            .collect(),
        Value::Array(items) => items,
        other => vec![other],
    };

    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(CatalogError::from))
        .collect()
}

/// Students available to start sessions for.
#[derive(Debug, Clone, Default)]
pub struct StudentDirectory {
    students: Vec<StudentProfile>,
}

impl StudentDirectory {
    pub fn new(students: Vec<StudentProfile>) -> Self {
        Self { students }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Id used when a caller does not name a student.
    pub fn default_id(&self) -> String {
        self.students
            .first()
            .map(|student| student.id.clone())
            .unwrap_or_else(|| "demo".to_string())
    }

    /// Resolves `id`, falling back to the first student and then to an empty demo profile.
    pub fn resolve(&self, id: &str) -> StudentProfile {
        if let Some(student) = self.students.iter().find(|student| student.id == id) {
            return student.clone();
        }

        warn!(student = id, "unknown student; using default profile");
        self.students.first().cloned().unwrap_or_else(|| StudentProfile {
            id: id.to_string(),
            ..StudentProfile::default()
        })
    }
}

/// Loads both stores, tolerating a missing student store.
pub fn load_catalog(
    universities_path: impl AsRef<Path>,
    students_path: impl AsRef<Path>,
) -> Result<(Vec<University>, StudentDirectory), CatalogError> {
    let universities = load_records::<University>(universities_path)?;
    let students = match load_records::<StudentProfile>(students_path) {
        Ok(students) => students,
        Err(CatalogError::Io { path, source }) => {
            warn!(path = %path.display(), error = %source, "student store unavailable");
            Vec::new()
        }
        Err(other) => return Err(other),
    };
    Ok((universities, StudentDirectory::new(students)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{CampusSetting, OptionId};

    #[test]
    fn parses_keyed_store_and_backfills_ids() {
        let raw = r#"{
            "uni-bath": { "normalized": { "campus": { "setting": "suburban", "pmr_ok": true } } },
            "uni-ucl": { "normalized": { "id": "ucl", "fees": { "tuition": { "amount": 29000, "currency": "GBP" } } } }
        }"#;

        let records: Vec<University> = parse_records(raw).expect("store parses");

        let bath = records
            .iter()
            .find(|uni| uni.id == OptionId::from("uni-bath"))
            .expect("key used as id");
        assert_eq!(bath.campus.setting, Some(CampusSetting::Suburban));
        assert!(bath.campus.accessible);

        let ucl = records
            .iter()
            .find(|uni| uni.id == OptionId::from("ucl"))
            .expect("explicit id kept");
        assert_eq!(ucl.tuition(), Some(29000.0));
    }

    #[test]
    fn parses_array_store_with_unknown_setting() {
        let raw = r#"[{ "id": "x", "campus": { "setting": "mega-city" } }]"#;
        let records: Vec<University> = parse_records(raw).expect("store parses");
        assert_eq!(records[0].campus.setting, None);
    }

    #[test]
    fn reports_malformed_json() {
        let result = parse_records::<University>("{ not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn directory_falls_back_to_first_student() {
        let directory = StudentDirectory::new(vec![StudentProfile {
            id: "stu-1".to_string(),
            ..StudentProfile::default()
        }]);

        assert_eq!(directory.resolve("missing").id, "stu-1");
        assert_eq!(StudentDirectory::default().resolve("anon").id, "anon");
    }
}
