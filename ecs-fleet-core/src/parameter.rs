//! Parameter - Read-only key/value lookups for shared infrastructure identifiers
//!
//! Network and cluster identifiers are owned by other stacks and published in a
//! parameter store. The provisioner never reaches for a global registry; a
//! `ParameterStore` is injected instead, so tests can pass an in-memory double.

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;

/// Errors raised while looking up parameters
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("Parameter(s) not found: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Parameter store '{store}' failed: {message}")]
    Backend { store: String, message: String },

    #[error("Parameter file {path} not found")]
    FileNotFound { path: String },

    #[error("Invalid parameter file {path}: {message}")]
    InvalidFile { path: String, message: String },
}

pub type ParameterResult<T> = Result<T, ParameterError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read-only key/value configuration provider
pub trait ParameterStore: Send + Sync {
    /// Name of this store (e.g., "ssm", "static")
    fn name(&self) -> &str;

    /// Look up a single key. Returns `Ok(None)` when the key does not exist.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ParameterResult<Option<String>>>;

    /// Look up several keys, failing with every missing key at once
    fn get_all<'a>(
        &'a self,
        keys: &'a [String],
    ) -> BoxFuture<'a, ParameterResult<HashMap<String, String>>> {
        Box::pin(async move {
            let mut found = HashMap::new();
            let mut missing = Vec::new();
            for key in keys {
                match self.get(key).await? {
                    Some(value) => {
                        found.insert(key.clone(), value);
                    }
                    None => missing.push(key.clone()),
                }
            }
            if missing.is_empty() {
                Ok(found)
            } else {
                Err(ParameterError::Missing(missing))
            }
        })
    }
}

impl ParameterStore for Box<dyn ParameterStore> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ParameterResult<Option<String>>> {
        (**self).get(key)
    }

    fn get_all<'a>(
        &'a self,
        keys: &'a [String],
    ) -> BoxFuture<'a, ParameterResult<HashMap<String, String>>> {
        (**self).get_all(keys)
    }
}

/// In-memory parameter store
#[derive(Debug, Clone, Default)]
pub struct StaticParameterStore {
    values: HashMap<String, String>,
}

impl StaticParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Load parameters from a JSON object of string keys to string values
    pub fn from_file(path: &Path) -> ParameterResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ParameterError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ParameterError::InvalidFile {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        let values: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| ParameterError::InvalidFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        log::debug!(
            "Loaded {} parameter(s) from {}",
            values.len(),
            path.display()
        );
        Ok(Self { values })
    }
}

impl FromIterator<(String, String)> for StaticParameterStore {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ParameterStore for StaticParameterStore {
    fn name(&self) -> &str {
        "static"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ParameterResult<Option<String>>> {
        let value = self.values.get(key).cloned();
        Box::pin(async move { Ok(value) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn static_store_returns_known_keys() {
        let store = StaticParameterStore::new().with("/network/vpc_id", "vpc-123");
        assert_eq!(
            store.get("/network/vpc_id").await.unwrap(),
            Some("vpc-123".to_string())
        );
        assert_eq!(store.get("/network/az1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_all_reports_every_missing_key() {
        let store: Box<dyn ParameterStore> =
            Box::new(StaticParameterStore::new().with("/network/vpc_id", "vpc-123"));
        let keys = vec![
            "/network/vpc_id".to_string(),
            "/network/az1".to_string(),
            "/network/az2".to_string(),
        ];

        match store.get_all(&keys).await {
            Err(ParameterError::Missing(missing)) => {
                assert_eq!(missing, vec!["/network/az1", "/network/az2"]);
            }
            other => panic!("Expected Missing error, got {:?}", other),
        }
    }

    #[test]
    fn from_file_loads_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"/ecs/clusterarn": "arn:aws:ecs:us-east-1:1:cluster/c"}}"#).unwrap();

        let store = StaticParameterStore::from_file(&path).unwrap();
        assert_eq!(
            store.values.get("/ecs/clusterarn").map(String::as_str),
            Some("arn:aws:ecs:us-east-1:1:cluster/c")
        );
    }

    #[test]
    fn from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = StaticParameterStore::from_file(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ParameterError::FileNotFound { .. })));
    }

    #[test]
    fn from_file_rejects_non_string_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(&path, r#"{"/network/az1": 1}"#).unwrap();

        let result = StaticParameterStore::from_file(&path);
        assert!(matches!(result, Err(ParameterError::InvalidFile { .. })));
    }
}
