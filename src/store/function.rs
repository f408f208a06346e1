//! # Function Registry
//!
//! Maps a logical function name to the deployments of that function across
//! external execution platforms. A deployment is identified by
//! `(function name, platform id)`; redeploying to the same platform replaces
//! the record in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::duration_nanos;
use super::errors::{StoreError, StoreResult};
use super::fileutil;

/// One platform-specific live instance of a function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    /// Identifier of the platform account this deployment lives on
    pub platform_id: String,

    /// Invocation URL returned by the platform at deploy time
    pub url: String,

    /// When the deployment record was created
    pub created_at: DateTime<Utc>,

    /// Remote function name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Memory limit in bytes
    #[serde(default)]
    pub memory_size: i64,

    /// Environment variables configured on the remote function
    #[serde(default)]
    pub environment: HashMap<String, String>,

    #[serde(with = "duration_nanos", default)]
    pub initialization_timeout: Duration,

    #[serde(with = "duration_nanos", default)]
    pub runtime_timeout: Duration,

    #[serde(default)]
    pub http_port: u16,

    /// Source file the function was deployed from
    #[serde(default)]
    pub file: String,
}

/// Deployment metadata recorded alongside the invocation URL. Filled in by
/// the platform layer that performed the deploy.
#[derive(Debug, Clone, Default)]
pub struct DeploymentOptions {
    pub name: String,
    pub description: String,
    pub memory_size: i64,
    pub environment: HashMap<String, String>,
    pub initialization_timeout: Duration,
    pub runtime_timeout: Duration,
    pub http_port: u16,
    pub file: String,
}

/// On-disk document shape: `{"functions": {<name>: [Deployment, ...]}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FunctionsFile {
    #[serde(default)]
    functions: HashMap<String, Vec<Deployment>>,
}

/// Durable registry of function deployments.
///
/// Interior lock so one instance can be shared between the scheduler's timer
/// tasks and the control API handlers.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    path: Option<PathBuf>,
    functions: RwLock<HashMap<String, Vec<Deployment>>>,
}

impl FunctionRegistry {
    /// Create a registry backed by `path` and load its current content.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let registry = Self::at_path(path);
        registry.load()?;
        Ok(registry)
    }

    /// Create a registry backed by `path` without reading it.
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            functions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with no backing file. `save` fails on such a
    /// registry; intended for tests.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Reload the registry from its backing file, replacing in-memory state.
    ///
    /// A missing or empty file counts as an empty registry; the file and its
    /// parent directories are created so later saves land somewhere valid.
    pub fn load(&self) -> StoreResult<()> {
        let path = self.path.as_ref().ok_or(StoreError::NoBackingPath)?;
        let loaded = read_registry_file::<FunctionsFile>(path)?;

        let mut functions = self
            .functions
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
        *functions = loaded.functions;
        Ok(())
    }

    /// Persist the registry to its backing file atomically.
    pub fn save(&self) -> StoreResult<()> {
        let path = self.path.as_ref().ok_or(StoreError::NoBackingPath)?;
        let snapshot = {
            let functions = self
                .functions
                .read()
                .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
            functions.clone()
        };
        let data = fileutil::to_tab_json(&FunctionsFile {
            functions: snapshot,
        })?;
        fileutil::replace_atomic(path, &data)
    }

    /// Record a deployment of `function_name` on `platform_id`.
    ///
    /// Replaces an existing record for the same platform, otherwise appends,
    /// then persists.
    pub fn upsert(
        &self,
        function_name: &str,
        platform_id: &str,
        url: &str,
        opts: DeploymentOptions,
    ) -> StoreResult<()> {
        let deployment = Deployment {
            platform_id: platform_id.to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
            name: opts.name,
            description: opts.description,
            memory_size: opts.memory_size,
            environment: opts.environment,
            initialization_timeout: opts.initialization_timeout,
            runtime_timeout: opts.runtime_timeout,
            http_port: opts.http_port,
            file: opts.file,
        };

        {
            let mut functions = self
                .functions
                .write()
                .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
            let deployments = functions.entry(function_name.to_string()).or_default();
            match deployments
                .iter_mut()
                .find(|d| d.platform_id == platform_id)
            {
                Some(existing) => *existing = deployment,
                None => deployments.push(deployment),
            }
        }

        self.save()
    }

    /// Get the deployments registered under `function_name`.
    pub fn get(&self, function_name: &str) -> StoreResult<Vec<Deployment>> {
        let functions = self
            .functions
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
        functions
            .get(function_name)
            .cloned()
            .ok_or_else(|| StoreError::FunctionNotFound(function_name.to_string()))
    }

    /// Get registered function count
    pub fn len(&self) -> usize {
        self.functions.read().map(|f| f.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared load path for both registries: tolerate a missing or empty file,
/// surface every other error.
pub(super) fn read_registry_file<T>(path: &Path) -> StoreResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::File::create(path)?;
            return Ok(T::default());
        }
        Err(err) => return Err(err.into()),
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&content)?)
}
