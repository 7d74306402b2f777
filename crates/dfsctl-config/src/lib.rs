//! Settings and manifest loading for dfsctl.
//!
//! Two documents are read here: the user's `config.toml` (reconcile
//! defaults and output preferences, overridable from `DFSCTL_*` env vars)
//! and manifests describing the desired state of namespaces and
//! replication groups. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use dfsctl_core::{
    NamespaceFolder, NamespaceRoot, NamespaceType, ReconcileDefaults, ReplicationGroup,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported document format '{extension}' (expected toml, yaml, yml or json)")]
    UnsupportedFormat { extension: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level settings file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Referral TTL for roots that declare none, in seconds.
    #[serde(default = "default_root_ttl")]
    pub root_ttl: u32,

    /// Referral TTL for folders that declare none, in seconds.
    #[serde(default = "default_folder_ttl")]
    pub folder_ttl: u32,

    #[serde(default)]
    pub namespace_type: NamespaceType,

    #[serde(default = "default_quota")]
    pub staging_quota_mb: u32,

    #[serde(default = "default_quota")]
    pub conflict_quota_mb: u32,

    #[serde(default = "default_output")]
    pub output: String,

    /// State file used when `--inventory` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            root_ttl: default_root_ttl(),
            folder_ttl: default_folder_ttl(),
            namespace_type: NamespaceType::default(),
            staging_quota_mb: default_quota(),
            conflict_quota_mb: default_quota(),
            output: default_output(),
            inventory: None,
        }
    }
}

fn default_root_ttl() -> u32 {
    ReconcileDefaults::ROOT_TTL
}
fn default_folder_ttl() -> u32 {
    ReconcileDefaults::FOLDER_TTL
}
fn default_quota() -> u32 {
    dfsctl_core::model::DEFAULT_QUOTA_MB
}
fn default_output() -> String {
    "table".into()
}

impl Defaults {
    /// Translate into reconciler defaults. Every numeric value must be positive.
    pub fn to_reconcile_defaults(&self) -> Result<ReconcileDefaults, ConfigError> {
        for (field, value) in [
            ("root_ttl", self.root_ttl),
            ("folder_ttl", self.folder_ttl),
            ("staging_quota_mb", self.staging_quota_mb),
            ("conflict_quota_mb", self.conflict_quota_mb),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: format!("defaults.{field}"),
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(ReconcileDefaults {
            root_ttl: self.root_ttl,
            folder_ttl: self.folder_ttl,
            namespace_type: self.namespace_type,
            staging_quota_mb: self.staging_quota_mb,
            conflict_quota_mb: self.conflict_quota_mb,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "dfsctl", "dfsctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dfsctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DFSCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Documents ───────────────────────────────────────────────────────

/// Serialization format of a manifest or state file, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }
}

/// Read a TOML, YAML or JSON document into `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = DocumentFormat::from_path(path)?;
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let figment = match format {
        DocumentFormat::Toml => Figment::from(Toml::file(path)),
        DocumentFormat::Yaml => Figment::from(Yaml::file(path)),
        DocumentFormat::Json => Figment::from(Json::file(path)),
    };
    Ok(figment.extract()?)
}

// ── Manifest ────────────────────────────────────────────────────────

/// Desired state for every managed entity, as written by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub roots: Vec<NamespaceRoot>,
    #[serde(default)]
    pub folders: Vec<NamespaceFolder>,
    #[serde(default)]
    pub replication_groups: Vec<ReplicationGroup>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.roots.len() + self.folders.len() + self.replication_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest, ConfigError> {
    load_document(path)
}
