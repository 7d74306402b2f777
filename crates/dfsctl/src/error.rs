//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use dfsctl_config::ConfigError;
use dfsctl_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Reconciliation ───────────────────────────────────────────────

    #[error("Invalid declaration for {entity}: {message}")]
    #[diagnostic(
        code(dfsctl::invalid_declaration),
        help("Fix the manifest entry, then check it with: dfsctl plan <manifest>")
    )]
    InvalidDeclaration { entity: String, message: String },

    #[error("Cannot change {attribute} of {entity} from {current} to {desired}")]
    #[diagnostic(
        code(dfsctl::immutable_attribute),
        help(
            "{attribute} is fixed when the entity is created.\n\
             Declare it with state = \"absent\", apply, then declare it again."
        )
    )]
    ImmutableAttribute {
        entity: String,
        attribute: String,
        current: String,
        desired: String,
    },

    #[error("Failed to converge {entity}: {message}")]
    #[diagnostic(code(dfsctl::execution_failed), help("{applied}"))]
    Execution {
        entity: String,
        message: String,
        /// Human summary of what was applied before the failure.
        applied: String,
    },

    // ── Files ────────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(dfsctl::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("No inventory file configured")]
    #[diagnostic(
        code(dfsctl::no_inventory),
        help(
            "Pass --inventory <file>, set DFSCTL_INVENTORY, or set defaults.inventory in\n\
             {config_path}"
        )
    )]
    NoInventory { config_path: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dfsctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(dfsctl::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(dfsctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to write JSON: {0}")]
    #[diagnostic(code(dfsctl::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to write YAML: {0}")]
    #[diagnostic(code(dfsctl::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write TOML: {0}")]
    #[diagnostic(code(dfsctl::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidDeclaration { .. }
            | Self::Validation { .. }
            | Self::NoInventory { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ImmutableAttribute { .. } => exit_code::CONFLICT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Config(inner) if matches!(**inner, ConfigError::UnsupportedFormat { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { entity, message } => CliError::InvalidDeclaration {
                entity: entity.to_string(),
                message,
            },

            CoreError::ImmutableAttribute {
                entity,
                attribute,
                current,
                desired,
            } => CliError::ImmutableAttribute {
                entity: entity.to_string(),
                attribute: attribute.into(),
                current,
                desired,
            },

            CoreError::Execution {
                entity,
                source,
                applied,
            } => CliError::Execution {
                entity: entity.to_string(),
                message: source.to_string(),
                applied: if applied.is_empty() {
                    "Nothing was applied before the failure.".into()
                } else {
                    format!("Applied before the failure: {applied}")
                },
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NotFound {
                resource_type: "file".into(),
                identifier: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}
