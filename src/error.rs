//! # Pool Error Types
//!
//! Every failure a caller of the pool can observe. Registration and explicit
//! reload failures leave the pool untouched; render failures may leave partial
//! output in a streaming destination.

use std::path::PathBuf;

use thiserror::Error;

/// Pool operation result type
pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Debug, Error)]
pub enum PoolError {
    /// Template source is malformed, or could not be assembled into an executable.
    #[error("failed to compile template '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// A backing file vanished or became unreadable.
    #[error("template artifact '{}' is unavailable: {source}", path.display())]
    ArtifactUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("layout '{name}' not found")]
    LayoutNotFound { name: String },

    /// Runtime fault while filling a template with data, including write failures.
    #[error("failed to render template '{name}': {source}")]
    Execution {
        name: String,
        #[source]
        source: tera::Error,
    },
}

impl PoolError {
    pub(crate) fn compile(name: impl Into<String>, source: tera::Error) -> Self {
        Self::Compile {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ArtifactUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn template_not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound { name: name.into() }
    }

    pub(crate) fn execution(name: impl Into<String>, source: tera::Error) -> Self {
        Self::Execution {
            name: name.into(),
            source,
        }
    }

    /// True for lookups of a template, fragment or layout that was never registered.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound { .. } | Self::LayoutNotFound { .. }
        )
    }
}

/// Errors loading a [`PoolConfig`](crate::PoolConfig) from TOML.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pool config: {0}")]
    Parse(#[from] toml::de::Error),
}
