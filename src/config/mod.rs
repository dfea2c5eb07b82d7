//! Specification loading
//!
//! The specification file is decoded structurally and returned as-is. When the
//! file is absent a default is synthesized from environment overrides, written
//! to disk so later runs see the same specification, and returned.
//!
//! Files ending in `.toml` are read and written as TOML; anything else is JSON.
//! Files in the legacy `phase2_outputs` layout are still accepted on read.

mod env;
mod schema;


use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub use env::{EnvOverrides, ENV_API_BASE_URL, ENV_BOT_TOKEN, ENV_DATABASE_PATH};
use schema::LegacySpecification;
pub use schema::{
    ApiSpec, DatabaseSpec, FileStructureSpec, Secret, Specification, BOT_TOKEN_PLACEHOLDER,
    DEFAULT_API_BASE_URL, DEFAULT_DATABASE_PATH, DEFAULT_PROJECT_NAME,
};

/// Default specification file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "verification_config.json";

/// Failure to produce a specification. Fatal to a run: no checks execute.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read specification {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("specification {} is not valid {format}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: ConfigFormat,
        message: String,
    },
    #[error("failed to serialize default specification: {0}")]
    Serialize(String),
    #[error("failed to write specification {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// On-disk encoding of the specification file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Toml => f.write_str("TOML"),
        }
    }
}

/// Load the specification at `path`, creating a default one from the process
/// environment if the file does not exist.
pub fn load(path: &Path) -> Result<Specification, ConfigError> {
    load_with_overrides(path, &EnvOverrides::from_env())
}

/// Same as [`load`] with explicit overrides instead of the process environment.
pub fn load_with_overrides(
    path: &Path,
    overrides: &EnvOverrides,
) -> Result<Specification, ConfigError> {
    if path.exists() {
        return read(path);
    }

    let spec = overrides.default_specification();
    write(path, &spec)?;
    info!(path = %path.display(), "created default specification");
    Ok(spec)
}

/// Decode an existing specification file.
pub fn read(path: &Path) -> Result<Specification, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let format = ConfigFormat::for_path(path);
    // Current layout first; its error is the one reported when neither fits
    let spec = decode::<Specification>(format, &content).or_else(|message| {
        let legacy = decode::<LegacySpecification>(format, &content).map_err(|_| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        })?;
        info!(path = %path.display(), "read specification in legacy layout");
        Ok::<_, ConfigError>(Specification::from(legacy))
    })?;

    for section in spec.vacuous_sections() {
        warn!(section, "specification declares nothing to check; it will pass vacuously");
    }

    Ok(spec)
}

fn decode<T: DeserializeOwned>(format: ConfigFormat, content: &str) -> Result<T, String> {
    match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Persist a specification, creating parent directories as needed.
pub fn write(path: &Path, spec: &Specification) -> Result<(), ConfigError> {
    let content = match ConfigFormat::for_path(path) {
        ConfigFormat::Json => serde_json::to_string_pretty(spec)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        ConfigFormat::Toml => {
            toml::to_string_pretty(spec).map_err(|e| ConfigError::Serialize(e.to_string()))?
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
