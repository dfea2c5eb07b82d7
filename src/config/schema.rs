//! Specification schema: what a project must deliver to pass verification

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_PROJECT_NAME: &str = "AI Project Phase 2";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_DATABASE_PATH: &str = "phase2.db";
pub const BOT_TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";

const DEFAULT_REQUIRED_FILES: &[&str] = &[
    "main.py",
    "requirements.txt",
    "config.json",
    "verification_tool.py",
];
const DEFAULT_REQUIRED_DIRS: &[&str] = &["src/", "tests/", "data/", "verification_evidence/"];
const DEFAULT_REQUIRED_TABLES: &[&str] = &["users", "conversations", "models"];
const DEFAULT_ENDPOINTS: &[&str] = &["/health", "/api/v1/chat", "/api/v1/models"];

/// Project name used by files in the legacy layout that omit one
const LEGACY_PROJECT_NAME: &str = "AI Project";

/// Root of the verification specification file
///
/// Every section is required and unknown keys are rejected, so a misspelled
/// or missing section fails to decode instead of checking nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Specification {
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<Secret>,
    pub file_structure: FileStructureSpec,
    pub database: DatabaseSpec,
    pub api: ApiSpec,
}

/// Files and directories that must exist under the project root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileStructureSpec {
    #[serde(default)]
    pub required_files: BTreeSet<String>,
    #[serde(default)]
    pub required_dirs: BTreeSet<String>,
}

/// Database location and the tables it must contain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSpec {
    /// `sqlite:///<path>`, `sqlite://<path>` or a bare file path
    #[serde(default)]
    pub connector: String,
    #[serde(default)]
    pub required_tables: BTreeSet<String>,
}

/// HTTP service and the endpoints that must answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSpec {
    #[serde(default)]
    pub base_url: String,
    /// Probed in declared order
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// Layout written by earlier releases: sections nested under
/// `phase2_outputs`, the token under `telegram_token`, and the database
/// location under `connection_string`. Read only; never written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LegacySpecification {
    #[serde(default)]
    telegram_token: Option<Secret>,
    #[serde(default)]
    project_name: Option<String>,
    phase2_outputs: LegacyOutputs,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyOutputs {
    file_structure: FileStructureSpec,
    database_schema: LegacyDatabase,
    api_endpoints: ApiSpec,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyDatabase {
    connection_string: String,
    #[serde(default)]
    required_tables: BTreeSet<String>,
}

impl From<LegacySpecification> for Specification {
    fn from(legacy: LegacySpecification) -> Self {
        let outputs = legacy.phase2_outputs;
        Self {
            project_name: legacy
                .project_name
                .unwrap_or_else(|| LEGACY_PROJECT_NAME.to_string()),
            bot_token: legacy.telegram_token,
            file_structure: outputs.file_structure,
            database: DatabaseSpec {
                connector: outputs.database_schema.connection_string,
                required_tables: outputs.database_schema.required_tables,
            },
            api: outputs.api_endpoints,
        }
    }
}

/// A credential that never shows up in logs or debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the value is empty or still the shipped placeholder
    pub fn is_placeholder(&self) -> bool {
        self.0.trim().is_empty() || self.0 == BOT_TOKEN_PLACEHOLDER
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Specification {
    /// Build the built-in default specification with the given overrides.
    pub fn with_defaults(bot_token: &str, api_base_url: &str, database_path: &str) -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            bot_token: Some(Secret::new(bot_token)),
            file_structure: FileStructureSpec {
                required_files: set(DEFAULT_REQUIRED_FILES),
                required_dirs: set(DEFAULT_REQUIRED_DIRS),
            },
            database: DatabaseSpec {
                connector: format!("sqlite:///{database_path}"),
                required_tables: set(DEFAULT_REQUIRED_TABLES),
            },
            api: ApiSpec {
                base_url: api_base_url.to_string(),
                endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Sections that declare nothing and would pass without probing anything.
    pub fn vacuous_sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.file_structure.required_files.is_empty()
            && self.file_structure.required_dirs.is_empty()
        {
            sections.push("file_structure");
        }
        if self.database.required_tables.is_empty() {
            sections.push("database.required_tables");
        }
        if self.api.endpoints.is_empty() {
            sections.push("api.endpoints");
        }
        sections
    }

    /// Whether a usable bot token is configured
    pub fn has_bot_token(&self) -> bool {
        self.bot_token.as_ref().is_some_and(|t| !t.is_placeholder())
    }
}

impl Default for Specification {
    fn default() -> Self {
        Self::with_defaults(
            BOT_TOKEN_PLACEHOLDER,
            DEFAULT_API_BASE_URL,
            DEFAULT_DATABASE_PATH,
        )
    }
}
