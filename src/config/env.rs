//! Environment overrides applied when a default specification is synthesized

use std::env;

use super::schema::{
    Specification, BOT_TOKEN_PLACEHOLDER, DEFAULT_API_BASE_URL, DEFAULT_DATABASE_PATH,
};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";

/// Values read from the environment, captured once so callers can also
/// construct them by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub bot_token: Option<String>,
    pub api_base_url: Option<String>,
    pub database_path: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            bot_token: non_empty_var(ENV_BOT_TOKEN),
            api_base_url: non_empty_var(ENV_API_BASE_URL),
            database_path: non_empty_var(ENV_DATABASE_PATH),
        }
    }

    /// Merge these overrides over the hard-coded defaults.
    pub fn default_specification(&self) -> Specification {
        Specification::with_defaults(
            self.bot_token.as_deref().unwrap_or(BOT_TOKEN_PLACEHOLDER),
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
            self.database_path.as_deref().unwrap_or(DEFAULT_DATABASE_PATH),
        )
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
