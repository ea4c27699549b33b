use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("input '{0}' is required")]
    MissingInput(&'static str),

    #[error("invalid port '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("healthcheck '{0}' requires a port")]
    HealthcheckWithoutPort(String),

    #[error("invalid boolean '{0}': expected true | True | TRUE | false | False | FALSE")]
    InvalidBoolean(String),

    #[error(
        "repository override '{repository}' must live under '{expected_prefix}'"
    )]
    InvalidRepositoryOverride {
        repository: String,
        expected_prefix: String,
    },

    #[error("GITHUB_REPOSITORY '{0}' is not in owner/name form")]
    InvalidRepository(String),

    #[error("GITHUB_REF '{0}' does not name a branch or tag")]
    InvalidRef(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
