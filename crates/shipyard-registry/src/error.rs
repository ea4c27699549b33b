//! Registry error types

use crate::api::ApiError;
use shipyard_container::ContainerError;
use thiserror::Error;

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Could not describe ECR Repository {repository}: {source}")]
    DescribeFailed {
        repository: String,
        #[source]
        source: ApiError,
    },

    #[error("Could not create ECR Repository: {repository}")]
    CouldNotCreateRepo {
        repository: String,
        #[source]
        source: ApiError,
    },

    #[error("Could not set ECR policy for {repository}")]
    CouldNotSetPolicy {
        repository: String,
        #[source]
        source: ApiError,
    },

    #[error("Unable to obtain ECR password for {registry}: {reason}")]
    AuthenticationFailed { registry: String, reason: String },

    #[error("docker login to {registry} failed: {source}")]
    LoginFailed {
        registry: String,
        #[source]
        source: ContainerError,
    },
}

impl RegistryError {
    /// Credential or login failure, as opposed to a provisioning failure.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            RegistryError::AuthenticationFailed { .. } | RegistryError::LoginFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
