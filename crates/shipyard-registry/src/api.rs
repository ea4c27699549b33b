//! Registry API abstraction
//!
//! The four registry calls the pipeline needs, behind a trait so provisioning
//! and login can run against [`crate::fakes`] as well as ECR.

use crate::credential::RegistryCredential;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single registry API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("API error: {0}")]
    Service(String),
}

/// Registry API abstraction trait
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Succeeds when `repository` exists.
    async fn describe_repository(&self, repository: &str) -> std::result::Result<(), ApiError>;

    /// Create `repository` carrying the given resource tags.
    async fn create_repository(
        &self,
        repository: &str,
        tags: &[(&str, &str)],
    ) -> std::result::Result<(), ApiError>;

    /// Replace the repository access policy with `policy` (JSON text).
    async fn set_repository_policy(
        &self,
        repository: &str,
        policy: &str,
    ) -> std::result::Result<(), ApiError>;

    /// Base64 encoded `user:password` for `docker login`.
    async fn authorization_token(&self) -> std::result::Result<String, ApiError>;
}

/// Builds a [`RegistryApi`] client for one account and region.
#[async_trait]
pub trait RegistryClientFactory: Send + Sync {
    /// `region` of `None` defers to the SDK's default region chain.
    async fn connect(
        &self,
        credential: &RegistryCredential,
        region: Option<&str>,
    ) -> Result<Arc<dyn RegistryApi>>;
}
