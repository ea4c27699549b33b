//! AWS ECR implementation of [`RegistryApi`]

use crate::api::{ApiError, RegistryApi, RegistryClientFactory};
use crate::credential::RegistryCredential;
use crate::error::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecr::Client;
use aws_sdk_ecr::config::{Credentials, Region};
use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::Tag;
use std::sync::Arc;

/// Region of an ECR host: `<account>.dkr.ecr.<region>.amazonaws.com`.
pub fn region_from_host(host: &str) -> Option<&str> {
    host.split('.').nth(3).filter(|r| !r.is_empty())
}

/// ECR client for one account and region.
#[derive(Debug, Clone)]
pub struct EcrApi {
    client: Client,
}

impl EcrApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from static credentials. Without `region` the SDK's
    /// default region chain applies.
    pub async fn connect(credential: &RegistryCredential, region: Option<&str>) -> Self {
        let credentials = Credentials::new(
            credential.access_key_id.clone(),
            credential.secret_access_key.clone(),
            None,
            None,
            "shipyard",
        );
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).credentials_provider(credentials);
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;
        tracing::debug!("ECR client region: {:?}", config.region());
        Self::new(Client::new(&config))
    }
}

fn service_error<E>(e: E) -> ApiError
where
    E: std::error::Error,
{
    ApiError::Service(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl RegistryApi for EcrApi {
    async fn describe_repository(&self, repository: &str) -> std::result::Result<(), ApiError> {
        match self
            .client
            .describe_repositories()
            .repository_names(repository)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_repository_not_found_exception()) =>
            {
                Err(ApiError::RepositoryNotFound(repository.to_string()))
            }
            Err(e) => Err(service_error(e)),
        }
    }

    async fn create_repository(
        &self,
        repository: &str,
        tags: &[(&str, &str)],
    ) -> std::result::Result<(), ApiError> {
        let mut request = self.client.create_repository().repository_name(repository);
        for (key, value) in tags {
            let tag = Tag::builder()
                .key(*key)
                .value(*value)
                .build()
                .map_err(service_error)?;
            request = request.tags(tag);
        }
        request.send().await.map_err(service_error)?;
        Ok(())
    }

    async fn set_repository_policy(
        &self,
        repository: &str,
        policy: &str,
    ) -> std::result::Result<(), ApiError> {
        self.client
            .set_repository_policy()
            .repository_name(repository)
            .policy_text(policy)
            .send()
            .await
            .map_err(service_error)?;
        Ok(())
    }

    async fn authorization_token(&self) -> std::result::Result<String, ApiError> {
        let output = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(service_error)?;

        output
            .authorization_data()
            .first()
            .and_then(|data| data.authorization_token())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Service("no authorization data returned".to_string()))
    }
}

/// Builds [`EcrApi`] clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct EcrClientFactory;

#[async_trait]
impl RegistryClientFactory for EcrClientFactory {
    async fn connect(
        &self,
        credential: &RegistryCredential,
        region: Option<&str>,
    ) -> Result<Arc<dyn RegistryApi>> {
        Ok(Arc::new(EcrApi::connect(credential, region).await))
    }
}
