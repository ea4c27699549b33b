//! Repository provisioning

use crate::api::{ApiError, RegistryApi};
use crate::error::{RegistryError, Result};

/// Repository policy applied to every repository this tool creates.
pub const REPOSITORY_POLICY: &str = include_str!("ecr-policy.json");

const MANAGED_BY: (&str, &str) = ("ManagedBy", "GitHub");

/// What [`ensure_repository`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Existing,
    Created,
}

/// Make sure `repository` exists, creating it with the managed tag and the
/// fixed policy if it does not. An existing repository is left untouched.
pub async fn ensure_repository(api: &dyn RegistryApi, repository: &str) -> Result<Provisioned> {
    match api.describe_repository(repository).await {
        Ok(()) => {
            tracing::debug!("Repository {} exists", repository);
            return Ok(Provisioned::Existing);
        }
        Err(ApiError::RepositoryNotFound(_)) => {}
        Err(source) => {
            return Err(RegistryError::DescribeFailed {
                repository: repository.to_string(),
                source,
            });
        }
    }

    tracing::info!("Creating repository {}", repository);
    api.create_repository(repository, &[MANAGED_BY])
        .await
        .map_err(|source| RegistryError::CouldNotCreateRepo {
            repository: repository.to_string(),
            source,
        })?;

    api.set_repository_policy(repository, &policy_text())
        .await
        .map_err(|source| RegistryError::CouldNotSetPolicy {
            repository: repository.to_string(),
            source,
        })?;

    Ok(Provisioned::Created)
}

/// The policy document without insignificant whitespace.
fn policy_text() -> String {
    serde_json::from_str::<serde_json::Value>(REPOSITORY_POLICY)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| REPOSITORY_POLICY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{Call, FakeRegistry};

    #[test]
    fn test_policy_is_valid_json() {
        let policy: serde_json::Value = serde_json::from_str(REPOSITORY_POLICY).unwrap();
        assert!(policy["Statement"].is_array());
        assert!(!policy_text().contains('\n'));
    }

    #[tokio::test]
    async fn test_existing_repository_is_untouched() {
        let registry = FakeRegistry::new().with_repository("github/acme/widget/main");

        let result = ensure_repository(&registry, "github/acme/widget/main")
            .await
            .unwrap();

        assert_eq!(result, Provisioned::Existing);
        assert_eq!(
            registry.calls(),
            vec![Call::Describe("github/acme/widget/main".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_repository_is_created_then_policy_set() {
        let registry = FakeRegistry::new();

        let result = ensure_repository(&registry, "github/acme/widget/main")
            .await
            .unwrap();

        assert_eq!(result, Provisioned::Created);
        assert_eq!(registry.calls().len(), 3);
        assert!(matches!(&registry.calls()[1], Call::Create(name, tags)
            if name == "github/acme/widget/main"
                && tags == &vec![("ManagedBy".to_string(), "GitHub".to_string())]));
        assert!(matches!(&registry.calls()[2], Call::SetPolicy(_, policy) if policy.contains("lambda.amazonaws.com")));

        // second run finds it
        let again = ensure_repository(&registry, "github/acme/widget/main")
            .await
            .unwrap();
        assert_eq!(again, Provisioned::Existing);
        assert_eq!(registry.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_create_failure() {
        let registry = FakeRegistry::new().failing_create();
        assert!(matches!(
            ensure_repository(&registry, "repo").await,
            Err(RegistryError::CouldNotCreateRepo { .. })
        ));
    }

    #[tokio::test]
    async fn test_policy_failure_is_not_reported_as_create_failure() {
        let registry = FakeRegistry::new().failing_policy();
        assert!(matches!(
            ensure_repository(&registry, "repo").await,
            Err(RegistryError::CouldNotSetPolicy { .. })
        ));
    }

    #[tokio::test]
    async fn test_describe_failure_is_propagated() {
        let registry = FakeRegistry::new().failing_describe("AccessDenied");
        let err = ensure_repository(&registry, "repo").await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DescribeFailed { source: ApiError::Service(ref msg), .. } if msg == "AccessDenied"
        ));
        assert_eq!(registry.calls().len(), 1);
    }
}
