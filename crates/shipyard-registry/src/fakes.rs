//! In-memory registry fakes (testing only)

use crate::api::{ApiError, RegistryApi, RegistryClientFactory};
use crate::credential::RegistryCredential;
use crate::error::Result;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// A registry API call as seen by [`FakeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(String),
    Create(String, Vec<(String, String)>),
    SetPolicy(String, String),
    Token,
}

/// In-memory [`RegistryApi`].
#[derive(Debug)]
pub struct FakeRegistry {
    repositories: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<Call>>,
    token: Option<String>,
    describe_error: Option<String>,
    fail_create: bool,
    fail_policy: bool,
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRegistry {
    /// Empty registry handing out the token `AWS:password`.
    pub fn new() -> Self {
        Self {
            repositories: Mutex::new(BTreeSet::new()),
            calls: Mutex::new(Vec::new()),
            token: Some(STANDARD.encode("AWS:password")),
            describe_error: None,
            fail_create: false,
            fail_policy: false,
        }
    }

    pub fn with_repository(self, repository: &str) -> Self {
        self.repositories
            .lock()
            .unwrap()
            .insert(repository.to_string());
        self
    }

    /// Hand out `user:password` as the authorization token.
    pub fn with_login(mut self, user: &str, password: &str) -> Self {
        self.token = Some(STANDARD.encode(format!("{user}:{password}")));
        self
    }

    /// Hand out a raw (possibly malformed) token.
    pub fn with_raw_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn failing_token(mut self) -> Self {
        self.token = None;
        self
    }

    pub fn failing_describe(mut self, message: &str) -> Self {
        self.describe_error = Some(message.to_string());
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_policy(mut self) -> Self {
        self.fail_policy = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn has_repository(&self, repository: &str) -> bool {
        self.repositories.lock().unwrap().contains(repository)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn describe_repository(&self, repository: &str) -> std::result::Result<(), ApiError> {
        self.record(Call::Describe(repository.to_string()));
        if let Some(message) = &self.describe_error {
            return Err(ApiError::Service(message.clone()));
        }
        if self.has_repository(repository) {
            Ok(())
        } else {
            Err(ApiError::RepositoryNotFound(repository.to_string()))
        }
    }

    async fn create_repository(
        &self,
        repository: &str,
        tags: &[(&str, &str)],
    ) -> std::result::Result<(), ApiError> {
        self.record(Call::Create(
            repository.to_string(),
            tags.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        if self.fail_create {
            return Err(ApiError::Service("RepositoryLimitExceeded".to_string()));
        }
        self.repositories
            .lock()
            .unwrap()
            .insert(repository.to_string());
        Ok(())
    }

    async fn set_repository_policy(
        &self,
        repository: &str,
        policy: &str,
    ) -> std::result::Result<(), ApiError> {
        self.record(Call::SetPolicy(repository.to_string(), policy.to_string()));
        if self.fail_policy {
            return Err(ApiError::Service("AccessDenied".to_string()));
        }
        Ok(())
    }

    async fn authorization_token(&self) -> std::result::Result<String, ApiError> {
        self.record(Call::Token);
        self.token
            .clone()
            .ok_or_else(|| ApiError::Service("UnrecognizedClient".to_string()))
    }
}

/// [`RegistryClientFactory`] handing out [`FakeRegistry`] instances keyed by
/// access key id. Unknown keys get a fresh empty registry.
#[derive(Debug, Default)]
pub struct FakeClientFactory {
    registries: Mutex<HashMap<String, Arc<FakeRegistry>>>,
    connects: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `registry` to clients using `access_key_id`.
    pub fn with_registry(self, access_key_id: &str, registry: FakeRegistry) -> Self {
        self.registries
            .lock()
            .unwrap()
            .insert(access_key_id.to_string(), Arc::new(registry));
        self
    }

    pub fn registry(&self, access_key_id: &str) -> Option<Arc<FakeRegistry>> {
        self.registries.lock().unwrap().get(access_key_id).cloned()
    }

    /// `(access_key_id, region)` of every client built so far.
    pub fn connects(&self) -> Vec<(String, Option<String>)> {
        self.connects.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryClientFactory for FakeClientFactory {
    async fn connect(
        &self,
        credential: &RegistryCredential,
        region: Option<&str>,
    ) -> Result<Arc<dyn RegistryApi>> {
        self.connects.lock().unwrap().push((
            credential.access_key_id.clone(),
            region.map(str::to_string),
        ));
        let registry = self
            .registries
            .lock()
            .unwrap()
            .entry(credential.access_key_id.clone())
            .or_insert_with(|| Arc::new(FakeRegistry::new()))
            .clone();
        Ok(registry as Arc<dyn RegistryApi>)
    }
}
