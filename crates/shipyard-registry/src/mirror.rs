//! Primary and mirror registry login
//!
//! The primary registry is logged in first. Mirror registries are declared as
//! `scheme://<accessKeyId>:<secretAccessKey>@<host>` entries and handled
//! concurrently: each task provisions the repository, logs in and returns its
//! own contribution, merged here in completion order.

use crate::api::{RegistryApi, RegistryClientFactory};
use crate::credential::RegistryCredential;
use crate::ecr::region_from_host;
use crate::error::Result;
use crate::login::login;
use crate::provision::ensure_repository;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use regex::Regex;
use shipyard_config::ImageReference;
use shipyard_container::DockerCli;
use shipyard_core::{SecretMasker, workflow};
use std::sync::LazyLock;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z0-9+.-]*)://([^:@/\s]+):([^@\s]+)@([0-9A-Za-z.-]+)")
        .expect("valid regex")
});

/// One mirror registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorDeclaration {
    pub scheme: String,
    pub credential: RegistryCredential,
    pub host: String,
}

impl MirrorDeclaration {
    /// `None` for a malformed entry.
    pub fn parse(entry: &str) -> Option<Self> {
        let caps = DECLARATION.captures(entry)?;
        Some(Self {
            scheme: caps[1].to_string(),
            credential: RegistryCredential::new(&caps[2], &caps[3]),
            host: caps[4].to_string(),
        })
    }

    /// Region token of the host, if it has one.
    pub fn region(&self) -> Option<&str> {
        region_from_host(&self.host)
    }
}

/// Split on commas if there is any comma, otherwise on newlines. Entries
/// are trimmed and empty ones dropped.
pub fn split_declarations(raw: &str) -> Vec<&str> {
    let separator = if raw.contains(',') { ',' } else { '\n' };
    raw.split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Entry text safe to log: whatever precedes the host is dropped.
fn redacted(entry: &str) -> String {
    match entry.rsplit_once('@') {
        Some((_, host)) => format!("***@{}", host),
        None => entry.to_string(),
    }
}

/// Tags and host contributed by one mirror.
#[derive(Debug)]
struct Contribution {
    host: String,
    tags: [String; 2],
}

/// Everything a login run needs.
pub struct RegistryLogins<'a> {
    pub docker: &'a DockerCli,
    pub masker: &'a dyn SecretMasker,
    pub factory: &'a dyn RegistryClientFactory,
}

impl RegistryLogins<'_> {
    /// Log in to the primary registry, then to every mirror concurrently.
    ///
    /// Each successful login appends its host to `hosts` as soon as it is
    /// known, so hosts are there for cleanup even when this returns an error.
    /// Returns the `--tag` arguments for the mirrors.
    pub async fn login_to_all(
        &self,
        primary: &dyn RegistryApi,
        primary_host: &str,
        image: &ImageReference,
        declarations: Option<&str>,
        hosts: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        login(primary, self.docker, self.masker, primary_host).await?;
        hosts.push(primary_host.to_string());

        let Some(raw) = declarations else {
            return Ok(Vec::new());
        };

        let mut mirrors = Vec::new();
        for entry in split_declarations(raw) {
            match MirrorDeclaration::parse(entry) {
                Some(mirror) => mirrors.push(mirror),
                None => workflow::warning(&format!("Bad registries value - {}", redacted(entry))),
            }
        }

        let mut tasks: FuturesUnordered<_> = mirrors
            .into_iter()
            .map(|mirror| self.mirror(mirror, image))
            .collect();

        let mut args = Vec::new();
        let mut first_error = None;
        while let Some(result) = tasks.next().await {
            match result {
                Ok(contribution) => {
                    hosts.push(contribution.host);
                    for tag in contribution.tags {
                        args.push("--tag".to_string());
                        args.push(tag);
                    }
                }
                Err(e) => {
                    tracing::error!("Mirror registry failed: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(args),
        }
    }

    async fn mirror(&self, mirror: MirrorDeclaration, image: &ImageReference) -> Result<Contribution> {
        self.masker.mask(&mirror.credential.secret_access_key);
        tracing::info!("Mirror registry {} ({})", mirror.host, mirror.scheme);

        let api = self
            .factory
            .connect(&mirror.credential, mirror.region())
            .await?;
        ensure_repository(api.as_ref(), &image.repository).await?;
        login(api.as_ref(), self.docker, self.masker, &mirror.host).await?;

        Ok(Contribution {
            tags: image.mirror_tags(&mirror.host),
            host: mirror.host,
        })
    }
}
